//! Concrete collaborators behind the workflow traits: the Supabase-backed
//! repository/auth/storage client, the Resend mailer, and in-memory fallbacks
//! used when the service runs without external credentials.

pub mod memory;
pub mod resend;
pub mod supabase;

pub use memory::{LogNotifier, MemoryArtistRepository, MemoryPortfolioStorage};
pub use resend::ResendMailer;
pub use supabase::SupabaseClient;
