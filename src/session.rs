//! Session lifecycle over the authentication collaborator: sign-up, sign-in,
//! profile hydration, and change notification for interested subscribers.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::workflows::artist::service::escape_html;
use crate::workflows::artist::{EmailMessage, Notifier};

/// Roles the platform distinguishes. Everyone starts as an attendee; the
/// artist role is granted through the application workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Artist,
    Attendee,
}

impl UserRole {
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Artist => "artist",
            UserRole::Attendee => "attendee",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(UserRole::Admin),
            "artist" => Some(UserRole::Artist),
            "attendee" => Some(UserRole::Attendee),
            _ => None,
        }
    }
}

/// Identity as the auth provider reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

/// Application-level profile row keyed by the auth identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Extra fields captured at registration, persisted onto the profile row.
#[derive(Debug, Clone)]
pub struct SignUpAttributes {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account already exists for this email")]
    DuplicateAccount,
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
    #[error("auth provider returned an unexpected shape: {0}")]
    InvalidShape(String),
}

/// Authentication collaborator boundary. Token handling stays inside the
/// implementation; the session layer only sees identities and profiles.
pub trait AuthGateway: Send + Sync {
    fn register(&self, attributes: &SignUpAttributes) -> Result<Identity, AuthError>;
    fn authenticate(&self, credentials: &Credentials) -> Result<Identity, AuthError>;
    fn sign_out(&self) -> Result<(), AuthError>;
    fn fetch_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AuthError>;
    fn upsert_profile(&self, profile: &UserProfile) -> Result<UserProfile, AuthError>;
}

/// Point-in-time view of the session handed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub profile: Option<UserProfile>,
}

impl SessionSnapshot {
    pub fn signed_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.profile.as_ref().map(|profile| profile.role)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no user is signed in")]
    NotSignedIn,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Handle returned by [`SessionService::subscribe`]; pass it back to
/// [`SessionService::unsubscribe`] to stop receiving snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&SessionSnapshot) + Send + Sync>;

struct SessionState {
    identity: Option<Identity>,
    profile: Option<UserProfile>,
}

/// Owns the current identity/profile pair and notifies subscribers on every
/// transition. Instances are independent; there is no global session.
pub struct SessionService<G> {
    gateway: G,
    notifier: Option<Arc<dyn Notifier>>,
    state: Mutex<SessionState>,
    listeners: Mutex<BTreeMap<u64, Listener>>,
    next_subscription: Mutex<u64>,
}

impl<G: AuthGateway> SessionService<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            notifier: None,
            state: Mutex::new(SessionState {
                identity: None,
                profile: None,
            }),
            listeners: Mutex::new(BTreeMap::new()),
            next_subscription: Mutex::new(0),
        }
    }

    /// Attach the transactional email hook; new accounts then receive a
    /// welcome message after registration.
    pub fn with_notifier(gateway: G, notifier: Arc<dyn Notifier>) -> Self {
        let mut service = Self::new(gateway);
        service.notifier = Some(notifier);
        service
    }

    /// Register a listener invoked with a snapshot after every transition.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        let mut next = self
            .next_subscription
            .lock()
            .expect("subscription counter mutex poisoned");
        let id = *next;
        *next += 1;

        self.listeners
            .lock()
            .expect("listener mutex poisoned")
            .insert(id, Box::new(listener));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .lock()
            .expect("listener mutex poisoned")
            .remove(&id.0);
    }

    /// Create an account and establish a session. The profile row is created
    /// with the default attendee role. The welcome email is a soft-fail: a
    /// dead mail provider never blocks registration.
    pub fn sign_up(&self, attributes: SignUpAttributes) -> Result<SessionSnapshot, SessionError> {
        let identity = self.gateway.register(&attributes)?;
        let profile = UserProfile {
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            full_name: attributes.full_name,
            role: UserRole::Attendee,
        };
        let profile = self.gateway.upsert_profile(&profile)?;

        if let Some(notifier) = &self.notifier {
            if let Err(err) = notifier.send(welcome_email(&profile)) {
                warn!(error = %err, email = %profile.email, "welcome email failed");
            }
        }

        self.transition(Some(identity), Some(profile));
        Ok(self.snapshot())
    }

    /// Establish a session from credentials. A missing profile row is
    /// recreated with defaults; a failed profile fetch degrades to an
    /// identity-only session rather than failing the sign-in.
    pub fn sign_in(&self, credentials: Credentials) -> Result<SessionSnapshot, SessionError> {
        let identity = self.gateway.authenticate(&credentials)?;
        let profile = self.ensure_profile(&identity);

        self.transition(Some(identity), profile);
        Ok(self.snapshot())
    }

    /// Tear the session down. Local state clears even when the provider call
    /// fails, so a dead backend cannot pin a user to a stale session.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        let result = self.gateway.sign_out();
        self.transition(None, None);
        result.map_err(SessionError::Auth)
    }

    /// Re-fetch the profile row for the signed-in user, picking up role
    /// changes made elsewhere (an approved artist application, for one).
    pub fn refresh_profile(&self) -> Result<SessionSnapshot, SessionError> {
        let identity = {
            let state = self.state.lock().expect("session mutex poisoned");
            state.identity.clone().ok_or(SessionError::NotSignedIn)?
        };

        let profile = self.gateway.fetch_profile(&identity.user_id)?;
        self.transition(Some(identity), profile);
        Ok(self.snapshot())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().expect("session mutex poisoned");
        SessionSnapshot {
            identity: state.identity.clone(),
            profile: state.profile.clone(),
        }
    }

    fn ensure_profile(&self, identity: &Identity) -> Option<UserProfile> {
        match self.gateway.fetch_profile(&identity.user_id) {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                let fallback = UserProfile {
                    user_id: identity.user_id.clone(),
                    email: identity.email.clone(),
                    full_name: String::new(),
                    role: UserRole::Attendee,
                };
                match self.gateway.upsert_profile(&fallback) {
                    Ok(profile) => Some(profile),
                    Err(err) => {
                        warn!(error = %err, user_id = %identity.user_id, "could not recreate missing profile");
                        None
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, user_id = %identity.user_id, "profile fetch failed, continuing without profile");
                None
            }
        }
    }

    fn transition(&self, identity: Option<Identity>, profile: Option<UserProfile>) {
        let snapshot = {
            let mut state = self.state.lock().expect("session mutex poisoned");
            state.identity = identity;
            state.profile = profile;
            SessionSnapshot {
                identity: state.identity.clone(),
                profile: state.profile.clone(),
            }
        };

        let listeners = self.listeners.lock().expect("listener mutex poisoned");
        for listener in listeners.values() {
            listener(&snapshot);
        }
    }
}

fn welcome_email(profile: &UserProfile) -> EmailMessage {
    let name = if profile.full_name.trim().is_empty() {
        escape_html(&profile.email)
    } else {
        escape_html(&profile.full_name)
    };
    let mut html = String::new();
    writeln!(html, "<h1>Welcome to EventFlow!</h1>").expect("write heading");
    writeln!(html, "<p>Dear {name},</p>").expect("write greeting");
    writeln!(
        html,
        "<p>Thank you for joining EventFlow, the premier platform for musical \
         event management!</p>"
    )
    .expect("write body");
    writeln!(
        html,
        "<p>You can now discover events, book tickets, and follow your \
         favorite artists. Performers start by completing the artist \
         application from their dashboard.</p>"
    )
    .expect("write next steps");
    writeln!(html, "<p><strong>The EventFlow Team</strong></p>").expect("write signature");

    EmailMessage {
        to: profile.email.clone(),
        subject: "Welcome to EventFlow!".to_string(),
        html,
    }
}
