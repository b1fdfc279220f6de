//! Workflow modules grouped by audience.

pub mod artist;
