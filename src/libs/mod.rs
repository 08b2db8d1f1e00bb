//! Domain logic and ambient concerns of weekplan.
//!
//! - [`task`]: task entity, creation payload, update patch and list filters
//! - [`recurrence`]: next-occurrence date arithmetic
//! - [`occurrences`]: catch-up and completion-triggered occurrence creation
//! - [`error`]: error taxonomy shared by every component
//! - [`config`], [`data_storage`], [`messages`], [`view`]: configuration,
//!   data directory, user messages and console tables

pub mod config;
pub mod data_storage;
pub mod error;
pub mod messages;
pub mod occurrences;
pub mod recurrence;
pub mod task;
pub mod view;
