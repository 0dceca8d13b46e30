//! Repository interfaces consumed by the domain services.

pub mod account;

pub use account::{CredentialStore, MockCredentialStore};
