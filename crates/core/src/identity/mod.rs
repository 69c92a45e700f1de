//! Throwaway identities used to register accounts.

mod generator;
mod types;

pub use generator::{IdentityGenerator, RandomIdentityGenerator};
pub use types::{Credentials, Identity};
