pub mod auth_claims;

pub use auth_claims::*;
