pub mod auth;

pub use auth::{AdminClient, AuthClient};
