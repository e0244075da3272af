// storefront/src/identity/mod.rs

//! Who is signed in, and who wants to know when that changes.

pub mod auth;
pub mod session;

pub use auth::{AuthClient, SignUpOutcome};
pub use session::{IdentityObserver, Session, SubscriptionId};
