// src/lib.rs

//! Storefront: a per-user shopping cart kept in step with a hosted table backend.
//!
//! The crate provides:
//!  - A remote store contract with an HTTP client and an in-memory implementation.
//!  - An identity session that notifies observers on sign-in, user switch and sign-out.
//!  - A cart synchronizer that mirrors the `cart_items` rows of the signed-in user.
//!  - Checkout as a small async step pipeline, writing `orders` and `order_items`.
//!  - Catalog browsing and order history.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod orders;
pub mod remote;
pub mod workflow;

// --- Re-exports for the Public API ---

pub use crate::cart::{CartState, CartSync};
pub use crate::catalog::{Catalog, ProductFilter};
pub use crate::checkout::{Checkout, CheckoutOptions, CheckoutOutcome, CheckoutReceipt};
pub use crate::config::StoreConfig;
pub use crate::error::{StoreError, StoreResult};
pub use crate::identity::{AuthClient, IdentityObserver, Session, SignUpOutcome, SubscriptionId};
pub use crate::orders::OrderHistory;
pub use crate::remote::{MemoryStore, Query, RemoteStore, RemoteStoreExt, RestStore, Table};
pub use crate::workflow::{ContextData, StepControl, StepDef, Workflow, WorkflowError, WorkflowOutcome};
