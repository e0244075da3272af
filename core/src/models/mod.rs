// storefront/src/models/mod.rs

//! Row shapes of the four remote tables, plus the identity types.

pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

pub use cart_item::{CartItem, NewCartItem};
pub use order::{NewOrder, Order, ORDER_STATUS_COMPLETED};
pub use order_item::{NewOrderItem, OrderItem};
pub use product::Product;
pub use user::{AuthSession, SessionUser};
