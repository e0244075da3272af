// storefront/src/cart/mod.rs

//! The signed-in user's cart, kept in step with the `cart_items` table.

pub mod state;
pub mod sync;

pub use state::CartState;
pub(crate) use sync::CartHold;
pub use sync::{CartSync, CART_ITEM_SELECT};
