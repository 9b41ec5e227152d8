//! Cross-provider merge policy for stores and item details.
//!
//! Both merges are name-keyed and order-sensitive: the first provider in
//! the input wins every tie.

mod item;
mod store;

pub use item::merge_item_details;
pub use store::{merge_stores, DENYLISTED_CATEGORIES};
