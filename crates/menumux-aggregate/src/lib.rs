pub mod boundary;
pub mod error;
pub mod merge;
pub mod service;
pub mod token_store;

pub use boundary::ErrorResponse;
pub use error::AggregateError;
pub use merge::{merge_item_details, merge_stores, DENYLISTED_CATEGORIES};
pub use service::{AggregationService, ItemAggregate, ItemRequest, StoreRequest};
pub use token_store::TokenStore;
