pub mod adapter;
pub mod adapters;
pub mod client;
pub mod error;
pub mod normalize;
mod retry;

pub use adapter::{adapter_for, parse_options_recursively, ProviderAdapter};
pub use client::{HttpProviderClient, ProviderClient};
pub use error::ProviderError;
pub use normalize::{normalize_item, normalize_store, normalize_token};
