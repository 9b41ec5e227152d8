pub mod app_config;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod provider;
pub mod token;

pub use app_config::{AppConfig, Environment, ProviderSettings};
pub use catalog::{Category, Fees, Item, Location, Store, StoreKind};
pub use config::{load_app_config, load_app_config_from_env};
pub use detail::{
    CustomizationGroup, CustomizationOption, CustomizationShape, ItemDetail, ItemKeys,
    MergedCustomization, MergedDetailItem,
};
pub use provider::{Provider, ProviderMap};
pub use token::{TokenData, TokenStatus};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}
