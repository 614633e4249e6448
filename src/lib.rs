pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{HttpDirectoryService, HttpPostalLookup, LocalStorage};
pub use config::toml_config::TomlConfig;
pub use core::{
    address_resolver::AddressResolver, aggregator::DirectoryAggregator, engine::DirectoryEngine,
    enricher::FacilityEnricher, selector::MunicipalitySelector,
};
pub use utils::error::{AppError, Result};
