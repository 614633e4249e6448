pub mod address_resolver;
pub mod aggregator;
pub mod engine;
pub mod enricher;
pub mod selector;

#[cfg(test)]
pub(crate) mod mocks;

pub use crate::domain::model::{
    AddressOutcome, DisplayAddress, DisplayFacility, FacilityDirectory, Municipality, RawFacility,
};
pub use crate::domain::ports::{ConfigProvider, DirectoryService, PostalLookupService, Storage};
pub use crate::utils::error::Result;
