// Adapters layer: concrete implementations of the domain ports (http services, local storage).

pub mod http;
pub mod storage;

pub use http::{HttpDirectoryService, HttpPostalLookup};
pub use storage::LocalStorage;
