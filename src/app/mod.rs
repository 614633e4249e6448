// Presentation side: text rendering and export bundles built from a finished directory.

pub mod export;
pub mod report;
