use crate::domain::model::{
    Municipality, NotFoundRules, PopulationProfile, PostalLookupResponse, RawFacility,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn directory_endpoint(&self) -> &str;
    fn postal_endpoint(&self) -> &str;
    fn directory_timeout(&self) -> Duration;
    fn postal_timeout(&self) -> Duration;
    fn concurrency(&self) -> usize;
    fn output_path(&self) -> &str;
    fn not_found_rules(&self) -> NotFoundRules;
}

/// Upstream roster of municipalities, facilities and population figures.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn list_municipalities(&self, uf: &str) -> Result<Vec<Municipality>>;

    /// `Ok(None)` means the service answered without a roster.
    async fn list_facilities(
        &self,
        municipality_id: &str,
        municipality_name: &str,
    ) -> Result<Option<Vec<RawFacility>>>;

    async fn population(
        &self,
        municipality_id: &str,
        municipality_name: &str,
    ) -> Result<Option<PopulationProfile>>;
}

#[async_trait]
pub trait PostalLookupService: Send + Sync {
    async fn lookup(&self, postal_code: &str) -> Result<PostalLookupResponse>;
}
