use crate::core::enricher::FacilityEnricher;
use crate::domain::model::{DirectoryTotals, DisplayFacility, FacilityDirectory, Municipality, RawFacility};
use crate::domain::ports::{DirectoryService, PostalLookupService};
use crate::utils::error::{AppError, Result};
use futures::stream::{self, StreamExt};

/// Builds the facility directory of one municipality.
///
/// The roster is fetched once. Facilities are enriched one at a time unless a
/// concurrency above one is configured, in which case up to that many lookups
/// run at once. Output order always follows the roster.
pub struct DirectoryAggregator<D: DirectoryService, P: PostalLookupService> {
    directory: D,
    enricher: FacilityEnricher<P>,
    concurrency: usize,
}

impl<D: DirectoryService, P: PostalLookupService> DirectoryAggregator<D, P> {
    pub fn new(directory: D, enricher: FacilityEnricher<P>) -> Self {
        Self {
            directory,
            enricher,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn build_directory(&self, municipality: &Municipality) -> Result<FacilityDirectory> {
        tracing::info!(
            "🏥 Fetching facilities for {} - {} ({})",
            municipality.name,
            municipality.uf,
            municipality.id
        );

        let roster = self.fetch_roster(municipality).await?;
        tracing::info!("📋 Roster has {} facilities", roster.len());

        let mut totals = DirectoryTotals::default();
        for facility in &roster {
            totals.accumulate(facility);
        }

        let facilities = if self.concurrency > 1 {
            self.enrich_concurrently(roster).await
        } else {
            self.enrich_sequentially(roster).await
        };

        let resolved_addresses = facilities
            .iter()
            .filter(|f| f.address.is_resolved())
            .count();

        let directory = FacilityDirectory {
            municipality: municipality.clone(),
            facilities,
            totals,
            resolved_addresses,
        };

        tracing::info!(
            "✅ Directory ready: {} facilities, {} doctors, {} nurses ({} addresses resolved, {} stored)",
            directory.totals.facility_count,
            directory.totals.doctors,
            directory.totals.nurses,
            directory.resolved_addresses,
            directory.fallback_addresses()
        );

        Ok(directory)
    }

    async fn fetch_roster(&self, municipality: &Municipality) -> Result<Vec<RawFacility>> {
        let unavailable = |reason: String| AppError::DirectoryUnavailable {
            municipality: format!("{} - {}", municipality.name, municipality.uf),
            reason,
        };

        match self
            .directory
            .list_facilities(&municipality.id, &municipality.name)
            .await
        {
            Ok(Some(roster)) => Ok(roster),
            Ok(None) => Err(unavailable("directory service returned no roster".to_string())),
            Err(e) => {
                tracing::error!("❌ Facility roster fetch failed: {}", e);
                Err(unavailable(e.to_string()))
            }
        }
    }

    async fn enrich_sequentially(&self, roster: Vec<RawFacility>) -> Vec<DisplayFacility> {
        let total = roster.len();
        let mut facilities = Vec::with_capacity(total);
        for (index, facility) in roster.into_iter().enumerate() {
            tracing::debug!("🔎 Enriching {}/{}: {}", index + 1, total, facility.name);
            facilities.push(self.enricher.enrich(facility).await);
        }
        facilities
    }

    /// `buffered` yields results in submission order, not completion order.
    async fn enrich_concurrently(&self, roster: Vec<RawFacility>) -> Vec<DisplayFacility> {
        tracing::debug!(
            "🔀 Enriching {} facilities with up to {} concurrent lookups",
            roster.len(),
            self.concurrency
        );
        stream::iter(roster)
            .map(|facility| self.enricher.enrich(facility))
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
