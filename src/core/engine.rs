use crate::adapters::http::{HttpDirectoryService, HttpPostalLookup};
use crate::core::address_resolver::AddressResolver;
use crate::core::aggregator::DirectoryAggregator;
use crate::core::enricher::FacilityEnricher;
use crate::core::selector::MunicipalitySelector;
use crate::domain::model::{FacilityDirectory, Municipality, PopulationProfile};
use crate::domain::ports::{ConfigProvider, DirectoryService, PostalLookupService};
use crate::utils::error::Result;

/// Wires selection, aggregation and population lookups around one directory service.
pub struct DirectoryEngine<D: DirectoryService + Clone, P: PostalLookupService> {
    directory: D,
    selector: MunicipalitySelector<D>,
    aggregator: DirectoryAggregator<D, P>,
}

impl<D: DirectoryService + Clone, P: PostalLookupService> DirectoryEngine<D, P> {
    pub fn new(directory: D, enricher: FacilityEnricher<P>, concurrency: usize) -> Self {
        Self {
            selector: MunicipalitySelector::new(directory.clone()),
            aggregator: DirectoryAggregator::new(directory.clone(), enricher)
                .with_concurrency(concurrency),
            directory,
        }
    }

    pub async fn list_municipalities(&self, uf: &str) -> Result<Vec<Municipality>> {
        self.selector.list_municipalities(uf).await
    }

    pub fn select<'a>(
        &self,
        municipalities: &'a [Municipality],
        query: &str,
    ) -> Result<&'a Municipality> {
        let selected = MunicipalitySelector::<D>::select(municipalities, query)?;
        tracing::info!("✅ Municipality selected: {} ({})", selected.name, selected.id);
        Ok(selected)
    }

    pub async fn build_directory(&self, municipality: &Municipality) -> Result<FacilityDirectory> {
        self.aggregator.build_directory(municipality).await
    }

    /// Lists the UF, picks the municipality and builds its directory.
    pub async fn directory_for(&self, uf: &str, query: &str) -> Result<FacilityDirectory> {
        let municipalities = self.list_municipalities(uf).await?;
        let municipality = self.select(&municipalities, query)?;
        self.build_directory(municipality).await
    }

    pub async fn population(&self, municipality: &Municipality) -> Result<Option<PopulationProfile>> {
        self.directory
            .population(&municipality.id, &municipality.name)
            .await
    }
}

impl DirectoryEngine<HttpDirectoryService, HttpPostalLookup> {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let directory =
            HttpDirectoryService::new(config.directory_endpoint(), config.directory_timeout())?;
        let lookup = HttpPostalLookup::new(config.postal_endpoint(), config.postal_timeout())?;
        let resolver = AddressResolver::new(lookup, config.not_found_rules())
            .with_timeout(config.postal_timeout());

        Ok(Self::new(
            directory,
            FacilityEnricher::new(resolver),
            config.concurrency(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mocks::{manaus, raw_facility, MockDirectory, MockPostalLookup, RosterReply};
    use crate::domain::model::NotFoundRules;
    use crate::utils::error::AppError;

    fn engine(directory: MockDirectory) -> DirectoryEngine<MockDirectory, MockPostalLookup> {
        let lookup = MockPostalLookup::new().with_reply("69000-000", MockPostalLookup::street("Av. X"));
        let enricher = FacilityEnricher::new(AddressResolver::new(lookup, NotFoundRules::default()));
        DirectoryEngine::new(directory, enricher, 2)
    }

    #[tokio::test]
    async fn test_directory_for_selects_by_name() {
        let directory = MockDirectory::new(RosterReply::List(vec![
            raw_facility("A", "69000-000", 1, 2),
            raw_facility("B", "00000-000", 3, 4),
        ]))
        .with_municipalities(Some(vec![manaus()]));

        let result = engine(directory).directory_for("am", "MANAUS").await.unwrap();

        assert_eq!(result.municipality, manaus());
        assert_eq!(result.totals.facility_count, 2);
        assert_eq!(result.resolved_addresses, 1);
    }

    #[tokio::test]
    async fn test_directory_for_unknown_municipality() {
        let directory = MockDirectory::new(RosterReply::List(vec![]))
            .with_municipalities(Some(vec![manaus()]));

        let err = engine(directory.clone())
            .directory_for("AM", "Tefé")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MunicipalityNotFound { .. }));
        assert_eq!(directory.roster_calls().await, 0);
    }

    #[tokio::test]
    async fn test_population_passthrough() {
        let directory = MockDirectory::new(RosterReply::Missing);
        let profile = engine(directory).population(&manaus()).await.unwrap();
        assert_eq!(profile, None);

        let directory = MockDirectory::new(RosterReply::Missing).with_population(PopulationProfile {
            municipality_id: "1302603".to_string(),
            municipality_name: "Manaus".to_string(),
            total: 2_063_547,
            men: 1_000_000,
            women: 1_063_547,
            age_0_10: 0,
            age_11_20: 0,
            age_21_30: 0,
            age_40_plus: 0,
        });
        let profile = engine(directory).population(&manaus()).await.unwrap().unwrap();
        assert_eq!(profile.total, 2_063_547);
    }
}
