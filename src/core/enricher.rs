use crate::core::address_resolver::AddressResolver;
use crate::domain::model::{AddressOutcome, DisplayAddress, DisplayFacility, RawFacility};
use crate::domain::ports::PostalLookupService;

/// Fallback table for one facility.
///
/// `outcome` is `None` when the stored postal code was never queried. Only a
/// resolved lookup replaces the stored address, and it replaces it whole.
pub fn choose_address(facility: &RawFacility, outcome: Option<AddressOutcome>) -> DisplayAddress {
    match outcome {
        Some(AddressOutcome::Resolved(resolved)) => DisplayAddress::Resolved(resolved),
        Some(AddressOutcome::NotFound) | Some(AddressOutcome::Unavailable) | None => {
            DisplayAddress::stored(facility)
        }
    }
}

pub struct FacilityEnricher<P: PostalLookupService> {
    resolver: AddressResolver<P>,
}

impl<P: PostalLookupService> FacilityEnricher<P> {
    pub fn new(resolver: AddressResolver<P>) -> Self {
        Self { resolver }
    }

    pub async fn enrich(&self, facility: RawFacility) -> DisplayFacility {
        let outcome = if self.resolver.rules().is_placeholder(&facility.postal_code) {
            tracing::debug!("⏭️ {}: no postal code on file, keeping stored address", facility.name);
            None
        } else {
            Some(self.resolver.resolve(&facility.postal_code).await)
        };

        let address = choose_address(&facility, outcome);
        DisplayFacility { facility, address }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mocks::{raw_facility, MockPostalLookup, PostalReply};
    use crate::domain::model::{NotFoundRules, ResolvedAddress};

    fn resolved() -> ResolvedAddress {
        ResolvedAddress {
            street: "Av. X".to_string(),
            neighborhood: None,
            postal_code: "69000-000".to_string(),
            locality: "Manaus".to_string(),
            region: "AM".to_string(),
        }
    }

    #[test]
    fn test_choose_address_table() {
        let facility = raw_facility("1", "69000-000", 1, 1);
        let stored = DisplayAddress::stored(&facility);

        assert_eq!(choose_address(&facility, None), stored);
        assert_eq!(choose_address(&facility, Some(AddressOutcome::NotFound)), stored);
        assert_eq!(choose_address(&facility, Some(AddressOutcome::Unavailable)), stored);
        assert_eq!(
            choose_address(&facility, Some(AddressOutcome::Resolved(resolved()))),
            DisplayAddress::Resolved(resolved())
        );
    }

    #[test]
    fn test_resolved_address_never_mixes_stored_fields() {
        let facility = raw_facility("1", "69999-999", 1, 1);
        let address = choose_address(&facility, Some(AddressOutcome::Resolved(resolved())));

        assert_eq!(address.street(), "Av. X");
        assert_eq!(address.postal_code(), "69000-000");
        assert_ne!(address.street(), facility.address);
    }

    #[tokio::test]
    async fn test_enrich_skips_placeholder() {
        let lookup = MockPostalLookup::new();
        let enricher =
            FacilityEnricher::new(AddressResolver::new(lookup.clone(), NotFoundRules::default()));

        let facility = raw_facility("A", "00000-000", 2, 3);
        let enriched = enricher.enrich(facility.clone()).await;

        assert_eq!(enriched.address, DisplayAddress::stored(&facility));
        assert_eq!(enriched.facility, facility);
        assert!(lookup.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_enrich_uses_resolved_address() {
        let lookup = MockPostalLookup::new().with_reply("69000-000", MockPostalLookup::street("Av. X"));
        let enricher = FacilityEnricher::new(AddressResolver::new(lookup, NotFoundRules::default()));

        let enriched = enricher.enrich(raw_facility("B", "69000-000", 1, 1)).await;

        match enriched.address {
            DisplayAddress::Resolved(address) => {
                assert_eq!(address.street, "Av. X");
                assert_eq!(address.neighborhood, None);
                assert_eq!(address.postal_code, "69000-000");
                assert_eq!(address.locality, "Manaus");
            }
            other => panic!("expected resolved address, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enrich_falls_back_on_failure() {
        let lookup = MockPostalLookup::new().with_reply("69100-000", PostalReply::Fail);
        let enricher = FacilityEnricher::new(AddressResolver::new(lookup, NotFoundRules::default()));

        let facility = raw_facility("C", "69100-000", 4, 2);
        let enriched = enricher.enrich(facility.clone()).await;

        assert_eq!(enriched.address, DisplayAddress::stored(&facility));
        assert_eq!(enriched.facility.doctors, 4);
        assert_eq!(enriched.facility.nurses, 2);
    }
}
