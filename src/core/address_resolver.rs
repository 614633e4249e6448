use crate::domain::model::{
    format_postal_code, AddressOutcome, NotFoundRules, PostalLookupResponse, ResolvedAddress,
};
use crate::domain::ports::PostalLookupService;
use std::time::Duration;

/// Why a single lookup produced no address. Never leaves the enrichment step.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolutionFailure {
    Unavailable(String),
    NotFound,
}

fn into_outcome(result: std::result::Result<ResolvedAddress, ResolutionFailure>) -> AddressOutcome {
    match result {
        Ok(address) => AddressOutcome::Resolved(address),
        Err(ResolutionFailure::NotFound) => AddressOutcome::NotFound,
        Err(ResolutionFailure::Unavailable(_)) => AddressOutcome::Unavailable,
    }
}

/// Wraps one postal lookup call and folds every answer into an [`AddressOutcome`].
pub struct AddressResolver<P: PostalLookupService> {
    lookup: P,
    rules: NotFoundRules,
    call_timeout: Option<Duration>,
}

impl<P: PostalLookupService> AddressResolver<P> {
    pub fn new(lookup: P, rules: NotFoundRules) -> Self {
        Self {
            lookup,
            rules,
            call_timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn rules(&self) -> &NotFoundRules {
        &self.rules
    }

    pub async fn resolve(&self, postal_code: &str) -> AddressOutcome {
        let result = self.try_resolve(postal_code).await;
        match &result {
            Ok(address) => {
                tracing::debug!("📮 {} resolved to {}", postal_code, address.street)
            }
            Err(ResolutionFailure::NotFound) => {
                tracing::debug!("📭 {} not found by postal lookup", postal_code)
            }
            Err(ResolutionFailure::Unavailable(reason)) => {
                tracing::warn!("⚠️ Postal lookup unavailable for {}: {}", postal_code, reason)
            }
        }
        into_outcome(result)
    }

    async fn try_resolve(
        &self,
        postal_code: &str,
    ) -> std::result::Result<ResolvedAddress, ResolutionFailure> {
        if self.rules.is_placeholder(postal_code) {
            return Err(ResolutionFailure::Unavailable(
                "placeholder postal code is never queried".to_string(),
            ));
        }

        let call = self.lookup.lookup(postal_code.trim());
        let response = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(response) => response,
                Err(_) => {
                    return Err(ResolutionFailure::Unavailable(format!(
                        "timed out after {:?}",
                        limit
                    )))
                }
            },
            None => call.await,
        };

        let response = response.map_err(|e| ResolutionFailure::Unavailable(e.to_string()))?;
        self.classify(postal_code, response)
    }

    fn classify(
        &self,
        requested: &str,
        response: PostalLookupResponse,
    ) -> std::result::Result<ResolvedAddress, ResolutionFailure> {
        if response.not_found {
            return Err(ResolutionFailure::NotFound);
        }

        let street = response.street.unwrap_or_default();
        if self.rules.is_not_found_street(&street) {
            return Err(ResolutionFailure::NotFound);
        }

        Ok(ResolvedAddress {
            street: street.trim().to_string(),
            neighborhood: non_empty(response.neighborhood),
            postal_code: non_empty(response.postal_code)
                .or_else(|| format_postal_code(requested))
                .unwrap_or_else(|| requested.trim().to_string()),
            locality: response.locality.unwrap_or_default().trim().to_string(),
            region: response.region.unwrap_or_default().trim().to_string(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
