use serde::{Deserialize, Serialize};

/// 無郵遞區號時使用的佔位值，永遠不會送出查詢
pub const PLACEHOLDER_POSTAL_CODE: &str = "00000-000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    /// IBGE code
    pub id: String,
    pub name: String,
    /// Two-letter federative unit, e.g. `AM`
    pub uf: String,
    pub uf_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFacility {
    pub id: String,
    pub name: String,
    /// CNES registry code
    pub cnes: String,
    pub address: String,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub doctors: u32,
    pub nurses: u32,
}

/// An address returned by a successful postal lookup. Built whole or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub street: String,
    pub neighborhood: Option<String>,
    pub postal_code: String,
    pub locality: String,
    pub region: String,
}

/// Raw answer from the postal lookup collaborator, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalLookupResponse {
    pub postal_code: Option<String>,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    /// Set when the service explicitly reports an unknown code.
    pub not_found: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressOutcome {
    Resolved(ResolvedAddress),
    NotFound,
    Unavailable,
}

impl AddressOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, AddressOutcome::Resolved(_))
    }
}

/// The address shown for a facility. Every field comes from a single source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DisplayAddress {
    Resolved(ResolvedAddress),
    Stored { address: String, postal_code: String },
}

impl DisplayAddress {
    pub fn stored(facility: &RawFacility) -> Self {
        DisplayAddress::Stored {
            address: facility.address.clone(),
            postal_code: facility.postal_code.clone(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, DisplayAddress::Resolved(_))
    }

    pub fn street(&self) -> &str {
        match self {
            DisplayAddress::Resolved(resolved) => &resolved.street,
            DisplayAddress::Stored { address, .. } => address,
        }
    }

    pub fn postal_code(&self) -> &str {
        match self {
            DisplayAddress::Resolved(resolved) => &resolved.postal_code,
            DisplayAddress::Stored { postal_code, .. } => postal_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFacility {
    pub facility: RawFacility,
    pub address: DisplayAddress,
}

/// Basic health unit or any other establishment, decided by the facility name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    Ubs,
    Other,
}

const UBS_NAME_MARKERS: [&str; 3] = ["UBS", "UNIDADE BASICA", "UNIDADE BÁSICA"];

impl RawFacility {
    pub fn kind(&self) -> FacilityKind {
        let name = self.name.to_uppercase();
        if UBS_NAME_MARKERS.iter().any(|marker| name.contains(marker)) {
            FacilityKind::Ubs
        } else {
            FacilityKind::Other
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryTotals {
    pub facility_count: usize,
    /// Facilities named as basic health units
    #[serde(default)]
    pub ubs_count: usize,
    #[serde(default)]
    pub other_count: usize,
    pub doctors: u64,
    pub nurses: u64,
}

impl DirectoryTotals {
    pub fn accumulate(&mut self, facility: &RawFacility) {
        self.facility_count += 1;
        match facility.kind() {
            FacilityKind::Ubs => self.ubs_count += 1,
            FacilityKind::Other => self.other_count += 1,
        }
        self.doctors += u64::from(facility.doctors);
        self.nurses += u64::from(facility.nurses);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityDirectory {
    pub municipality: Municipality,
    pub facilities: Vec<DisplayFacility>,
    pub totals: DirectoryTotals,
    /// How many facilities ended up with a resolved address.
    pub resolved_addresses: usize,
}

impl FacilityDirectory {
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    pub fn fallback_addresses(&self) -> usize {
        self.totals.facility_count.saturating_sub(self.resolved_addresses)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationProfile {
    pub municipality_id: String,
    pub municipality_name: String,
    pub total: u64,
    pub men: u64,
    pub women: u64,
    pub age_0_10: u64,
    pub age_11_20: u64,
    pub age_21_30: u64,
    pub age_40_plus: u64,
}

/// Coverage ratios of a directory against the municipality population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageIndicators {
    pub facilities_per_10k: f64,
    pub doctors_per_1k: f64,
    pub nurses_per_1k: f64,
}

impl CoverageIndicators {
    /// 人口為 0 時所有指標皆為 0
    pub fn compute(totals: &DirectoryTotals, population: &PopulationProfile) -> Self {
        if population.total == 0 {
            return Self::default();
        }
        let inhabitants = population.total as f64;
        Self {
            facilities_per_10k: totals.facility_count as f64 / inhabitants * 10_000.0,
            doctors_per_1k: totals.doctors as f64 / inhabitants * 1_000.0,
            nurses_per_1k: totals.nurses as f64 / inhabitants * 1_000.0,
        }
    }
}

/// Rules that decide when a lookup answer means "no such postal code".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFoundRules {
    pub placeholder: String,
    pub error_prefixes: Vec<String>,
    pub not_found_phrases: Vec<String>,
}

impl Default for NotFoundRules {
    fn default() -> Self {
        Self {
            placeholder: PLACEHOLDER_POSTAL_CODE.to_string(),
            error_prefixes: vec!["Erro".to_string()],
            not_found_phrases: vec!["CEP não encontrado".to_string()],
        }
    }
}

impl NotFoundRules {
    /// 空白或等同佔位值的郵遞區號都不查詢
    pub fn is_placeholder(&self, postal_code: &str) -> bool {
        let candidate = postal_code.trim();
        if candidate.is_empty() {
            return true;
        }
        match (
            normalize_postal_code(candidate),
            normalize_postal_code(&self.placeholder),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => candidate == self.placeholder.trim(),
        }
    }

    pub fn is_not_found_street(&self, street: &str) -> bool {
        let street = street.trim();
        street.is_empty()
            || self
                .error_prefixes
                .iter()
                .any(|prefix| !prefix.is_empty() && street.starts_with(prefix.as_str()))
            || self.not_found_phrases.iter().any(|phrase| street == phrase)
    }
}

/// Returns the eight digits of a Brazilian postal code (`69000-000` or `69000000`).
pub fn normalize_postal_code(raw: &str) -> Option<String> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '.' | ' '))
        .collect();
    if digits.len() == 8 && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

/// Formats eight digits as `NNNNN-NNN`.
pub fn format_postal_code(raw: &str) -> Option<String> {
    normalize_postal_code(raw).map(|digits| format!("{}-{}", &digits[..5], &digits[5..]))
}
