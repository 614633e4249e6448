use crate::domain::model::Municipality;
use crate::domain::ports::DirectoryService;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::validate_region_code;

/// Supplies the municipality that parameterizes a directory build.
pub struct MunicipalitySelector<D: DirectoryService> {
    directory: D,
}

impl<D: DirectoryService> MunicipalitySelector<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    pub async fn list_municipalities(&self, uf: &str) -> Result<Vec<Municipality>> {
        let uf = validate_region_code(uf)?;
        tracing::info!("🔍 Fetching municipalities of {}", uf);

        let municipalities = self.directory.list_municipalities(&uf).await.map_err(|e| {
            AppError::DirectoryUnavailable {
                municipality: format!("municipalities of {}", uf),
                reason: e.to_string(),
            }
        })?;

        if municipalities.is_empty() {
            return Err(AppError::DirectoryUnavailable {
                municipality: format!("municipalities of {}", uf),
                reason: "no municipality returned".to_string(),
            });
        }

        tracing::info!("✅ {} municipalities found in {}", municipalities.len(), uf);
        Ok(municipalities)
    }

    /// Picks a municipality by IBGE code, by name (case-insensitive) or by its
    /// 1-based position in the list.
    pub fn select<'a>(municipalities: &'a [Municipality], query: &str) -> Result<&'a Municipality> {
        let query = query.trim();
        let not_found = || AppError::MunicipalityNotFound {
            query: query.to_string(),
        };
        if query.is_empty() {
            return Err(not_found());
        }

        if let Some(found) = municipalities.iter().find(|m| m.id == query) {
            return Ok(found);
        }

        let lowered = query.to_lowercase();
        if let Some(found) = municipalities
            .iter()
            .find(|m| m.name.trim().to_lowercase() == lowered)
        {
            return Ok(found);
        }

        match query.parse::<usize>() {
            Ok(position) if (1..=municipalities.len()).contains(&position) => {
                Ok(&municipalities[position - 1])
            }
            _ => Err(not_found()),
        }
    }
}
