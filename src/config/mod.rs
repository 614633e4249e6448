pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::{AppError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_region_code, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "ubs-directory")]
#[command(about = "Municipal health facility directory with postal address enrichment")]
pub struct CliConfig {
    /// Two-letter federative unit, e.g. AM
    #[arg(long)]
    pub uf: String,

    /// IBGE code, name or list position of the municipality
    #[arg(long)]
    pub municipio: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub directory_endpoint: Option<String>,

    #[arg(long)]
    pub postal_endpoint: Option<String>,

    /// Concurrent postal lookups (1 = sequential)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Timeout applied to every remote call
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long, help = "Write the directory bundle (csv/json/txt) to the output path")]
    pub export: bool,

    #[arg(long, help = "Also show the population profile")]
    pub population: bool,

    #[arg(long, help = "Only list the municipalities of the UF")]
    pub list_only: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file (or defaults) and applies command line overrides.
    pub fn load_settings(&self) -> Result<TomlConfig> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut settings);
        Ok(settings)
    }

    pub fn apply_overrides(&self, settings: &mut TomlConfig) {
        if let Some(endpoint) = &self.directory_endpoint {
            settings.directory.endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.postal_endpoint {
            settings.postal.endpoint = endpoint.clone();
        }
        if let Some(concurrency) = self.concurrency {
            settings.aggregation.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.directory.timeout_seconds = timeout;
            settings.postal.timeout_seconds = timeout;
        }
        if let Some(output_path) = &self.output_path {
            settings.export.output_path = output_path.clone();
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_region_code(&self.uf)?;
        if !self.list_only && self.municipio.as_deref().map_or(true, |m| m.trim().is_empty()) {
            return Err(AppError::MissingConfigError {
                field: "municipio".to_string(),
            });
        }
        Ok(())
    }
}
