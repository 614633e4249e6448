use crate::domain::model::{NotFoundRules, PLACEHOLDER_POSTAL_CODE};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const VALID_EXPORT_FORMATS: [&str; 3] = ["csv", "json", "txt"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub directory: DirectoryConfig,
    pub postal: PostalConfig,
    pub aggregation: AggregationConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/api".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostalConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub placeholder: String,
    pub error_prefixes: Vec<String>,
    pub not_found_phrases: Vec<String>,
}

impl Default for PostalConfig {
    fn default() -> Self {
        let rules = NotFoundRules::default();
        Self {
            endpoint: "https://viacep.com.br/ws".to_string(),
            timeout_seconds: 10,
            placeholder: PLACEHOLDER_POSTAL_CODE.to_string(),
            error_prefixes: rules.error_prefixes,
            not_found_phrases: rules.not_found_phrases,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// 1 代表逐筆處理
    pub concurrency: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
    pub formats: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: "./dashboards".to_string(),
            formats: VALID_EXPORT_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${POSTAL_ENDPOINT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("directory.endpoint", &self.directory.endpoint)?;
        validation::validate_url("postal.endpoint", &self.postal.endpoint)?;
        validation::validate_range(
            "directory.timeout_seconds",
            self.directory.timeout_seconds,
            1,
            300,
        )?;
        validation::validate_range("postal.timeout_seconds", self.postal.timeout_seconds, 1, 300)?;
        validation::validate_non_empty_string("postal.placeholder", &self.postal.placeholder)?;
        validation::validate_range("aggregation.concurrency", self.aggregation.concurrency, 1, 64)?;
        validation::validate_path("export.output_path", &self.export.output_path)?;

        for format in &self.export.formats {
            if !VALID_EXPORT_FORMATS.contains(&format.as_str()) {
                return Err(AppError::InvalidConfigValueError {
                    field: "export.formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        VALID_EXPORT_FORMATS.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn directory_endpoint(&self) -> &str {
        &self.directory.endpoint
    }

    fn postal_endpoint(&self) -> &str {
        &self.postal.endpoint
    }

    fn directory_timeout(&self) -> Duration {
        Duration::from_secs(self.directory.timeout_seconds)
    }

    fn postal_timeout(&self) -> Duration {
        Duration::from_secs(self.postal.timeout_seconds)
    }

    fn concurrency(&self) -> usize {
        self.aggregation.concurrency
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn not_found_rules(&self) -> NotFoundRules {
        NotFoundRules {
            placeholder: self.postal.placeholder.clone(),
            error_prefixes: self.postal.error_prefixes.clone(),
            not_found_phrases: self.postal.not_found_phrases.clone(),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
