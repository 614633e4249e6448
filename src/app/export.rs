use crate::app::report::render_directory;
use crate::domain::model::{DisplayAddress, FacilityDirectory, FacilityKind};
use crate::domain::ports::Storage;
use crate::utils::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Txt,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "txt" => Ok(ExportFormat::Txt),
            other => Err(AppError::InvalidConfigValueError {
                field: "export.formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported format".to_string(),
            }),
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "facilities.csv",
            ExportFormat::Json => "directory.json",
            ExportFormat::Txt => "report.txt",
        }
    }
}

#[derive(Serialize)]
struct ExportEnvelope<'a> {
    generated_at: DateTime<Utc>,
    directory: &'a FacilityDirectory,
}

/// Lowercase file-name slug: `São Gabriel da Cachoeira` -> `são_gabriel_da_cachoeira`.
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    match regex::Regex::new(r"[^\p{L}\p{N}]+") {
        Ok(re) => re.replace_all(&lowered, "_").trim_matches('_').to_string(),
        Err(_) => lowered.replace(' ', "_"),
    }
}

/// 將目錄打包成 zip (csv / json / txt) 並寫入儲存
pub struct DirectoryExporter<S: Storage> {
    storage: S,
    output_path: String,
    formats: Vec<ExportFormat>,
}

impl<S: Storage> DirectoryExporter<S> {
    pub fn new(storage: S, output_path: impl Into<String>, formats: Vec<ExportFormat>) -> Self {
        Self {
            storage,
            output_path: output_path.into(),
            formats,
        }
    }

    pub fn bundle_name(directory: &FacilityDirectory) -> String {
        format!(
            "ubs_{}_{}.zip",
            slugify(&directory.municipality.name),
            directory.municipality.uf.to_lowercase()
        )
    }

    pub async fn export(&self, directory: &FacilityDirectory) -> Result<String> {
        let bundle_name = Self::bundle_name(directory);
        tracing::info!("💾 Exporting directory bundle {}", bundle_name);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for format in &self.formats {
                let content = match format {
                    ExportFormat::Csv => facilities_csv(directory)?,
                    ExportFormat::Json => serde_json::to_vec_pretty(&ExportEnvelope {
                        generated_at: Utc::now(),
                        directory,
                    })?,
                    ExportFormat::Txt => render_directory(directory).into_bytes(),
                };
                zip.start_file::<_, ()>(format.file_name(), FileOptions::default())?;
                zip.write_all(&content)?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&bundle_name, &zip_data).await?;

        let output_path = format!("{}/{}", self.output_path.trim_end_matches('/'), bundle_name);
        tracing::info!("📦 Directory bundle saved: {}", output_path);
        Ok(output_path)
    }
}

fn facilities_csv(directory: &FacilityDirectory) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "name",
        "cnes",
        "address_source",
        "street",
        "neighborhood",
        "postal_code",
        "locality",
        "region",
        "latitude",
        "longitude",
        "doctors",
        "nurses",
        "kind",
    ])?;

    for entry in &directory.facilities {
        let (source, neighborhood, locality, region) = match &entry.address {
            DisplayAddress::Resolved(address) => (
                "resolved",
                address.neighborhood.clone().unwrap_or_default(),
                address.locality.clone(),
                address.region.clone(),
            ),
            DisplayAddress::Stored { .. } => ("stored", String::new(), String::new(), String::new()),
        };
        let f = &entry.facility;
        let (latitude, longitude) = (f.latitude.to_string(), f.longitude.to_string());
        let (doctors, nurses) = (f.doctors.to_string(), f.nurses.to_string());
        let kind = match f.kind() {
            FacilityKind::Ubs => "ubs",
            FacilityKind::Other => "other",
        };
        writer.write_record([
            f.id.as_str(),
            f.name.as_str(),
            f.cnes.as_str(),
            source,
            entry.address.street(),
            neighborhood.as_str(),
            entry.address.postal_code(),
            locality.as_str(),
            region.as_str(),
            latitude.as_str(),
            longitude.as_str(),
            doctors.as_str(),
            nurses.as_str(),
            kind,
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        DirectoryTotals, DisplayFacility, Municipality, RawFacility, ResolvedAddress,
    };
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                AppError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn sample_directory() -> FacilityDirectory {
        let raw = |id: &str, doctors: u32| RawFacility {
            id: id.to_string(),
            name: format!("UBS {}", id),
            cnes: format!("20{}", id),
            address: "Rua A, 10".to_string(),
            postal_code: "69100-000".to_string(),
            latitude: -3.1,
            longitude: -60.02,
            doctors,
            nurses: 1,
        };
        let stored = raw("A", 2);
        let facilities = vec![
            DisplayFacility {
                address: DisplayAddress::stored(&stored),
                facility: stored,
            },
            DisplayFacility {
                facility: raw("B", 3),
                address: DisplayAddress::Resolved(ResolvedAddress {
                    street: "Av. X".to_string(),
                    neighborhood: Some("Centro".to_string()),
                    postal_code: "69000-000".to_string(),
                    locality: "Manaus".to_string(),
                    region: "AM".to_string(),
                }),
            },
        ];
        FacilityDirectory {
            municipality: Municipality {
                id: "1303809".to_string(),
                name: "São Gabriel da Cachoeira".to_string(),
                uf: "AM".to_string(),
                uf_name: None,
            },
            facilities,
            totals: DirectoryTotals {
                facility_count: 2,
                ubs_count: 2,
                other_count: 0,
                doctors: 5,
                nurses: 2,
            },
            resolved_addresses: 1,
        }
    }

    fn read_entry(archive: &mut zip::ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> String {
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("São Gabriel da Cachoeira"), "são_gabriel_da_cachoeira");
        assert_eq!(slugify("  Boa Vista (RR) "), "boa_vista_rr");
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(ExportFormat::parse("CSV").unwrap(), ExportFormat::Csv);
        assert!(ExportFormat::parse("xlsx").is_err());
    }

    #[tokio::test]
    async fn test_export_writes_all_formats() {
        let storage = MockStorage::new();
        let exporter = DirectoryExporter::new(
            storage.clone(),
            "out/",
            vec![ExportFormat::Csv, ExportFormat::Json, ExportFormat::Txt],
        );
        let directory = sample_directory();

        let output_path = exporter.export(&directory).await.unwrap();
        assert_eq!(output_path, "out/ubs_são_gabriel_da_cachoeira_am.zip");

        let zip_data = storage
            .get_file("ubs_são_gabriel_da_cachoeira_am.zip")
            .await
            .unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        assert_eq!(archive.len(), 3);

        let csv_content = read_entry(&mut archive, "facilities.csv");
        let lines: Vec<&str> = csv_content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,name,cnes,address_source"));
        assert!(lines[1].contains(",stored,Rua A, 10") || lines[1].contains(",stored,\"Rua A, 10\""));
        assert!(lines[2].contains(",resolved,Av. X,Centro,69000-000,Manaus,AM"));
        assert!(lines[2].ends_with(",3,1,ubs"));

        let json: serde_json::Value =
            serde_json::from_str(&read_entry(&mut archive, "directory.json")).unwrap();
        assert!(json.get("generated_at").is_some());
        assert_eq!(json["directory"]["totals"]["doctors"], 5);
        assert_eq!(
            json["directory"]["facilities"][1]["address"]["source"],
            "resolved"
        );

        let report = read_entry(&mut archive, "report.txt");
        assert!(report.contains("Neighborhood: Centro"));
    }

    #[tokio::test]
    async fn test_export_respects_format_selection() {
        let storage = MockStorage::new();
        let exporter = DirectoryExporter::new(storage.clone(), "out", vec![ExportFormat::Json]);

        exporter.export(&sample_directory()).await.unwrap();

        let zip_data = storage
            .get_file("ubs_são_gabriel_da_cachoeira_am.zip")
            .await
            .unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["directory.json"]);
    }
}
