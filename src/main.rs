use clap::Parser;
use ubs_directory::app::export::{DirectoryExporter, ExportFormat};
use ubs_directory::app::report::{
    render_coverage, render_directory, render_municipalities, render_population,
};
use ubs_directory::domain::ports::ConfigProvider;
use ubs_directory::utils::{logger, validation::Validate};
use ubs_directory::{AppError, CliConfig, DirectoryEngine, LocalStorage, Result};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting ubs-directory CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ ubs-directory failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(config: &CliConfig) -> Result<()> {
    // 驗證配置
    config.validate()?;
    let settings = config.load_settings()?;
    settings.validate()?;

    let engine = DirectoryEngine::from_config(&settings)?;
    let uf = config.uf.trim().to_uppercase();

    let municipalities = engine.list_municipalities(&uf).await?;
    if config.list_only {
        print!("{}", render_municipalities(&uf, &municipalities));
        return Ok(());
    }

    let query = config
        .municipio
        .as_deref()
        .ok_or_else(|| AppError::MissingConfigError {
            field: "municipio".to_string(),
        })?;
    let municipality = engine.select(&municipalities, query)?;

    let directory = engine.build_directory(municipality).await?;
    print!("{}", render_directory(&directory));

    if config.population {
        // 人口資料非必要，失敗只記錄警告
        match engine.population(municipality).await {
            Ok(Some(profile)) => {
                print!("\n{}", render_population(&profile));
                print!("\n{}", render_coverage(&directory, &profile));
            }
            Ok(None) => tracing::warn!("⚠️ No population data for {}", municipality.name),
            Err(e) => tracing::warn!("⚠️ Population lookup failed: {}", e),
        }
    }

    if config.export {
        let formats = settings
            .export
            .formats
            .iter()
            .map(|f| ExportFormat::parse(f))
            .collect::<Result<Vec<_>>>()?;
        let storage = LocalStorage::new(settings.output_path());
        let exporter = DirectoryExporter::new(storage, settings.output_path(), formats);
        let output_path = exporter.export(&directory).await?;
        println!("📁 Output saved to: {}", output_path);
    }

    Ok(())
}
