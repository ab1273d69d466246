use clap::Parser;
use importa::utils::error::{ErrorSeverity, ImportaError};
use importa::utils::{logger, validation::Validate};
use importa::{CliConfig, ImportEngine, ImportPipeline, LocalStorage, SchemaConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting importa CLI");
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let schema = match SchemaConfig::from_file(&config.schema).and_then(|c| c.build_schema()) {
        Ok(schema) => schema,
        Err(e) => exit_with(&e),
    };

    let json_summary = config.json_logs;
    let storage = LocalStorage::new(".");
    let pipeline = ImportPipeline::new(storage, config, schema);
    let engine = ImportEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            if json_summary {
                match serde_json::to_string(&summary) {
                    Ok(rendered) => println!("{}", rendered),
                    Err(e) => exit_with(&ImportaError::from(e)),
                }
            } else {
                println!("✅ Import finished: {} valid, {} invalid", summary.valid_records, summary.invalid_records);
                println!("📁 Output saved to: {}", summary.output_path);
                println!("📝 Report saved to: {}", summary.report_path);
            }
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn exit_with(e: &ImportaError) -> ! {
    tracing::error!("❌ Import failed: {} (Severity: {:?})", e, e.severity());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
