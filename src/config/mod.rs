pub mod schema_config;
pub mod storage;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_file_name, validate_path, validate_source, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "importa")]
#[command(about = "Transform and validate records against a declarative field schema")]
pub struct CliConfig {
    #[arg(long, help = "CSV file path, or an http(s) URL returning a JSON array of objects")]
    pub input: String,

    #[arg(long, help = "TOML schema definition")]
    pub schema: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "transformed.csv")]
    pub output_file: String,

    #[arg(long, default_value = "report.txt")]
    pub report_file: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_source(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn report_file(&self) -> &str {
        &self.report_file
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_source("input", &self.input)?;
        validate_path("schema", &self.schema)?;
        validate_path("output_path", &self.output_path)?;
        validate_file_name("output_file", &self.output_file)?;
        validate_file_name("report_file", &self.report_file)?;
        Ok(())
    }
}
