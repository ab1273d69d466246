pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{schema_config::SchemaConfig, storage::LocalStorage};

pub use core::{
    etl::ImportEngine,
    formatters::FormatterRegistry,
    pipeline::ImportPipeline,
    reporter::{FileSink, FixedClock, MemorySink, Reporter, SystemClock, TracingSink},
    schema::{Field, FieldDeclaration, Schema, SchemaBuilder},
    transformer::RecordTransformer,
};
pub use domain::model::{FieldError, Record, ReportEntry, TransformResult};
pub use utils::error::{ImportaError, Result};
