pub mod batch;
pub mod etl;
pub mod formatters;
pub mod pipeline;
pub mod reporter;
pub mod schema;
pub mod transformer;

pub use crate::domain::model::{
    FieldError, ImportBatch, ImportSummary, Record, ReportEntry, RunStats, TransformResult,
};
pub use crate::domain::ports::{Clock, ConfigProvider, Pipeline, ReportSink, Storage};
pub use crate::utils::error::Result;
