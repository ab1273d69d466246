use crate::core::{ImportSummary, Pipeline};
use crate::utils::error::Result;

pub struct ImportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<ImportSummary> {
        tracing::info!("🚀 Starting import");

        // Extract
        let records = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} records", records.len());

        // Transform
        let batch = self.pipeline.transform(records).await?;
        tracing::info!(
            "🔄 Transformed {} records ({} invalid)",
            batch.rows.len(),
            batch.invalid_records
        );

        // Load
        let summary = self.pipeline.load(batch).await?;
        tracing::info!("💾 Output saved to: {}", summary.output_path);
        tracing::info!("📝 Report saved to: {}", summary.report_path);

        Ok(summary)
    }
}
