use crate::domain::model::{ImportBatch, ImportSummary, Record};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// 檔案路徑或 http(s) URL
    fn input_source(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
    fn report_file(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<ImportBatch>;
    async fn load(&self, batch: ImportBatch) -> Result<ImportSummary>;
}

/// Time source for run statistics.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Destination of a rendered run report.
pub trait ReportSink: Send + Sync {
    fn emit(&self, report: &str) -> Result<()>;
}
