use crate::core::formatters::text_of;
use crate::core::reporter::{Reporter, SystemClock};
use crate::core::schema::Schema;
use crate::core::{Clock, ConfigProvider, ImportBatch, ImportSummary, Pipeline, Record, Storage};
use crate::utils::error::{ImportaError, Result};
use crate::utils::validation::{classify_source, SourceKind};
use reqwest::Client;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// extract (CSV 檔或 HTTP JSON) → transform (schema batch) → load (CSV + report)
pub struct ImportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    schema: Schema,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl<S: Storage, C: ConfigProvider> ImportPipeline<S, C> {
    pub fn new(storage: S, config: C, schema: Schema) -> Self {
        Self {
            storage,
            config,
            schema,
            client: Client::new(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn fetch_records(&self, url: Url) -> Result<Vec<Record>> {
        tracing::debug!("Making API request to: {}", url);
        let response = self.client.get(url.clone()).send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(ImportaError::SourceStatusError {
                endpoint: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        let body: Value = serde_json::from_slice(&body)?;
        records_from_json(body)
    }

    fn output_location(&self, file_name: &str) -> String {
        Path::new(self.config.output_path())
            .join(file_name)
            .to_string_lossy()
            .into_owned()
    }
}

/// Header row names the fields; every cell becomes a string value. Short rows
/// are accepted so their missing cells surface as validation errors, and
/// cells that are not valid UTF-8 are decoded lossily instead of failing the
/// whole file.
pub fn parse_csv_records(data: &[u8]) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);
    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect();

    let mut records = Vec::new();
    for (index, row) in reader.byte_records().enumerate() {
        let row = row?;
        if std::str::from_utf8(row.as_slice()).is_err() {
            tracing::warn!("Row {} is not valid UTF-8, decoding lossily", index);
        }
        records.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(name, cell)| (name.as_str(), String::from_utf8_lossy(cell).into_owned()))
                .collect(),
        );
    }
    Ok(records)
}

/// An array of objects yields one record per object; a lone object yields a
/// single record. Array items that are not objects become empty records so
/// every later row keeps its source index in the report.
pub fn records_from_json(body: Value) -> Result<Vec<Record>> {
    match body {
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                match item {
                    Value::Object(obj) => records.push(obj.into_iter().collect()),
                    other => {
                        tracing::warn!(
                            "Item {} is not an object ({}), importing it as an empty record",
                            index,
                            other
                        );
                        records.push(Record::default());
                    }
                }
            }
            Ok(records)
        }
        Value::Object(obj) => Ok(vec![obj.into_iter().collect()]),
        other => Err(ImportaError::ProcessingError {
            message: format!("Expected a JSON array of objects, got {}", other),
        }),
    }
}

pub fn write_csv(header: &[String], rows: &[Vec<Value>]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row.iter().map(text_of))?;
    }
    writer.into_inner().map_err(|e| ImportaError::IoError(e.into_error()))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ImportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        match classify_source(self.config.input_source()) {
            SourceKind::Http(url) => self.fetch_records(url).await,
            SourceKind::File(path) => {
                let data = self.storage.read_file(&path).await?;
                parse_csv_records(&data)
            }
        }
    }

    async fn transform(&self, data: Vec<Record>) -> Result<ImportBatch> {
        let mut reporter = Reporter::with_clock(self.clock.clone());
        let rows = self.schema.transform_batch(&data, Some(&mut reporter))?;

        Ok(ImportBatch {
            header: self
                .schema
                .field_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            rows,
            invalid_records: reporter.invalid_records().len(),
            report: reporter.last_report().unwrap_or_default().to_string(),
        })
    }

    async fn load(&self, batch: ImportBatch) -> Result<ImportSummary> {
        let csv_data = write_csv(&batch.header, &batch.rows)?;
        tracing::debug!("Writing {} rows ({} bytes)", batch.rows.len(), csv_data.len());

        let output_path = self
            .storage
            .write_file(&self.output_location(self.config.output_file()), &csv_data)
            .await?;
        let report_path = self
            .storage
            .write_file(
                &self.output_location(self.config.report_file()),
                batch.report.as_bytes(),
            )
            .await?;

        Ok(ImportSummary {
            output_path,
            report_path,
            valid_records: batch.rows.len(),
            invalid_records: batch.invalid_records,
        })
    }
}
