use crate::core::reporter::Reporter;
use crate::core::schema::Schema;
use crate::core::transformer::RecordTransformer;
use crate::domain::model::Record;
use crate::utils::error::Result;
use serde_json::Value;

impl Schema {
    /// Transforms `records` in order and returns the values of the rows that
    /// validate. Invalid rows only show up in the reporter, keyed by their
    /// zero-based position. `report()` is called once after the last record;
    /// without a supplied reporter a default one (logging sink) is used.
    pub fn transform_batch<'r, I>(
        &self,
        records: I,
        reporter: Option<&mut Reporter>,
    ) -> Result<Vec<Vec<Value>>>
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let mut default_reporter;
        let reporter = match reporter {
            Some(reporter) => reporter,
            None => {
                default_reporter = Reporter::new();
                &mut default_reporter
            }
        };

        let mut rows = Vec::new();
        for (index, record) in records.into_iter().enumerate() {
            let mut transformer = RecordTransformer::new(self, record)
                .with_row(index)
                .with_reporter(&mut *reporter);

            if transformer.is_valid() {
                rows.push(transformer.into_result().values);
            } else {
                tracing::debug!(
                    row = index,
                    errors = ?transformer.errors(),
                    "Skipping invalid record"
                );
            }
        }

        tracing::debug!("Schema '{}' kept {} valid rows", self.name(), rows.len());
        reporter.report()?;
        Ok(rows)
    }
}
