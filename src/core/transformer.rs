use crate::core::reporter::Reporter;
use crate::core::schema::Schema;
use crate::domain::model::{FieldError, Record, TransformResult};
use crate::utils::error::Result;
use serde_json::Value;

impl Schema {
    /// One pass over every declared field, in order. Invalid fields keep
    /// their slot so `values.len()` always equals the field count.
    pub fn transform(&self, record: &Record) -> TransformResult {
        let mut values = Vec::with_capacity(self.len());
        let mut errors = Vec::new();

        for field in self.fields() {
            let value = field.evaluate(record);
            if let Some(error) = field.check(&value) {
                errors.push(error);
            }
            values.push(value);
        }

        TransformResult { values, errors }
    }
}

/// Transforms a single record at most once and reports the outcome to an
/// attached [`Reporter`].
pub struct RecordTransformer<'a> {
    schema: &'a Schema,
    record: &'a Record,
    row_number: Option<usize>,
    reporter: Option<&'a mut Reporter>,
    result: Option<TransformResult>,
}

impl<'a> RecordTransformer<'a> {
    pub fn new(schema: &'a Schema, record: &'a Record) -> Self {
        Self {
            schema,
            record,
            row_number: None,
            reporter: None,
            result: None,
        }
    }

    pub fn with_row(mut self, row_number: usize) -> Self {
        self.row_number = Some(row_number);
        self
    }

    pub fn with_reporter(mut self, reporter: &'a mut Reporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn row_number(&self) -> Option<usize> {
        self.row_number
    }

    pub fn is_transformed(&self) -> bool {
        self.result.is_some()
    }

    /// Runs the pass on first call; later calls return the cached result
    /// without touching the reporter again.
    pub fn transform(&mut self) -> &TransformResult {
        let Self {
            schema,
            record,
            row_number,
            reporter,
            result,
        } = self;

        result.get_or_insert_with(|| {
            let outcome = schema.transform(record);
            if let Some(reporter) = reporter.as_deref_mut() {
                if outcome.is_valid() {
                    reporter.record_transformed();
                } else {
                    // 沒有指定列號時記為第 0 列
                    reporter.record_invalid(row_number.unwrap_or(0), outcome.errors.clone());
                }
            }
            outcome
        })
    }

    pub fn is_valid(&mut self) -> bool {
        self.transform().is_valid()
    }

    pub fn values(&mut self) -> &[Value] {
        &self.transform().values
    }

    pub fn errors(&mut self) -> &[FieldError] {
        &self.transform().errors
    }

    /// Single-field lookup; does not count as a transform pass.
    pub fn get(&self, field: &str) -> Result<Value> {
        self.schema.field_value(self.record, field)
    }

    pub fn into_result(mut self) -> TransformResult {
        self.transform();
        self.result.take().unwrap_or_default()
    }
}
