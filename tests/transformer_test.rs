use chrono::{Duration, TimeZone, Utc};
use importa::{
    Field, FieldError, FixedClock, MemorySink, Record, RecordTransformer, Reporter, ReportEntry,
    Schema,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn member_schema() -> Schema {
    Schema::builder()
        .name("members")
        .field(Field::new("first_name"))
        .field(Field::new("last_name"))
        .field(Field::new("dob").format("date"))
        .field(Field::new("member_id"))
        .field(Field::new("effective_date").format("date"))
        .field(Field::new("expiry_date").format("date").optional())
        .field(Field::new("phone_number").format("phone").optional())
        .build()
        .unwrap()
}

fn member(first_name: &str) -> Record {
    [
        ("first_name", first_name),
        ("last_name", "Doe"),
        ("dob", "01/01/2000"),
        ("member_id", "123"),
        ("effective_date", "01/01/2020"),
        ("expiry_date", "01/01/2021"),
        ("phone_number", "(303) 555-4202"),
    ]
    .into_iter()
    .collect()
}

fn without(mut record: Record, field: &str) -> Record {
    record.data.remove(field);
    record
}

fn expected_values(first_name: &str) -> Vec<Value> {
    vec![
        json!(first_name),
        json!("Doe"),
        json!("2000-01-01"),
        json!("123"),
        json!("2020-01-01"),
        json!("2021-01-01"),
        json!("+13035554202"),
    ]
}

fn test_reporter(sink: &MemorySink) -> (Reporter, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap().fixed_offset(),
    ));
    let reporter = Reporter::with_clock(clock.clone()).with_sink(sink.clone());
    (reporter, clock)
}

#[test]
fn test_strips_whitespace_from_strings() {
    let schema = member_schema();
    let record: Record = [("first_name", " John ")].into_iter().collect();
    assert_eq!(schema.field_value(&record, "first_name").unwrap(), json!("John"));
}

#[test]
fn test_formats_dates_as_iso8601() {
    let schema = member_schema();
    for input in ["01/01/2000", "2000-01-01", "1-1-00", "1-1-2000"] {
        let record: Record = [("dob", input)].into_iter().collect();
        assert_eq!(
            schema.field_value(&record, "dob").unwrap(),
            json!("2000-01-01"),
            "input: {}",
            input
        );
    }
}

#[test]
fn test_formats_phone_numbers_as_e164() {
    let schema = member_schema();
    let record: Record = [("phone_number", "(303) 555-4202")].into_iter().collect();
    assert_eq!(
        schema.field_value(&record, "phone_number").unwrap(),
        json!("+13035554202")
    );

    let record: Record = [("phone_number", "303-555-4202 ext 1234")].into_iter().collect();
    assert_eq!(schema.field_value(&record, "phone_number").unwrap(), Value::Null);
}

#[test]
fn test_transforms_all_fields_in_order() {
    let result = member_schema().transform(&member("John"));
    assert!(result.is_valid());
    assert_eq!(result.values, expected_values("John"));
}

#[test]
fn test_fields_are_required_by_default() {
    let schema = member_schema();
    let record = without(member("John"), "last_name");
    let mut transformer = RecordTransformer::new(&schema, &record);

    assert!(!transformer.is_valid());
    assert!(transformer
        .errors()
        .contains(&FieldError::new("last_name", "is required")));
    assert_eq!(transformer.values().len(), schema.len());
}

#[test]
fn test_optional_fields_may_be_missing() {
    let schema = member_schema();
    let record = without(without(member("John"), "expiry_date"), "phone_number");
    let result = schema.transform(&record);

    assert!(result.is_valid());
    assert_eq!(result.values[5], Value::Null);
    assert_eq!(result.values[6], Value::Null);
}

#[test]
fn test_optional_field_with_bad_value_is_silently_null() {
    let mut record = member("John");
    record.data.insert("phone_number".to_string(), json!("555-4202"));
    let result = member_schema().transform(&record);

    assert!(result.is_valid());
    assert_eq!(result.values[6], Value::Null);
}

#[test]
fn test_validity_check_does_not_double_count() {
    let schema = member_schema();
    let record = without(member("John"), "dob");
    let sink = MemorySink::new();
    let (mut reporter, _) = test_reporter(&sink);

    {
        let mut transformer = RecordTransformer::new(&schema, &record)
            .with_row(0)
            .with_reporter(&mut reporter);
        let first = transformer.is_valid();
        let second = transformer.is_valid();
        assert_eq!(first, second);
    }

    assert_eq!(reporter.transformed_records(), 0);
    assert_eq!(reporter.invalid_records().len(), 1);
}

#[test]
fn test_transforms_batches_of_records() {
    let records = vec![member("John"), member("Jane")];
    let sink = MemorySink::new();
    let (mut reporter, _) = test_reporter(&sink);

    let rows = member_schema()
        .transform_batch(&records, Some(&mut reporter))
        .unwrap();

    assert_eq!(rows, vec![expected_values("John"), expected_values("Jane")]);
    assert_eq!(reporter.transformed_records(), 2);
    assert!(reporter.invalid_records().is_empty());
}

#[test]
fn test_reports_on_invalid_records() {
    let mut jill = member("Jill");
    jill.data.insert("dob".to_string(), json!(""));
    let records = vec![member("John"), member("Jane"), jill];
    let sink = MemorySink::new();
    let (mut reporter, clock) = test_reporter(&sink);
    clock.advance(Duration::seconds(2));

    let rows = member_schema()
        .transform_batch(&records, Some(&mut reporter))
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(reporter.transformed_records(), 2);
    assert_eq!(
        reporter.invalid_records(),
        &[ReportEntry {
            row: 2,
            errors: vec![FieldError::required("dob")],
        }]
    );

    let report = sink.last().unwrap();
    assert_eq!(
        report,
        [
            "Importa report:",
            "---------------",
            "Started at: 2024-06-01 12:00:00 +0000",
            "Finished at: 2024-06-01 12:00:02 +0000",
            "Duration: 2.0 seconds",
            "Total records: 3",
            "Transformed records: 2",
            "Invalid records: 1",
            "Errors:",
            "Row 2, Errors: 1",
            "- dob is required",
        ]
        .join("\n")
    );
}

#[test]
fn test_missing_last_name_is_dropped_from_batch() {
    let records = vec![without(member("John"), "last_name"), member("Jane")];
    let sink = MemorySink::new();
    let (mut reporter, _) = test_reporter(&sink);

    let rows = member_schema()
        .transform_batch(&records, Some(&mut reporter))
        .unwrap();

    assert_eq!(rows, vec![expected_values("Jane")]);
    assert_eq!(reporter.invalid_records()[0].row, 0);
    assert_eq!(
        reporter.invalid_records()[0].errors,
        vec![FieldError::required("last_name")]
    );
}

#[test]
fn test_refinement_on_top_of_custom_formatter() {
    let schema = Schema::builder()
        .formatter("member_code", |value: &Value| match value.as_str() {
            Some(code) if code.starts_with('M') => json!(code.trim_start_matches('M')),
            _ => Value::Null,
        })
        .field(Field::new("code").format("member_code").refine(|value| {
            value
                .as_str()
                .and_then(|digits| digits.parse::<i64>().ok())
                .map(Value::from)
                .unwrap_or(Value::Null)
        }))
        .build()
        .unwrap();

    let good: Record = [("code", "M0042")].into_iter().collect();
    let bad: Record = [("code", "X0042")].into_iter().collect();

    assert_eq!(schema.transform(&good).values, vec![json!(42)]);
    assert_eq!(
        schema.transform(&bad).errors,
        vec![FieldError::required("code")]
    );
}
