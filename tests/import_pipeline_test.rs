use anyhow::Result;
use httpmock::prelude::*;
use importa::{CliConfig, ImportEngine, ImportPipeline, ImportaError, LocalStorage, SchemaConfig};
use tempfile::TempDir;

const MEMBER_SCHEMA: &str = r#"
[schema]
name = "members"
description = "Monthly eligibility file"

[[fields]]
name = "first_name"

[[fields]]
name = "last_name"

[[fields]]
name = "dob"
formatter = "date"

[[fields]]
name = "member_id"

[[fields]]
name = "effective_date"
formatter = "date"

[[fields]]
name = "expiry_date"
formatter = "date"
optional = true

[[fields]]
name = "phone_number"
formatter = "phone"
optional = true
"#;

const MEMBERS_CSV: &str = r#"first_name,last_name,dob,member_id,effective_date,expiry_date,phone_number
John,Doe,01/01/2000,123,01/01/2020,01/01/2021,(303) 555-4202
Jane,Doe,1-1-00,124,2020-01-01,,303.555.4202
Jill,Doe,,125,01/01/2020,01/01/2021,(303) 555-4202
Jack,,"March 3, 1999",126,2020/01/01,,555-4202
"#;

fn cli_config(input: String, output_path: &str) -> CliConfig {
    CliConfig {
        input,
        schema: "members.toml".to_string(),
        output_path: output_path.to_string(),
        output_file: "transformed.csv".to_string(),
        report_file: "report.txt".to_string(),
        verbose: false,
        json_logs: false,
    }
}

/// CSV 檔 → schema → 輸出 CSV 與報告
#[tokio::test]
async fn test_end_to_end_csv_import() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path();
    std::fs::write(base.join("members.toml"), MEMBER_SCHEMA)?;
    std::fs::write(base.join("members.csv"), MEMBERS_CSV)?;

    let schema = SchemaConfig::from_file(base.join("members.toml"))?.build_schema()?;
    let storage = LocalStorage::new(base);
    let config = cli_config("members.csv".to_string(), "output");
    let engine = ImportEngine::new(ImportPipeline::new(storage, config, schema));

    let summary = engine.run().await?;

    assert_eq!(summary.valid_records, 2);
    assert_eq!(summary.invalid_records, 2);

    let output = std::fs::read_to_string(base.join("output").join("transformed.csv"))?;
    assert_eq!(
        output,
        "\
first_name,last_name,dob,member_id,effective_date,expiry_date,phone_number
John,Doe,2000-01-01,123,2020-01-01,2021-01-01,+13035554202
Jane,Doe,2000-01-01,124,2020-01-01,,+13035554202
"
    );

    let report = std::fs::read_to_string(base.join("output").join("report.txt"))?;
    assert!(report.starts_with("Importa report:\n---------------\nStarted at: "));
    assert!(report.contains("Total records: 4\nTransformed records: 2\nInvalid records: 2\nErrors:"));
    assert!(report.contains("Row 2, Errors: 1\n- dob is required"));
    assert!(report.contains("Row 3, Errors: 1\n- last_name is required"));
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_http_import() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/members");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {
                    "first_name": "John",
                    "last_name": "Doe",
                    "dob": "01/01/2000",
                    "member_id": 123,
                    "effective_date": "01/01/2020",
                    "phone_number": "303 555 4202"
                },
                {
                    "first_name": "Nobody",
                    "last_name": null,
                    "dob": "01/01/2000",
                    "member_id": "999",
                    "effective_date": "01/01/2020"
                }
            ]));
    });

    let schema = SchemaConfig::from_toml_str(MEMBER_SCHEMA)?.build_schema()?;
    let storage = LocalStorage::new(base);
    let config = cli_config(server.url("/members"), "http-output");
    let engine = ImportEngine::new(ImportPipeline::new(storage, config, schema));

    let summary = engine.run().await?;
    api_mock.assert();

    assert_eq!(summary.valid_records, 1);
    assert_eq!(summary.invalid_records, 1);

    let output = std::fs::read_to_string(base.join("http-output").join("transformed.csv"))?;
    assert!(output.contains("John,Doe,2000-01-01,123,2020-01-01,,+13035554202"));
    assert!(!output.contains("Nobody"));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_source_fails_the_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/members");
        then.status(500);
    });

    let schema = SchemaConfig::from_toml_str(MEMBER_SCHEMA)?.build_schema()?;
    let storage = LocalStorage::new(temp_dir.path());
    let config = cli_config(server.url("/members"), "output");
    let engine = ImportEngine::new(ImportPipeline::new(storage, config, schema));

    let result = engine.run().await;
    api_mock.assert();

    assert!(matches!(
        result,
        Err(ImportaError::SourceStatusError { status: 500, .. })
    ));
    assert!(!temp_dir.path().join("output").exists());
    Ok(())
}
