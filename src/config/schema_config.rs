use crate::core::formatters::DEFAULT_FORMATTER;
use crate::core::schema::{Field, Schema};
use crate::utils::error::{ImportaError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub schema: SchemaInfo,
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub formatter: Option<String>, // 預設 "string"
    #[serde(default)]
    pub optional: bool,
    pub refine: Option<RefineOp>,
}

/// Post-formatting refinements that can be named in a schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefineOp {
    Uppercase,
    Lowercase,
    CollapseWhitespace,
    RemoveHtmlTags,
}

fn html_tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("html tag pattern is valid"))
}

impl RefineOp {
    /// Only strings are refined; other values pass through untouched.
    pub fn apply(self, value: Value) -> Value {
        let text = match value {
            Value::String(text) => text,
            other => return other,
        };
        let refined = match self {
            RefineOp::Uppercase => text.to_uppercase(),
            RefineOp::Lowercase => text.to_lowercase(),
            RefineOp::CollapseWhitespace => text.split_whitespace().collect::<Vec<_>>().join(" "),
            RefineOp::RemoveHtmlTags => html_tag_pattern().replace_all(&text, "").into_owned(),
        };
        Value::String(refined)
    }
}

impl SchemaConfig {
    /// 從 TOML 檔案載入 schema
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ImportaError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析 schema
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ImportaError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SCHEMA_NAME})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Builds the runtime schema. Formatter names are resolved against the
    /// built-in registry, so a typo fails here.
    pub fn build_schema(&self) -> Result<Schema> {
        self.validate()?;

        let fields = self.fields.iter().map(|config| {
            let field = Field::new(&config.name)
                .format(config.formatter.as_deref().unwrap_or(DEFAULT_FORMATTER))
                .with_optional(config.optional);
            match config.refine {
                Some(op) => field.refine(move |value| op.apply(value)),
                None => field,
            }
        });

        let schema = Schema::builder()
            .name(&self.schema.name)
            .fields(fields)
            .build()?;

        tracing::info!(
            "📋 Loaded schema '{}' ({} fields)",
            schema.name(),
            schema.len()
        );
        Ok(schema)
    }
}

impl Validate for SchemaConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("schema.name", &self.schema.name)?;

        if self.fields.is_empty() {
            return Err(ImportaError::ConfigValidationError {
                field: "fields".to_string(),
                message: "Schema must declare at least one field".to_string(),
            });
        }

        for (index, field) in self.fields.iter().enumerate() {
            validate_non_empty_string(&format!("fields[{}].name", index), &field.name)?;
            if let Some(formatter) = &field.formatter {
                validate_non_empty_string(&format!("fields[{}].formatter", index), formatter)?;
            }
        }

        Ok(())
    }
}
