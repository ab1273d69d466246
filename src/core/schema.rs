use crate::core::formatters::{is_blank, FormatterFn, FormatterRegistry, DEFAULT_FORMATTER};
use crate::domain::model::{FieldError, Record};
use crate::utils::error::{ImportaError, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub type RefineFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

const DEFAULT_SCHEMA_NAME: &str = "schema";

#[derive(Clone)]
pub enum FormatterRef {
    Named(String),
    Custom(FormatterFn),
}

impl fmt::Debug for FormatterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatterRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            FormatterRef::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Declaration of one output column, before formatter names are resolved.
///
/// ```ignore
/// Field::new("dob").format("date")
/// Field::new("expiry_date").format("date").optional()
/// Field::new("last_name").refine(|v| Value::String(text_of(&v).to_uppercase()))
/// ```
#[derive(Clone)]
pub struct Field {
    name: String,
    formatter: FormatterRef,
    optional: bool,
    refine: Option<RefineFn>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formatter: FormatterRef::Named(DEFAULT_FORMATTER.to_string()),
            optional: false,
            refine: None,
        }
    }

    pub fn format(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = FormatterRef::Named(formatter.into());
        self
    }

    /// 欄位專用的 formatter，不會註冊到 schema 的 registry
    pub fn format_with<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.formatter = FormatterRef::Custom(Arc::new(formatter));
        self
    }

    pub fn optional(self) -> Self {
        self.with_optional(true)
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn refine<F>(mut self, refine: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.refine = Some(Arc::new(refine));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("formatter", &self.formatter)
            .field("optional", &self.optional)
            .field("refine", &self.refine.is_some())
            .finish()
    }
}

/// A field whose formatter has been bound.
#[derive(Clone)]
pub struct FieldDeclaration {
    name: String,
    formatter_name: Option<String>,
    formatter: FormatterFn,
    optional: bool,
    refine: Option<RefineFn>,
}

impl FieldDeclaration {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` for inline formatters.
    pub fn formatter_name(&self) -> Option<&str> {
        self.formatter_name.as_deref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn has_refine(&self) -> bool {
        self.refine.is_some()
    }

    /// `refine(formatter(record[name]))`; a missing key is treated as null.
    pub fn evaluate(&self, record: &Record) -> Value {
        let raw = record.get(&self.name).unwrap_or(&Value::Null);
        let value = (self.formatter)(raw);
        match &self.refine {
            Some(refine) => refine(value),
            None => value,
        }
    }

    pub fn check(&self, value: &Value) -> Option<FieldError> {
        if !self.optional && is_blank(value) {
            Some(FieldError::required(&self.name))
        } else {
            None
        }
    }
}

impl fmt::Debug for FieldDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDeclaration")
            .field("name", &self.name)
            .field("formatter", &self.formatter_name.as_deref().unwrap_or("<inline>"))
            .field("optional", &self.optional)
            .field("refine", &self.refine.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    registry: FormatterRegistry,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_SCHEMA_NAME.to_string(),
            registry: FormatterRegistry::with_builtins(),
            fields: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a formatter visible only to the schema being built.
    pub fn formatter<F>(mut self, name: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.registry.register(name, formatter);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Resolves every formatter name; unknown formatters and repeated field
    /// names fail here rather than at transform time.
    pub fn build(self) -> Result<Schema> {
        let mut seen = HashSet::new();
        let mut declarations = Vec::with_capacity(self.fields.len());

        for field in self.fields {
            if !seen.insert(field.name.clone()) {
                return Err(ImportaError::DuplicateField { name: field.name });
            }

            let (formatter_name, formatter) = match field.formatter {
                FormatterRef::Named(name) => {
                    let formatter = self.registry.resolve(&name).ok_or_else(|| {
                        ImportaError::UnknownFormatter {
                            name: name.clone(),
                            field: field.name.clone(),
                        }
                    })?;
                    (Some(name), formatter)
                }
                FormatterRef::Custom(formatter) => (None, formatter),
            };

            declarations.push(FieldDeclaration {
                name: field.name,
                formatter_name,
                formatter,
                optional: field.optional,
                refine: field.refine,
            });
        }

        tracing::debug!(
            "Built schema '{}' with {} fields",
            self.name,
            declarations.len()
        );

        Ok(Schema {
            name: self.name,
            fields: declarations,
            registry: self.registry,
        })
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered, immutable field declarations plus the schema's private formatter
/// registry.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDeclaration>,
    registry: FormatterRegistry,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDeclaration] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(FieldDeclaration::name).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn registry(&self) -> &FormatterRegistry {
        &self.registry
    }

    pub fn field(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Final value of a single field, without validation side effects.
    pub fn field_value(&self, record: &Record, name: &str) -> Result<Value> {
        self.field(name)
            .map(|field| field.evaluate(record))
            .ok_or_else(|| ImportaError::UnknownField {
                name: name.to_string(),
            })
    }
}
