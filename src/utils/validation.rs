use crate::utils::error::{ImportaError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 輸入來源：http(s) URL 或本地檔案路徑
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Http(Url),
    File(String),
}

/// Classifies an input string. Anything that parses as a URL with an
/// `http`/`https` scheme is remote; everything else is treated as a path.
pub fn classify_source(source: &str) -> SourceKind {
    match Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => SourceKind::Http(url),
        _ => SourceKind::File(source.to_string()),
    }
}

pub fn validate_source(field_name: &str, source: &str) -> Result<()> {
    validate_non_empty_string(field_name, source)?;
    match classify_source(source) {
        SourceKind::Http(url) if url.host_str().is_none() => {
            Err(ImportaError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: source.to_string(),
                reason: "URL has no host".to_string(),
            })
        }
        SourceKind::Http(_) => Ok(()),
        SourceKind::File(path) => validate_path(field_name, &path),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ImportaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ImportaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 檔名不可包含路徑分隔符號
pub fn validate_file_name(field_name: &str, name: &str) -> Result<()> {
    validate_path(field_name, name)?;
    if name.contains('/') || name.contains('\\') {
        return Err(ImportaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Expected a bare file name, not a path".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ImportaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
