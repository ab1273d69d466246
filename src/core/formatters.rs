//! Built-in coercion rules and the name → formatter registry.
//!
//! Every formatter is total: malformed input maps to `Value::Null` instead of
//! an error, and callers decide whether a null is acceptable.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

pub type FormatterFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

pub const BUILTIN_FORMATTERS: [&str; 7] =
    ["raw", "string", "date", "phone", "integer", "float", "boolean"];

pub const DEFAULT_FORMATTER: &str = "string";

#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: HashMap<String, FormatterFn>,
}

impl FormatterRegistry {
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("raw", format_raw);
        registry.register("string", format_string);
        registry.register("date", format_date);
        registry.register("phone", format_phone);
        registry.register("integer", format_integer);
        registry.register("float", format_float);
        registry.register("boolean", format_boolean);
        registry
    }

    /// 同名的 formatter 會被覆蓋
    pub fn register<F>(&mut self, name: impl Into<String>, formatter: F)
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.register_shared(name, Arc::new(formatter));
    }

    pub fn register_shared(&mut self, name: impl Into<String>, formatter: FormatterFn) {
        self.formatters.insert(name.into(), formatter);
    }

    pub fn resolve(&self, name: &str) -> Option<FormatterFn> {
        self.formatters.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.formatters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("formatters", &self.names())
            .finish()
    }
}

/// Textual form of a raw value: null is empty, strings are taken verbatim,
/// scalars use their display form and containers their compact JSON.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Null, empty strings and empty containers count as missing.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

pub fn format_raw(value: &Value) -> Value {
    value.clone()
}

pub fn format_string(value: &Value) -> Value {
    Value::String(text_of(value).trim().to_string())
}

pub fn format_boolean(value: &Value) -> Value {
    Value::Bool(text_of(value) == "true")
}

pub fn format_integer(value: &Value) -> Value {
    let parsed = match value {
        // 浮點數直接截斷，超出範圍時飽和
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        other => leading_integer(&text_of(other)),
    };
    Value::from(parsed)
}

pub fn format_float(value: &Value) -> Value {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        other => leading_float(&text_of(other)),
    };
    Number::from_f64(parsed)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn integer_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([+-]?\d+)").expect("integer prefix pattern is valid"))
}

fn float_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d+)?|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("float prefix pattern is valid")
    })
}

fn leading_integer(text: &str) -> i64 {
    let Some(caps) = integer_prefix().captures(text) else {
        return 0;
    };
    let digits = &caps[1];
    digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn leading_float(text: &str) -> f64 {
    float_prefix()
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .unwrap_or(0.0)
}

pub fn format_phone(value: &Value) -> Value {
    let digits: String = text_of(value)
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    let national = match digits.strip_prefix('1') {
        Some(rest) if digits.len() == 11 => rest,
        _ => digits.as_str(),
    };

    if national.len() == 10 {
        Value::String(format!("+1{}", national))
    } else {
        Value::Null
    }
}

struct DatePattern {
    format: &'static str,
    recognizer: Regex,
}

// 順序即優先權：第一個 regex 命中且能解析的格式勝出
const DATE_PATTERNS: [(&str, &str); 14] = [
    ("%m-%d-%y", r"^\d{1,2}-\d{1,2}-\d{2}$"),           // 1-11-88
    ("%m/%d/%y", r"^\d{1,2}/\d{1,2}/\d{2}$"),           // 01/11/88
    ("%m-%d-%Y", r"^\d{1,2}-\d{1,2}-\d{4}$"),           // 01-11-1988
    ("%m/%d/%Y", r"^\d{1,2}/\d{1,2}/\d{4}$"),           // 01/11/1988
    ("%d-%m-%y", r"^\d{1,2}-\d{1,2}-\d{2}$"),           // 11-01-88
    ("%d/%m/%y", r"^\d{1,2}/\d{1,2}/\d{2}$"),           // 11/01/88
    ("%d-%m-%Y", r"^\d{1,2}-\d{1,2}-\d{4}$"),           // 11-01-1988
    ("%d/%m/%Y", r"^\d{1,2}/\d{1,2}/\d{4}$"),           // 11/01/1988
    ("%Y-%m-%d", r"^\d{4}-\d{2}-\d{2}$"),               // 1988-01-11
    ("%Y/%m/%d", r"^\d{4}/\d{2}/\d{2}$"),               // 1988/01/11
    ("%B %d, %Y", r"^[A-Za-z]+ \d{1,2}, \d{4}$"),       // January 11, 1988
    ("%b %d, %Y", r"^[A-Za-z]{3} \d{1,2}, \d{4}$"),     // Jan 11, 1988
    ("%d %B, %Y", r"^\d{1,2} [A-Za-z]+, \d{4}$"),       // 11 January, 1988
    ("%d %b, %Y", r"^\d{1,2} [A-Za-z]{3}, \d{4}$"),     // 11 Jan, 1988
];

fn date_patterns() -> &'static [DatePattern] {
    static PATTERNS: OnceLock<Vec<DatePattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        DATE_PATTERNS
            .iter()
            .map(|&(format, pattern)| DatePattern {
                format,
                recognizer: Regex::new(pattern).expect("date recognizer pattern is valid"),
            })
            .collect()
    })
}

/// Tries each recognized layout in priority order. A layout whose regex
/// matches but whose parse fails (e.g. month 13) falls through to the next.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    date_patterns()
        .iter()
        .filter(|pattern| pattern.recognizer.is_match(text))
        .find_map(|pattern| {
            let date = NaiveDate::parse_from_str(text, pattern.format).ok()?;
            if pattern.format.contains("%y") {
                Some(pivot_two_digit_year(date))
            } else {
                Some(date)
            }
        })
}

// 兩位數年份：00-68 → 20xx，69-99 → 19xx (chrono 把 69 當成 2069)
const TWO_DIGIT_YEAR_PIVOT: i32 = 2069;

fn pivot_two_digit_year(date: NaiveDate) -> NaiveDate {
    if date.year() >= TWO_DIGIT_YEAR_PIVOT {
        date.with_year(date.year() - 100).unwrap_or(date)
    } else {
        date
    }
}

pub fn format_date(value: &Value) -> Value {
    parse_date(&text_of(value))
        .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
        .unwrap_or(Value::Null)
}
