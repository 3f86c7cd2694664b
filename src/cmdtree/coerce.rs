//! # Value Coercion
//!
//! Command-line arguments are text; declared parameters are typed. The [`CoercionRegistry`]
//! bridges the two: it maps a type name to a function turning text into a [`Value`], and
//! decodes array-like and record-like generic types by splitting the text and coercing each
//! piece with the coercer of the element, key or value type.
//!
//! Lookup order for `coerce(type_name, text)`:
//!
//! 1. A coercer registered under the exact type name wins.
//! 2. Otherwise the name is parsed with [`crate::typename::parse`]. Array-like types split on
//!    the array separator, record-like types on the entry separator and then once on the
//!    key/value separator.
//! 3. Anything else has no coercer.
//!
//! Separators are part of [`CoerceOptions`] rather than fixed characters.

use crate::error::{CliError, Result};
use crate::typename::{self, TypeDescriptor, TypeShape};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Converts argument text into a typed value.
pub type Coercer = Arc<dyn Fn(&str) -> Result<Value> + Send + Sync>;

const TRUE_WORDS: &[&str] = &["yes", "1", "on", "true"];
const FALSE_WORDS: &[&str] = &["no", "0", "off", "false"];

/// Separators and trimming used when decoding collection text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoerceOptions {
    #[serde(default = "default_separator")]
    pub array_separator: String,
    #[serde(default = "default_separator")]
    pub entry_separator: String,
    #[serde(default = "default_key_value_separator")]
    pub key_value_separator: String,
    /// Trim whitespace around every split segment.
    #[serde(default)]
    pub trim: bool,
}

fn default_separator() -> String {
    ",".to_string()
}

fn default_key_value_separator() -> String {
    "=".to_string()
}

impl Default for CoerceOptions {
    fn default() -> Self {
        Self {
            array_separator: default_separator(),
            entry_separator: default_separator(),
            key_value_separator: default_key_value_separator(),
            trim: false,
        }
    }
}

impl CoerceOptions {
    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    fn segment<'a>(&self, text: &'a str) -> &'a str {
        if self.trim {
            text.trim()
        } else {
            text
        }
    }
}

#[derive(Clone)]
pub struct CoercionRegistry {
    coercers: HashMap<String, Coercer>,
    options: CoerceOptions,
}

impl Default for CoercionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CoercionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.coercers.keys().collect();
        names.sort();
        f.debug_struct("CoercionRegistry")
            .field("coercers", &names)
            .field("options", &self.options)
            .finish()
    }
}

impl CoercionRegistry {
    /// Creates a registry seeded with the built-in scalar coercers.
    pub fn new() -> Self {
        let mut registry = Self {
            coercers: HashMap::new(),
            options: CoerceOptions::default(),
        };
        registry.register("string", |text| Ok(Value::String(text.to_string())));
        registry.register("number", coerce_number);
        registry.register("bigint", coerce_bigint);
        registry.register("boolean", |text| coerce_boolean(text).map(Value::Bool));
        registry.register("date", coerce_date);
        for passthrough in ["undefined", "unknown", "any"] {
            registry.register(passthrough, |text| Ok(Value::String(text.to_string())));
        }
        registry
    }

    pub fn with_options(mut self, options: CoerceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CoerceOptions {
        &self.options
    }

    /// Registers (or replaces) the coercer for a type name.
    pub fn register<F>(&mut self, type_name: &str, coercer: F)
    where
        F: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        self.coercers.insert(type_name.to_string(), Arc::new(coercer));
    }

    pub fn has(&self, type_name: &str) -> bool {
        self.coercers.contains_key(type_name)
    }

    /// Coerces text using the registry's default options.
    pub fn coerce(&self, type_name: &str, text: &str) -> Result<Value> {
        self.coerce_with(type_name, text, &self.options)
    }

    /// Coerces text with explicit separators and trimming.
    pub fn coerce_with(&self, type_name: &str, text: &str, options: &CoerceOptions) -> Result<Value> {
        if let Some(coercer) = self.coercers.get(type_name) {
            return coercer(text);
        }
        let descriptor = typename::parse(type_name)?;
        self.coerce_descriptor(&descriptor, text, options)
    }

    fn coerce_descriptor(
        &self,
        descriptor: &TypeDescriptor,
        text: &str,
        options: &CoerceOptions,
    ) -> Result<Value> {
        if let Some(coercer) = self.coercers.get(&descriptor.type_name) {
            if !descriptor.is_generic() {
                return coercer(text);
            }
        }
        if let Some(coercer) = self.coercers.get(&descriptor.to_string()) {
            return coercer(text);
        }

        match descriptor.shape()? {
            TypeShape::Array { element } => text
                .split(options.array_separator.as_str())
                .map(|item| self.coerce_descriptor(element, options.segment(item), options))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            TypeShape::Record { key, value } => {
                let mut map = Map::new();
                for entry in text.split(options.entry_separator.as_str()) {
                    let entry = options.segment(entry);
                    let (raw_key, raw_value) =
                        match entry.split_once(options.key_value_separator.as_str()) {
                            Some((k, v)) => (options.segment(k), Some(options.segment(v))),
                            None => (entry, None),
                        };
                    if raw_key.is_empty() {
                        return Err(CliError::MalformedEntry {
                            entry: entry.to_string(),
                        });
                    }
                    let coerced_key = self.coerce_descriptor(key, raw_key, options)?;
                    let coerced_value = match raw_value {
                        Some(v) => self.coerce_descriptor(value, v, options)?,
                        None => Value::Null,
                    };
                    map.insert(key_text(coerced_key), coerced_value);
                }
                Ok(Value::Object(map))
            }
            TypeShape::Plain => Err(CliError::NoCoercer {
                type_name: descriptor.to_string(),
            }),
        }
    }
}

fn key_text(key: Value) -> String {
    match key {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn invalid(type_name: &str, text: &str) -> CliError {
    CliError::InvalidValue {
        type_name: type_name.to_string(),
        text: text.to_string(),
    }
}

fn coerce_number(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Value::Number(n.into()));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| invalid("number", text))
}

fn coerce_bigint(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("bigint", text));
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Value::Number(n.into()));
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return Ok(Value::Number(n.into()));
    }
    // Too wide for a JSON number; keep the exact digits.
    Ok(Value::String(trimmed.to_string()))
}

/// Interprets yes/no style words, case-insensitively.
pub fn coerce_boolean(text: &str) -> Result<bool> {
    let lowered = text.trim().to_lowercase();
    if TRUE_WORDS.contains(&lowered.as_str()) {
        Ok(true)
    } else if FALSE_WORDS.contains(&lowered.as_str()) {
        Ok(false)
    } else {
        Err(CliError::InvalidBoolean {
            value: text.to_string(),
        })
    }
}

fn coerce_date(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Value::String(dt.with_timezone(&Utc).to_rfc3339()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Value::String(naive.and_utc().to_rfc3339()))
        .ok_or_else(|| invalid("date", text))
}
