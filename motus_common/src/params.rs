//! Parameter source: an untyped configuration tree.
//!
//! Parameters stay as raw `toml::Value`s so consumers can report a wrong
//! type precisely instead of failing the whole file at deserialization.

use toml::{Table, Value};

/// Read-only access to untyped parameters.
pub trait ParameterSource {
    /// Value at `key`. Dotted keys walk nested tables (`"arm.joints"`).
    fn get(&self, key: &str) -> Option<&Value>;
}

impl ParameterSource for Table {
    fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut current = Table::get(self, first)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }
}

/// TOML type name for diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    value.type_str()
}
