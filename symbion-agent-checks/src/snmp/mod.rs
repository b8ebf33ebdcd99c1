//! SNMP poll result helpers
//!
//! Poll results arrive as a map of OID -> value where the value kind depends
//! on the producing subsystem: counters may come back as floats or as decimal
//! strings. `SnmpValues` normalizes them into `f64`.

use std::collections::HashMap;

/// A single value from an SNMP poll
#[derive(Debug, Clone, PartialEq)]
pub enum SnmpValue {
    Float64(f64),
    String(String),
    OctetString(Vec<u8>),
    Null,
}

impl From<f64> for SnmpValue {
    fn from(v: f64) -> Self {
        SnmpValue::Float64(v)
    }
}

impl From<&str> for SnmpValue {
    fn from(v: &str) -> Self {
        SnmpValue::String(v.to_string())
    }
}

impl From<String> for SnmpValue {
    fn from(v: String) -> Self {
        SnmpValue::String(v)
    }
}

/// OID -> value map of one poll
#[derive(Debug, Clone, Default)]
pub struct SnmpValues {
    values: HashMap<String, SnmpValue>,
}

impl SnmpValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<SnmpValue>>(&mut self, oid: K, value: V) {
        self.values.insert(oid.into(), value.into());
    }

    /// Look up `oid` and coerce it to `f64`.
    ///
    /// `None` means the OID is absent. A present value that is neither a float
    /// nor a base-10 `i64` string yields `Some(0.0)`, so callers cannot tell an
    /// unusable value from a real zero.
    pub fn get_float64(&self, oid: &str) -> Option<f64> {
        let value = self.values.get(oid)?;

        let coerced = match value {
            SnmpValue::Float64(v) => *v,
            SnmpValue::String(s) => s.parse::<i64>().map(|v| v as f64).unwrap_or(0.0),
            SnmpValue::OctetString(_) | SnmpValue::Null => 0.0,
        };

        Some(coerced)
    }
}

impl<K: Into<String>, V: Into<SnmpValue>> FromIterator<(K, V)> for SnmpValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
