// src/device/value.rs
// Native parameter values as exchanged with the heat pump driver

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared scalar type of a data point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Bool,
    Int,
    Float,
}

/// A parameter value in its native representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn data_type(&self) -> DataType {
        match self {
            ParamValue::Bool(_) => DataType::Bool,
            ParamValue::Int(_) => DataType::Int,
            ParamValue::Float(_) => DataType::Float,
        }
    }

    /// Numeric view used for range checks; booleans map to 0/1
    pub fn as_f64(&self) -> f64 {
        match *self {
            ParamValue::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            ParamValue::Int(i) => i as f64,
            ParamValue::Float(f) => f,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            ParamValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match *self {
            ParamValue::Bool(b) => serde_json::Value::Bool(b),
            ParamValue::Int(i) => serde_json::Value::from(i),
            ParamValue::Float(f) => serde_json::Value::from(f),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_serialization() {
        assert_eq!(serde_json::to_string(&ParamValue::Bool(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&ParamValue::Int(-3)).unwrap(), "-3");
        assert_eq!(serde_json::to_string(&ParamValue::Float(21.5)).unwrap(), "21.5");
    }

    #[test]
    fn test_data_type_names() {
        let dt: DataType = serde_json::from_str("\"FLOAT\"").unwrap();
        assert_eq!(dt, DataType::Float);
        assert_eq!(ParamValue::Int(1).data_type(), DataType::Int);
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(ParamValue::Bool(true).as_f64(), 1.0);
        assert_eq!(ParamValue::Int(7).as_f64(), 7.0);
    }
}
