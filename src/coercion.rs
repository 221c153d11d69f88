// src/coercion.rs
// Value coercion between JSON request/response bodies and native device values

use serde_json::Value;
use tracing::debug;

use crate::device::{DataType, ParamDef, ParamValue};
use crate::error::{HtError, Result};

/// Process-wide presentation policy, fixed at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValuePolicy {
    /// Render boolean parameters as 0/1
    pub bool_as_int: bool,
    /// Skip every device write and echo the supplied value instead
    pub read_only: bool,
}

impl ValuePolicy {
    pub fn new(bool_as_int: bool, read_only: bool) -> Self {
        Self {
            bool_as_int,
            read_only,
        }
    }

    /// Translate a JSON value into the native type of `def`
    pub fn decode(&self, def: &ParamDef, value: &Value) -> Result<ParamValue> {
        let invalid = || {
            HtError::invalid_value(
                &def.name,
                format!("{value} is not a valid {:?} value", def.data_type),
            )
        };
        match def.data_type {
            DataType::Bool => parse_bool(value).map(ParamValue::Bool).ok_or_else(invalid),
            DataType::Int => {
                if let Some(i) = value.as_i64() {
                    Ok(ParamValue::Int(i))
                } else {
                    match value.as_f64() {
                        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                            Ok(ParamValue::Int(f as i64))
                        }
                        _ => Err(invalid()),
                    }
                }
            }
            DataType::Float => value.as_f64().map(ParamValue::Float).ok_or_else(invalid),
        }
    }

    /// Render a native value for the client; bool-as-int is applied here
    pub fn encode(&self, value: &ParamValue) -> Value {
        match *value {
            ParamValue::Bool(b) if self.bool_as_int => Value::from(u8::from(b)),
            other => other.to_json(),
        }
    }

    pub fn encode_optional(&self, value: Option<&ParamValue>) -> Value {
        value.map_or(Value::Null, |v| self.encode(v))
    }

    /// Run `write` unless read-only is set, in which case `value` is echoed
    pub fn guard_write<T, F>(&self, value: T, write: F) -> Result<T>
    where
        F: FnOnce(T) -> Result<T>,
    {
        if self.read_only {
            debug!("Read-only mode, device write skipped");
            Ok(value)
        } else {
            write(value)
        }
    }
}

/// Truthy/falsy interpretation for boolean parameters
fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Some(true),
            "false" | "0" | "off" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DpType;
    use serde_json::json;

    fn def(data_type: DataType) -> ParamDef {
        ParamDef {
            name: "HeatingActive".to_string(),
            dp_type: DpType::Sp,
            dp_number: 1,
            data_type,
            min: None,
            max: None,
        }
    }

    #[test]
    fn test_bool_accepts_truthy_tokens() {
        let policy = ValuePolicy::default();
        let d = def(DataType::Bool);
        for v in [json!(true), json!(1), json!(2.5), json!("yes"), json!("ON"), json!("1")] {
            assert_eq!(policy.decode(&d, &v).unwrap(), ParamValue::Bool(true), "{v}");
        }
        for v in [json!(false), json!(0), json!("off"), json!("false")] {
            assert_eq!(policy.decode(&d, &v).unwrap(), ParamValue::Bool(false), "{v}");
        }
        assert!(policy.decode(&d, &json!("maybe")).is_err());
        assert!(policy.decode(&d, &json!(null)).is_err());
    }

    #[test]
    fn test_int_rejects_fractions() {
        let policy = ValuePolicy::default();
        let d = def(DataType::Int);
        assert_eq!(policy.decode(&d, &json!(4)).unwrap(), ParamValue::Int(4));
        assert_eq!(policy.decode(&d, &json!(4.0)).unwrap(), ParamValue::Int(4));
        assert!(policy.decode(&d, &json!(4.5)).is_err());
        assert!(policy.decode(&d, &json!(true)).is_err());
    }

    #[test]
    fn test_float_accepts_integers() {
        let policy = ValuePolicy::default();
        let d = def(DataType::Float);
        assert_eq!(policy.decode(&d, &json!(21)).unwrap(), ParamValue::Float(21.0));
    }

    #[test]
    fn test_encode_bool_as_int() {
        let plain = ValuePolicy::new(false, false);
        let as_int = ValuePolicy::new(true, false);
        assert_eq!(plain.encode(&ParamValue::Bool(true)), json!(true));
        assert_eq!(as_int.encode(&ParamValue::Bool(true)), json!(1));
        assert_eq!(as_int.encode(&ParamValue::Bool(false)), json!(0));
        assert_eq!(as_int.encode(&ParamValue::Float(1.5)), json!(1.5));
        assert_eq!(as_int.encode_optional(None), Value::Null);
    }

    #[test]
    fn test_guard_write_read_only_skips_writer() {
        let policy = ValuePolicy::new(false, true);
        let echoed = policy
            .guard_write(7, |_| -> Result<i32> { panic!("writer must not run") })
            .unwrap();
        assert_eq!(echoed, 7);

        let writable = ValuePolicy::new(false, false);
        assert_eq!(writable.guard_write(7, |v| Ok(v + 1)).unwrap(), 8);
    }
}
