// src/api/handlers/mod.rs
// Request handlers, one module per resource

pub mod date_time;
pub mod device;
pub mod fast_query;
pub mod fault_list;
pub mod health;
pub mod overwrite;
pub mod param;
pub mod time_prog;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{"value": ...}` request and response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ValueBody {
    pub value: Value,
}

/// `?names=a,b,c` filter of the list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct NamesQuery {
    pub names: Option<String>,
}

impl NamesQuery {
    /// Requested names in order, or `None` for "all" (also when the list
    /// is empty)
    pub fn names(&self) -> Option<Vec<String>> {
        let names: Vec<String> = self
            .names
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        (!names.is_empty()).then_some(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_query_split() {
        let query = NamesQuery {
            names: Some("Temp. Aussen, HKR Soll_Raum,,".to_string()),
        };
        assert_eq!(
            query.names().unwrap(),
            vec!["Temp. Aussen".to_string(), "HKR Soll_Raum".to_string()]
        );
        assert!(NamesQuery::default().names().is_none());

        for empty in ["", " , ,"] {
            let query = NamesQuery {
                names: Some(empty.to_string()),
            };
            assert!(query.names().is_none(), "{empty:?}");
        }
    }
}
