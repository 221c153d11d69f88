// src/device/catalog.rs
// Parameter catalog: the set of known data points and their declared types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::value::{DataType, ParamValue};
use crate::error::{HtError, Result};

const BUILTIN_CATALOG: &str = include_str!("htparams.toml");

/// Data point class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DpType {
    /// Regular data point, read one at a time
    #[serde(rename = "SP")]
    Sp,
    /// Data point supporting the batched fast query
    #[serde(rename = "MP")]
    Mp,
}

/// Declaration of a single parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub dp_type: DpType,
    pub dp_number: u16,
    pub data_type: DataType,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl ParamDef {
    pub fn is_fast_queryable(&self) -> bool {
        self.dp_type == DpType::Mp
    }

    /// Value a freshly reset device reports for this parameter
    pub fn initial_value(&self) -> ParamValue {
        match self.data_type {
            DataType::Bool => ParamValue::Bool(false),
            DataType::Int => ParamValue::Int(self.min.unwrap_or(0.0) as i64),
            DataType::Float => ParamValue::Float(self.min.unwrap_or(0.0)),
        }
    }

    /// Check the type and the declared range of a value
    pub fn verify(&self, value: &ParamValue) -> Result<()> {
        if value.data_type() != self.data_type {
            return Err(HtError::invalid_value(
                &self.name,
                format!("expected {:?}, got {:?}", self.data_type, value.data_type()),
            ));
        }
        let v = value.as_f64();
        if let Some(min) = self.min
            && v < min
        {
            return Err(HtError::invalid_value(
                &self.name,
                format!("{value} is below the minimum of {min}"),
            ));
        }
        if let Some(max) = self.max
            && v > max
        {
            return Err(HtError::invalid_value(
                &self.name,
                format!("{value} is above the maximum of {max}"),
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(rename = "param", default)]
    params: Vec<ParamDef>,
}

/// Immutable lookup table of all known parameters
#[derive(Debug, Clone, Default)]
pub struct ParamCatalog {
    params: BTreeMap<String, ParamDef>,
}

impl ParamCatalog {
    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), params = catalog.len(), "Loaded parameter catalog");
        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| HtError::Catalog(e.to_string()))?;
        Self::from_defs(file.params)
    }

    pub fn from_defs(defs: impl IntoIterator<Item = ParamDef>) -> Result<Self> {
        let mut params = BTreeMap::new();
        for def in defs {
            if let (Some(min), Some(max)) = (def.min, def.max)
                && min > max
            {
                return Err(HtError::Catalog(format!(
                    "parameter '{}' has min {} > max {}",
                    def.name, min, max
                )));
            }
            if params.contains_key(&def.name) {
                return Err(HtError::Catalog(format!("duplicate parameter '{}'", def.name)));
            }
            params.insert(def.name.clone(), def);
        }
        Ok(Self { params })
    }

    pub fn get(&self, name: &str) -> Option<&ParamDef> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Look up a parameter, failing with a not-found error naming it
    pub fn require(&self, name: &str) -> Result<&ParamDef> {
        self.get(name)
            .ok_or_else(|| HtError::UnknownParams(vec![name.to_string()]))
    }

    /// Look up several parameters; all unknown names are reported together
    pub fn require_all<'a, I>(&self, names: I) -> Result<Vec<ParamDef>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut found = Vec::new();
        let mut unknown = Vec::new();
        for name in names {
            match self.get(name) {
                Some(def) => found.push(def.clone()),
                None => unknown.push(name.to_string()),
            }
        }
        if unknown.is_empty() {
            Ok(found)
        } else {
            Err(HtError::UnknownParams(unknown))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamDef> {
        self.params.values()
    }

    pub fn fast_query_params(&self) -> impl Iterator<Item = &ParamDef> {
        self.params.values().filter(|p| p.is_fast_queryable())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
        [[param]]
        name = "HeatingActive"
        dp_type = "SP"
        dp_number = 1
        data_type = "BOOL"

        [[param]]
        name = "Temp. Aussen"
        dp_type = "MP"
        dp_number = 0
        data_type = "FLOAT"
        min = -20
        max = 40
    "#;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = ParamCatalog::builtin().unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.contains("Temp. Aussen"));
        assert!(catalog.fast_query_params().count() > 0);
    }

    #[test]
    fn test_integer_bounds_accepted_for_float() {
        let catalog = ParamCatalog::from_toml_str(SMALL).unwrap();
        let def = catalog.get("Temp. Aussen").unwrap();
        assert_eq!(def.min, Some(-20.0));
        assert!(def.is_fast_queryable());
    }

    #[test]
    fn test_require_all_reports_every_unknown_name() {
        let catalog = ParamCatalog::from_toml_str(SMALL).unwrap();
        let err = catalog
            .require_all(["HeatingActive", "Foo", "Bar"])
            .unwrap_err();
        match err {
            HtError::UnknownParams(names) => assert_eq!(names, vec!["Foo", "Bar"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let doubled = format!("{SMALL}{SMALL}");
        assert!(matches!(
            ParamCatalog::from_toml_str(&doubled),
            Err(HtError::Catalog(_))
        ));
    }

    #[test]
    fn test_verify_range_and_type() {
        let catalog = ParamCatalog::from_toml_str(SMALL).unwrap();
        let def = catalog.get("Temp. Aussen").unwrap();
        assert!(def.verify(&ParamValue::Float(12.5)).is_ok());
        assert!(def.verify(&ParamValue::Float(41.0)).is_err());
        assert!(def.verify(&ParamValue::Bool(true)).is_err());
    }
}
