//! Supplier parameter registry
//!
//! Loaded once and passed by reference into every simulation call.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::params::CountryParams;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierRegistry {
    suppliers: FxHashMap<String, CountryParams>,
}

impl SupplierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_supplier(mut self, name: impl Into<String>, params: CountryParams) -> Self {
        self.suppliers.insert(name.into(), params);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CountryParams> {
        self.suppliers.get(name)
    }

    pub fn len(&self) -> usize {
        self.suppliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suppliers.is_empty()
    }

    /// Supplier names in sorted order.
    ///
    /// Map iteration order differs between processes, so anything that
    /// consumes random draws per supplier must iterate in this order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.suppliers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Suppliers in sorted-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CountryParams)> {
        self.names()
            .into_iter()
            .map(move |name| (name, &self.suppliers[name]))
    }
}

impl FromIterator<(String, CountryParams)> for SupplierRegistry {
    fn from_iter<T: IntoIterator<Item = (String, CountryParams)>>(iter: T) -> Self {
        Self {
            suppliers: iter.into_iter().collect(),
        }
    }
}
