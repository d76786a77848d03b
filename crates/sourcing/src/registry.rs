//! Registry file loading
//!
//! A registry file is a YAML mapping from supplier name to its parameters,
//! in the same flat shape the built-in presets serialize to:
//!
//! ```yaml
//! China:
//!   raw: { dist: normal, mean: 30, std: 3 }
//!   ...
//!   tariff: { fixed: 0.25 }
//!   tariff_escal: 0.15
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{WrapErr, eyre};
use sourcing_core::model::{CountryParams, SupplierRegistry};
use sourcing_core::presets::default_registry;

/// Load a registry from `path`, or the built-in one when `path` is `None`
pub fn load_registry(path: Option<&Path>) -> color_eyre::Result<SupplierRegistry> {
    let Some(path) = path else {
        tracing::debug!("using built-in registry");
        return Ok(default_registry());
    };

    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read registry {}", path.display()))?;
    let registry = parse_registry(&content)
        .wrap_err_with(|| format!("failed to parse registry {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        suppliers = registry.len(),
        "loaded registry"
    );
    Ok(registry)
}

pub fn parse_registry(yaml: &str) -> color_eyre::Result<SupplierRegistry> {
    let registry: SupplierRegistry = serde_saphyr::from_str(yaml)?;
    if registry.is_empty() {
        return Err(eyre!("registry lists no suppliers"));
    }
    Ok(registry)
}

/// Serialize a registry with suppliers in sorted order
pub fn registry_to_yaml(registry: &SupplierRegistry) -> color_eyre::Result<String> {
    let sorted: BTreeMap<&str, &CountryParams> = registry.iter().collect();
    Ok(serde_saphyr::to_string(&sorted)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"
Vietnam:
  raw: { dist: normal, mean: 28, std: 2.5 }
  labor: { dist: lognormal, mean: 1.2, std: 0.1 }
  indirect: { dist: gamma, shape: 16.0, scale: 0.25 }
  logistics: { dist: normal, mean: 11, std: 2 }
  electricity: { dist: triangular, min: 3.0, mode: 3.5, max: 4.0 }
  depreciation: { dist: normal, mean: 4, std: 0.2 }
  working_capital: { dist: normal, mean: 9, std: 1 }
  yield_params: { dist: beta, a: 30, b: 2 }
  tariff: { fixed: 0.1 }
  tariff_escal: 0.05
  currency_std: 0.04
  disruption_lambda: 0.1
  disruption_min_impact: 100
  disruption_max_impact: 800
  disruption_days_delayed: 12
  analyst_note: tolerated
"#;

    #[test]
    fn test_parse_minimal_registry() {
        let registry = parse_registry(MINIMAL).unwrap();
        let vietnam = registry.get("Vietnam").unwrap();

        assert_eq!(vietnam.trade.tariff.fixed, 0.1);
        assert_eq!(vietnam.trade.tariff_escalation, 0.05);
        assert_eq!(vietnam.risks.disruption_days_delayed, 12.0);
        // Omitted risk parameters default to zero
        assert_eq!(vietnam.risks.cancellation_probability, 0.0);
        assert_eq!(vietnam.risks.border_delay_lambda, 0.0);
    }

    #[test]
    fn test_builtin_registry_round_trips_through_yaml() {
        let registry = default_registry();
        let yaml = registry_to_yaml(&registry).unwrap();
        assert!(yaml.find("China").unwrap() < yaml.find("Mexico").unwrap());

        let parsed = parse_registry(&yaml).unwrap();
        assert_eq!(parsed, registry);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("suppliers.yaml");
        fs::write(&path, MINIMAL).unwrap();

        let registry = load_registry(Some(&path)).unwrap();
        assert_eq!(registry.names(), vec!["Vietnam"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_registry(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read registry"));
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        assert!(parse_registry("{}").is_err());
    }

    #[test]
    fn test_default_when_no_path() {
        let registry = load_registry(None).unwrap();
        assert_eq!(registry.len(), 3);
    }
}
