//! Declarative category wiring
//!
//! Hosts can describe their extension categories as data — typically a
//! section of the application's JSON configuration — and apply the whole
//! description to a [`Registry`] in one sweep. The registry itself never
//! touches the filesystem; the host supplies the configuration string.
//!
//! # Example config
//!
//! ```json
//! {
//!   "categories": [
//!     {
//!       "name": "conversation",
//!       "single_instance": true,
//!       "interfaces": [
//!         { "name": "conversation", "operations": ["send", "status"] }
//!       ],
//!       "default": "myapp::backends:EchoBackend"
//!     },
//!     { "name": "status-icons" }
//!   ]
//! }
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RegistryError, Result};

use super::interface::Interface;
use super::registry::Registry;
use super::types::ExtensionId;

static CATEGORY_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_\-]{0,63}$").unwrap());
static OPERATION_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]{0,63}$").unwrap());

/// The categories a host wants wired into its registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Category descriptions, applied in order.
    #[serde(default)]
    pub categories: Vec<CategorySpec>,
}

/// One category description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpec {
    /// Category name. Must be 1-64 characters, alphanumeric plus hyphens
    /// and underscores, starting with alphanumeric.
    pub name: String,

    /// Whether the category caches one shared instance. Defaults to false.
    #[serde(default)]
    pub single_instance: bool,

    /// Interfaces every extension registered under the category must
    /// implement. Defaults to none.
    #[serde(default)]
    pub interfaces: Vec<InterfaceSpec>,

    /// Optional extension id to select as the category default once the
    /// host has registered its extensions (see [`select_defaults`]).
    #[serde(default)]
    pub default: Option<String>,
}

/// A required capability surface, as configuration data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceSpec {
    /// Interface name, used in validation errors.
    pub name: String,

    /// Required operation names.
    #[serde(default)]
    pub operations: Vec<String>,
}

impl RegistryConfig {
    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate category and operation names.
    pub fn validate(&self) -> Result<()> {
        for spec in &self.categories {
            if !CATEGORY_NAME_RE.is_match(&spec.name) {
                return Err(RegistryError::Config(format!(
                    "Invalid category name '{}': must be 1-64 alphanumeric characters, hyphens and underscores, starting with alphanumeric",
                    spec.name
                )));
            }
            for interface in &spec.interfaces {
                if interface.name.trim().is_empty() {
                    return Err(RegistryError::Config(format!(
                        "Category '{}' declares an interface with an empty name",
                        spec.name
                    )));
                }
                for op in &interface.operations {
                    if !OPERATION_NAME_RE.is_match(op) {
                        return Err(RegistryError::Config(format!(
                            "Invalid operation name '{}' in interface '{}' of category '{}'",
                            op, interface.name, spec.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl From<&InterfaceSpec> for Interface {
    fn from(spec: &InterfaceSpec) -> Self {
        Interface::new(spec.name.clone(), spec.operations.iter().cloned())
    }
}

/// Register every configured category that does not exist yet.
///
/// Existing categories follow [`Registry::register_category`] semantics:
/// only their interfaces may be upgraded, every other parameter applies
/// at first creation. Returns the number of newly created categories.
pub fn apply(registry: &Registry, config: &RegistryConfig) -> Result<usize> {
    config.validate()?;

    let mut created = 0;
    for spec in &config.categories {
        let interfaces = spec.interfaces.iter().map(Interface::from).collect();
        if registry.category(&spec.name).is_none() {
            created += 1;
        }
        registry.register_category(&spec.name, None, interfaces, spec.single_instance);
    }

    info!(categories = created, "Applied registry configuration");
    Ok(created)
}

/// Select the configured default extension of each category.
///
/// Intended to run after the host has registered its extensions. Unknown
/// ids (and categories that never materialized) are logged and skipped —
/// a stale configured default is not fatal. Returns the number of
/// defaults selected.
pub fn select_defaults(registry: &Registry, config: &RegistryConfig) -> usize {
    let mut selected = 0;
    for spec in &config.categories {
        let Some(id) = spec.default.as_deref() else {
            continue;
        };
        if registry.set_default_by_id(&spec.name, &ExtensionId::new(id)) {
            selected += 1;
        } else {
            warn!(
                category = %spec.name,
                extension = %id,
                "Configured default not selected"
            );
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::testing::{init_tracing, EchoBackend, SilentBackend};
    use crate::extensions::types::ExtensionClass;

    fn two_category_config() -> RegistryConfig {
        RegistryConfig {
            categories: vec![
                CategorySpec {
                    name: "conversation".to_string(),
                    single_instance: true,
                    interfaces: vec![InterfaceSpec {
                        name: "conversation".to_string(),
                        operations: vec!["send".to_string(), "status".to_string()],
                    }],
                    default: None,
                },
                CategorySpec {
                    name: "status-icons".to_string(),
                    single_instance: false,
                    interfaces: Vec::new(),
                    default: None,
                },
            ],
        }
    }

    #[test]
    fn test_from_json_with_defaulted_fields() {
        let config = RegistryConfig::from_json(
            r#"{
                "categories": [
                    { "name": "conversation" },
                    {
                        "name": "status-icons",
                        "interfaces": [
                            { "name": "icons", "operations": ["render"] }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.categories.len(), 2);
        assert!(!config.categories[0].single_instance);
        assert!(config.categories[0].interfaces.is_empty());
        assert!(config.categories[0].default.is_none());
        assert_eq!(config.categories[1].interfaces[0].operations, ["render"]);
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let err = RegistryConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, RegistryError::Json(_)));
    }

    #[test]
    fn test_invalid_category_name_rejected() {
        let err = RegistryConfig::from_json(r#"{ "categories": [ { "name": "no spaces" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Config(_)));
        assert!(err.to_string().contains("no spaces"));
    }

    #[test]
    fn test_invalid_operation_name_rejected() {
        let config = RegistryConfig {
            categories: vec![CategorySpec {
                name: "conversation".to_string(),
                single_instance: false,
                interfaces: vec![InterfaceSpec {
                    name: "conversation".to_string(),
                    operations: vec!["send message".to_string()],
                }],
                default: None,
            }],
        };
        assert!(matches!(
            config.validate(),
            Err(RegistryError::Config(_))
        ));
    }

    #[test]
    fn test_apply_creates_configured_categories() {
        let registry = Registry::new();
        let created = apply(&registry, &two_category_config()).unwrap();

        assert_eq!(created, 2);
        let conversation = registry.category("conversation").unwrap();
        assert!(conversation.is_single_instance());

        // The configured interface constrains registration.
        assert!(registry
            .register_extension("conversation", ExtensionClass::of::<SilentBackend>())
            .is_err());
        assert!(registry
            .register_extension("conversation", ExtensionClass::of::<EchoBackend>())
            .is_ok());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let registry = Registry::new();
        apply(&registry, &two_category_config()).unwrap();
        let created = apply(&registry, &two_category_config()).unwrap();
        assert_eq!(created, 0);
        assert_eq!(registry.categories().len(), 2);
    }

    #[test]
    fn test_select_defaults_skips_unknown_ids() {
        init_tracing();
        let registry = Registry::new();
        let mut config = two_category_config();
        config.categories[0].default =
            Some(ExtensionId::of::<EchoBackend>().to_string());
        config.categories[1].default = Some("nowhere:Nothing".to_string());

        apply(&registry, &config).unwrap();
        registry
            .register_extension("conversation", ExtensionClass::of::<EchoBackend>())
            .unwrap();

        let selected = select_defaults(&registry, &config);
        assert_eq!(selected, 1);
        assert_eq!(
            registry.get_default("conversation").unwrap().unwrap().id(),
            &ExtensionId::of::<EchoBackend>()
        );
        assert!(registry.get_default("status-icons").is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = two_category_config();
        let encoded = serde_json::to_string(&config).unwrap();
        let decoded = RegistryConfig::from_json(&encoded).unwrap();
        assert_eq!(decoded.categories.len(), config.categories.len());
        assert_eq!(decoded.categories[0].name, "conversation");
        assert!(decoded.categories[0].single_instance);
    }
}
