//! Extension registry
//!
//! The `Registry` is the process-wide table mapping category names to
//! [`Category`] objects. It is an explicit object: hosts construct one at
//! composition time and hand out references — there is no implicit global.
//! Categories are created by explicit registration, live for the life of
//! the registry, and are never removed.
//!
//! Registry operations are thin delegations to the addressed category and
//! are tolerant of "category not found": an absent category yields
//! `None`/`false` rather than an error, so hosts can treat an
//! unconfigured category as a normal, checkable condition.
//!
//! # Example
//!
//! ```
//! use std::any::Any;
//! use serde_json::{json, Value};
//! use extreg::{Construct, Extension, ExtensionClass, Interface, Registry};
//!
//! struct MemoryStore;
//!
//! impl Extension for MemoryStore {
//!     fn invoke(&self, op: &str, _args: &Value) -> anyhow::Result<Value> {
//!         match op {
//!             "put" | "get" => Ok(Value::Null),
//!             other => Err(extreg::RegistryError::UnsupportedOp(other.to_string()).into()),
//!         }
//!     }
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! impl Construct for MemoryStore {
//!     fn provides() -> &'static [&'static str] {
//!         &["put", "get"]
//!     }
//!     fn build(_args: &Value) -> anyhow::Result<Self> {
//!         Ok(MemoryStore)
//!     }
//! }
//!
//! # fn main() -> extreg::Result<()> {
//! let registry = Registry::new();
//! registry.register_category(
//!     "storage",
//!     None,
//!     vec![Interface::new("store", ["put", "get"])],
//!     true,
//! );
//! registry.register_extension("storage", ExtensionClass::of::<MemoryStore>())?;
//! registry.set_default("storage", ExtensionClass::of::<MemoryStore>())?;
//!
//! let first = registry.get_and_instantiate("storage", &json!({}))?.unwrap();
//! let second = registry.get_and_instantiate("storage", &json!({}))?.unwrap();
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::info;

use crate::error::Result;

use super::broadcast::Broadcast;
use super::category::Category;
use super::interface::Interface;
use super::types::{ExtensionClass, ExtensionId, SharedExtension};

/// The process-wide category table.
#[derive(Default)]
pub struct Registry {
    categories: RwLock<HashMap<String, Arc<Category>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a category, or upgrade an existing one's interfaces.
    ///
    /// A new name creates and stores a category with the given
    /// parameters. An existing name delegates to
    /// [`Category::set_interfaces`] — the other parameters apply only at
    /// first creation and are ignored. Repeated identical calls are
    /// idempotent.
    pub fn register_category(
        &self,
        name: &str,
        system_default: Option<ExtensionClass>,
        interfaces: Vec<Interface>,
        single_instance: bool,
    ) -> Arc<Category> {
        let mut categories = self.write_categories();
        if let Some(existing) = categories.get(name) {
            existing.set_interfaces(interfaces);
            return Arc::clone(existing);
        }

        let category = Arc::new(Category::new(
            name,
            system_default,
            interfaces,
            single_instance,
        ));
        categories.insert(name.to_string(), Arc::clone(&category));
        info!(category = %name, single_instance, "Registered category");
        category
    }

    /// Register an extension under a category, creating the category if
    /// it does not exist yet.
    ///
    /// The implicit-creation path treats the extension as the de-facto
    /// system default of the new category and registers it, but selects
    /// no default — hosts that register extensions before categories keep
    /// working, and `get_default` stays unresolved until a default is
    /// chosen explicitly. An existing category delegates to
    /// [`Category::register`], so validation errors propagate.
    pub fn register_extension(&self, name: &str, class: ExtensionClass) -> Result<()> {
        if let Some(category) = self.category(name) {
            return category.register(class);
        }
        let category =
            self.register_category(name, Some(class.clone()), Vec::new(), false);
        category.register(class)
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<Arc<Category>> {
        self.read_categories().get(name).cloned()
    }

    /// A snapshot of all categories, name to category.
    pub fn categories(&self) -> HashMap<String, Arc<Category>> {
        self.read_categories().clone()
    }

    /// The registered extensions of a category, or `None` if the
    /// category does not exist.
    pub fn extensions(&self, name: &str) -> Option<HashMap<ExtensionId, ExtensionClass>> {
        self.category(name).map(|category| category.extensions())
    }

    /// The selected default of a category.
    ///
    /// `Ok(None)` when the category does not exist; a category with no
    /// selected default surfaces [`RegistryError::NoDefault`] unchanged.
    ///
    /// [`RegistryError::NoDefault`]: crate::RegistryError::NoDefault
    pub fn get_default(&self, name: &str) -> Result<Option<ExtensionClass>> {
        match self.category(name) {
            Some(category) => category.default().map(Some),
            None => Ok(None),
        }
    }

    /// The live cached instance of a single-instance category, or `None`.
    pub fn get_instance(&self, name: &str) -> Option<SharedExtension> {
        self.category(name).and_then(|category| category.instance())
    }

    /// Cached-or-fresh instantiation of a category's default.
    ///
    /// `Ok(None)` when the category does not exist; otherwise delegates
    /// to [`Category::get_and_instantiate`] and surfaces its result or
    /// error unchanged.
    pub fn get_and_instantiate(
        &self,
        name: &str,
        args: &Value,
    ) -> Result<Option<SharedExtension>> {
        match self.category(name) {
            Some(category) => category.get_and_instantiate(args).map(Some),
            None => Ok(None),
        }
    }

    /// Select a category's default, registering the class if needed.
    ///
    /// Returns `Ok(false)` when the category does not exist; validation
    /// errors from the registration path propagate.
    pub fn set_default(&self, name: &str, class: ExtensionClass) -> Result<bool> {
        match self.category(name) {
            Some(category) => category.set_default(class).map(|_| true),
            None => Ok(false),
        }
    }

    /// Select a category's default by extension id.
    ///
    /// False when the category does not exist or the id is unknown to it;
    /// never errors.
    pub fn set_default_by_id(&self, name: &str, id: &ExtensionId) -> bool {
        match self.category(name) {
            Some(category) => category.set_default_by_id(id),
            None => false,
        }
    }

    /// The fallback implementation designated when the category was
    /// created, or `None` if the category does not exist or has none.
    ///
    /// Hosts typically fall back to this when instantiating the selected
    /// default fails.
    pub fn get_system_default(&self, name: &str) -> Option<ExtensionClass> {
        self.category(name)
            .and_then(|category| category.system_default())
    }

    /// A broadcast view over a category, or `None` if it does not exist.
    pub fn broadcast(&self, name: &str) -> Option<Broadcast<ExtensionClass>> {
        self.category(name).map(|category| category.broadcast())
    }

    fn read_categories(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Category>>> {
        self.categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_categories(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<Category>>> {
        self.categories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
