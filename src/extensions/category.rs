//! Category: one named extension point
//!
//! A `Category` owns the registered implementations of one capability, the
//! interfaces they must conform to, the currently selected default, and —
//! for single-instance categories — a weakly held cached instance.
//!
//! All state lives behind a `std::sync::RwLock`, so a category can be
//! shared across threads behind an `Arc` and driven through `&self`
//! methods. The lock is never held while an extension constructor runs.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{RegistryError, Result};

use super::broadcast::Broadcast;
use super::interface::{conforms, Interface};
use super::types::{Extension, ExtensionClass, ExtensionId, SharedExtension};

/// One named extension point with its implementations, interfaces,
/// default selection, and optional single-instance cache.
pub struct Category {
    name: String,
    system_default: Option<ExtensionClass>,
    single_instance: bool,
    state: RwLock<CategoryState>,
}

struct CategoryState {
    interfaces: Vec<Interface>,
    classes: HashMap<ExtensionId, ExtensionClass>,
    default_id: Option<ExtensionId>,
    /// Weakly held so the cache never keeps an instance alive on its own.
    instance: Option<Weak<dyn Extension>>,
}

impl Category {
    /// Create a category with an empty implementation table.
    ///
    /// `system_default` is stored verbatim as a fallback reference of last
    /// resort; it is not registered and no default is selected.
    /// `single_instance` is fixed for the category's lifetime.
    pub fn new(
        name: impl Into<String>,
        system_default: Option<ExtensionClass>,
        interfaces: Vec<Interface>,
        single_instance: bool,
    ) -> Self {
        Self {
            name: name.into(),
            system_default,
            single_instance,
            state: RwLock::new(CategoryState {
                interfaces,
                classes: HashMap::new(),
                default_id: None,
                instance: None,
            }),
        }
    }

    /// The category's name, its key in the registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fallback implementation designated at creation time,
    /// independent of the selected default.
    pub fn system_default(&self) -> Option<ExtensionClass> {
        self.system_default.clone()
    }

    /// Whether this category caches one shared instance.
    pub fn is_single_instance(&self) -> bool {
        self.single_instance
    }

    /// Register an extension class.
    ///
    /// The class is validated against every required interface; the first
    /// failure aborts with [`RegistryError::Validation`] and leaves the
    /// category unchanged. Re-registering the same class overwrites its
    /// entry and is observably a no-op.
    pub fn register(&self, class: ExtensionClass) -> Result<()> {
        let mut state = self.write_state();
        Self::check_conformance(&self.name, &state.interfaces, &class)?;
        debug!(category = %self.name, extension = %class.id(), "Registered extension");
        state.classes.insert(class.id().clone(), class);
        Ok(())
    }

    /// One-time interface upgrade.
    ///
    /// If no interfaces are set yet, adopts the given ones and removes
    /// every already-registered class that fails conformance, returning
    /// true. If the category is already constrained, nothing changes and
    /// false is returned — a signal, not an error.
    pub fn set_interfaces(&self, interfaces: Vec<Interface>) -> bool {
        let mut state = self.write_state();
        if !state.interfaces.is_empty() {
            return false;
        }
        state.interfaces = interfaces;

        let removed: Vec<ExtensionId> = state
            .classes
            .iter()
            .filter(|(_, class)| {
                state
                    .interfaces
                    .iter()
                    .any(|interface| !conforms(class, interface))
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in &removed {
            state.classes.remove(id);
            warn!(
                category = %self.name,
                extension = %id,
                "Removed extension: does not implement newly required interface"
            );
        }
        true
    }

    /// A snapshot of the registered classes, id to class.
    pub fn extensions(&self) -> HashMap<ExtensionId, ExtensionClass> {
        self.read_state().classes.clone()
    }

    /// Select the default extension, registering it first if needed.
    ///
    /// Registration may fail with the same [`RegistryError::Validation`]
    /// as [`Category::register`]. Selecting a different default clears the
    /// cached instance; re-selecting the current one preserves it.
    pub fn set_default(&self, class: ExtensionClass) -> Result<()> {
        let mut state = self.write_state();
        let id = class.id().clone();
        if !state.classes.contains_key(&id) {
            Self::check_conformance(&self.name, &state.interfaces, &class)?;
            debug!(category = %self.name, extension = %id, "Registered extension");
            state.classes.insert(id.clone(), class);
        }
        Self::select_default(&mut state, id);
        Ok(())
    }

    /// Select the default by identifier.
    ///
    /// Unknown ids leave the category untouched, emit a diagnostic, and
    /// return false — this path never errors.
    pub fn set_default_by_id(&self, id: &ExtensionId) -> bool {
        let mut state = self.write_state();
        if !state.classes.contains_key(id) {
            warn!(category = %self.name, extension = %id, "Extension id not registered on this category");
            return false;
        }
        Self::select_default(&mut state, id.clone());
        true
    }

    /// The currently selected default extension class.
    ///
    /// Fails with [`RegistryError::NoDefault`] when no default was ever
    /// selected, or when the selected one was removed by a later
    /// interface upgrade.
    pub fn default(&self) -> Result<ExtensionClass> {
        let state = self.read_state();
        state
            .default_id
            .as_ref()
            .and_then(|id| state.classes.get(id))
            .cloned()
            .ok_or_else(|| RegistryError::NoDefault {
                category: self.name.clone(),
            })
    }

    /// The cached single instance, if one is alive.
    ///
    /// Always `None` for multi-instance categories. For single-instance
    /// categories the cache holds only a weak reference, so this returns
    /// `None` once every strong owner has dropped the instance — results
    /// may differ between two calls with no explicit invalidation in
    /// between.
    pub fn instance(&self) -> Option<SharedExtension> {
        if !self.single_instance {
            return None;
        }
        self.read_state().instance.as_ref().and_then(Weak::upgrade)
    }

    /// Return the cached instance or construct one from the default.
    ///
    /// A live cached instance wins and `args` are ignored — the first
    /// caller's arguments hold until the cache is invalidated. Otherwise
    /// the default class is instantiated; constructor failures propagate
    /// as [`RegistryError::Construction`] untouched. Only single-instance
    /// categories cache the result, and only weakly.
    ///
    /// Construction runs outside the category lock. The store step
    /// re-checks under the write lock: an instance cached by a concurrent
    /// caller wins, and if the default changed mid-construction the fresh
    /// instance is returned uncached so later calls proceed under the new
    /// default.
    pub fn get_and_instantiate(&self, args: &Value) -> Result<SharedExtension> {
        if let Some(existing) = self.instance() {
            return Ok(existing);
        }

        let (class, selected_id) = {
            let state = self.read_state();
            let class = state
                .default_id
                .as_ref()
                .and_then(|id| state.classes.get(id))
                .cloned()
                .ok_or_else(|| RegistryError::NoDefault {
                    category: self.name.clone(),
                })?;
            (class, state.default_id.clone())
        };

        let instance = class.construct(args)?;
        if !self.single_instance {
            return Ok(instance);
        }

        let mut state = self.write_state();
        if let Some(live) = state.instance.as_ref().and_then(Weak::upgrade) {
            return Ok(live);
        }
        if state.default_id == selected_id {
            state.instance = Some(Arc::downgrade(&instance));
            debug!(category = %self.name, "Cached single instance");
        }
        Ok(instance)
    }

    /// A broadcast view over this category.
    ///
    /// Single-instance categories fan out over the selected default only
    /// (an empty view when none is selected); multi-instance categories
    /// fan out over every registered class.
    pub fn broadcast(&self) -> Broadcast<ExtensionClass> {
        let state = self.read_state();
        if self.single_instance {
            let entry = state
                .default_id
                .as_ref()
                .and_then(|id| state.classes.get(id).map(|class| (id.to_string(), class.clone())));
            Broadcast::new(entry)
        } else {
            Broadcast::new(
                state
                    .classes
                    .iter()
                    .map(|(id, class)| (id.to_string(), class.clone())),
            )
        }
    }

    fn check_conformance(
        category: &str,
        interfaces: &[Interface],
        class: &ExtensionClass,
    ) -> Result<()> {
        for interface in interfaces {
            if !conforms(class, interface) {
                warn!(
                    category = %category,
                    extension = %class.id(),
                    interface = %interface.name(),
                    "Rejected extension"
                );
                return Err(RegistryError::Validation {
                    extension: class.id().to_string(),
                    interface: interface.name().to_string(),
                });
            }
        }
        Ok(())
    }

    fn select_default(state: &mut CategoryState, id: ExtensionId) {
        if state.default_id.as_ref() != Some(&id) {
            state.default_id = Some(id);
            state.instance = None;
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CategoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CategoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
