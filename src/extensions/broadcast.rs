//! Broadcast fan-out view
//!
//! A [`Broadcast`] drives an operation across every entry of an id-keyed
//! mapping and collects the per-entry results. Per-entry failures are
//! caught, logged at debug, and dropped from the result view — partial
//! success is the expected case over heterogeneous targets, and callers
//! get no record of which entries failed.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use tracing::debug;

use super::types::{ExtensionClass, SharedExtension};

/// A fan-out view over id-keyed entries.
///
/// Obtained from [`Category::broadcast`]; each fan-out operation returns a
/// new view of the successful results, so calls chain the way the
/// underlying entries do.
///
/// [`Category::broadcast`]: super::category::Category::broadcast
pub struct Broadcast<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Broadcast<T> {
    /// Build a view over the given entries.
    pub fn new(entries: impl IntoIterator<Item = (String, T)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Apply a fallible operation per entry, dropping failures.
    ///
    /// This is the result-collection strategy every other fan-out
    /// operation is built on. Each failure is logged at debug and the
    /// entry is omitted from the returned view; errors are never
    /// re-raised.
    pub fn try_map<U, E, F>(&self, f: F) -> Broadcast<U>
    where
        E: fmt::Display,
        F: Fn(&str, &T) -> std::result::Result<U, E>,
    {
        let mut entries = BTreeMap::new();
        for (id, entry) in &self.entries {
            match f(id, entry) {
                Ok(result) => {
                    entries.insert(id.clone(), result);
                }
                Err(error) => {
                    debug!(extension = %id, %error, "Dropped fan-out entry");
                }
            }
        }
        Broadcast { entries }
    }

    /// Iterate the entry identifiers, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Look up a single entry by identifier.
    pub fn entry(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw id-to-result mapping.
    pub fn results(&self) -> &BTreeMap<String, T> {
        &self.entries
    }

    /// Consume the view and return the raw id-to-result mapping.
    pub fn into_results(self) -> BTreeMap<String, T> {
        self.entries
    }
}

impl<T: fmt::Debug> fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(&self.entries).finish()
    }
}

impl<'a, T> IntoIterator for &'a Broadcast<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = std::collections::btree_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Broadcast<ExtensionClass> {
    /// Construct every entry with the same arguments.
    ///
    /// Entries whose constructor fails are dropped from the result view.
    pub fn instantiate(&self, args: &Value) -> Broadcast<SharedExtension> {
        self.try_map(|_, class| class.construct(args))
    }
}

impl Broadcast<SharedExtension> {
    /// Invoke a named operation on every instance with the same arguments.
    pub fn invoke(&self, op: &str, args: &Value) -> Broadcast<Value> {
        self.try_map(|_, instance| instance.invoke(op, args))
    }

    /// Read a keyed item from every instance.
    pub fn get(&self, key: &str) -> Broadcast<Value> {
        self.try_map(|_, instance| instance.get_item(key))
    }

    /// Write a keyed item to every instance, dropping per-entry failures.
    pub fn set(&self, key: &str, value: &Value) {
        for (id, instance) in &self.entries {
            if let Err(error) = instance.set_item(key, value.clone()) {
                debug!(extension = %id, key = %key, %error, "Dropped fan-out item write");
            }
        }
    }
}
