//! Extension system for extreg
//!
//! This module implements the registry/category model: named extension
//! points ("categories") whose pluggable implementations ("extensions")
//! are registered, validated against required capability surfaces
//! ("interfaces"), and retrieved — as class references, as a mapping of
//! all registrants, or as a lazily instantiated shared instance.
//!
//! # Architecture
//!
//! - **types**: Core traits and descriptors (`Extension`, `Construct`,
//!   `ExtensionClass`, `ExtensionId`)
//! - **interface**: Structural capability surfaces and conformance
//!   checking
//! - **category**: One extension point — registration, interface
//!   upgrades, default selection, single-instance caching
//! - **registry**: The process-wide category table with null-tolerant
//!   delegations
//! - **broadcast**: Fan-out views that drive an operation across every
//!   entry and drop per-entry failures
//! - **config**: Declarative category wiring from host-supplied JSON
//!
//! # Usage
//!
//! ```rust,no_run
//! use extreg::{Registry, RegistryConfig};
//!
//! let registry = Registry::new();
//! let config = RegistryConfig::from_json(
//!     r#"{ "categories": [ { "name": "conversation", "single_instance": true } ] }"#,
//! ).unwrap();
//! extreg::extensions::config::apply(&registry, &config).unwrap();
//!
//! // ... register extension classes, select defaults, instantiate ...
//! ```

pub mod broadcast;
pub mod category;
pub mod config;
pub mod interface;
pub mod registry;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use broadcast::Broadcast;
pub use category::Category;
pub use config::{CategorySpec, InterfaceSpec, RegistryConfig};
pub use interface::{conforms, Interface};
pub use registry::Registry;
pub use types::{Construct, Extension, ExtensionClass, ExtensionId, SharedExtension};
