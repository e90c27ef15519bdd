//! extreg - In-process extension registry
//!
//! Pluggable implementations of a named capability are registered under
//! "categories", validated against optional interface contracts, and
//! retrieved as class references, full listings, or lazily instantiated
//! shared instances. Hosts swap implementations of a feature without
//! hard-coding a concrete type.

pub mod error;
pub mod extensions;

pub use error::{RegistryError, Result};
pub use extensions::{
    conforms, Broadcast, Category, CategorySpec, Construct, Extension, ExtensionClass,
    ExtensionId, Interface, InterfaceSpec, Registry, RegistryConfig, SharedExtension,
};
