//! Core extension types
//!
//! This module defines the traits implemented by extensions and the
//! descriptor types the registry stores: `Extension` (the instance
//! surface), `Construct` (a constructible extension type), and
//! `ExtensionClass` (a registrable reference to such a type together with
//! its derived identifier).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{RegistryError, Result};

/// A shared handle to an instantiated extension.
pub type SharedExtension = Arc<dyn Extension>;

type Ctor = Arc<dyn Fn(&Value) -> anyhow::Result<SharedExtension> + Send + Sync>;

/// The operation surface of an instantiated extension.
///
/// Operations are dispatched by name so heterogeneous implementations of a
/// category can be driven uniformly, including through the broadcast view.
/// The surface is deliberately closed: named operations via [`invoke`],
/// optional keyed item access, and a downcast hook for hosts that need the
/// concrete type.
///
/// [`invoke`]: Extension::invoke
pub trait Extension: Send + Sync {
    /// Dispatch a named operation with JSON arguments.
    ///
    /// Unknown operation names are reported with
    /// [`RegistryError::UnsupportedOp`] (wrapped in the returned error);
    /// absence of an operation is a failure signal, not a panic.
    fn invoke(&self, op: &str, args: &Value) -> anyhow::Result<Value>;

    /// Read a keyed item. Extensions without item semantics keep the
    /// default, which reports the key as unsupported.
    fn get_item(&self, key: &str) -> anyhow::Result<Value> {
        Err(RegistryError::UnsupportedOp(format!("[{key}]")).into())
    }

    /// Write a keyed item. Same default policy as [`Extension::get_item`].
    fn set_item(&self, key: &str, _value: Value) -> anyhow::Result<()> {
        Err(RegistryError::UnsupportedOp(format!("[{key}]")).into())
    }

    /// Downcast hook for hosts that know the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// A constructible extension type.
///
/// Implementations declare the operation names their instances expose
/// (checked against category interfaces at registration time) and how to
/// build an instance from JSON constructor arguments.
pub trait Construct: Extension + Sized + 'static {
    /// Operation names instances of this type expose through
    /// [`Extension::invoke`].
    fn provides() -> &'static [&'static str];

    /// Build a new instance from constructor arguments.
    fn build(args: &Value) -> anyhow::Result<Self>;
}

/// A stable, process-unique extension identifier.
///
/// Derived from the implementation type's defining module path plus its
/// type name, formatted `<module-path>:<TypeName>`. Two distinct types
/// never collide, and the same type always yields the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionId(String);

impl ExtensionId {
    /// Derive the identifier for an extension type.
    pub fn of<T: 'static>() -> Self {
        let full = std::any::type_name::<T>();
        match full.rfind("::") {
            Some(pos) => Self(format!("{}:{}", &full[..pos], &full[pos + 2..])),
            None => Self(full.to_string()),
        }
    }

    /// Wrap a raw identifier string, e.g. one taken from host configuration.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registrable reference to an extension type.
///
/// This is what categories store: the derived identifier, the short type
/// name, the declared operation names, and a type-erased constructor.
/// Cloning is cheap; the constructor is shared.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use serde_json::Value;
/// use extreg::{Construct, Extension, ExtensionClass};
///
/// struct Beep;
///
/// impl Extension for Beep {
///     fn invoke(&self, op: &str, _args: &Value) -> anyhow::Result<Value> {
///         match op {
///             "ring" => Ok(Value::String("beep".into())),
///             other => Err(extreg::RegistryError::UnsupportedOp(other.to_string()).into()),
///         }
///     }
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// impl Construct for Beep {
///     fn provides() -> &'static [&'static str] {
///         &["ring"]
///     }
///     fn build(_args: &Value) -> anyhow::Result<Self> {
///         Ok(Beep)
///     }
/// }
///
/// let class = ExtensionClass::of::<Beep>();
/// assert_eq!(class.name(), "Beep");
/// assert!(class.id().as_str().ends_with(":Beep"));
/// ```
#[derive(Clone)]
pub struct ExtensionClass {
    id: ExtensionId,
    name: &'static str,
    provides: &'static [&'static str],
    ctor: Ctor,
}

impl ExtensionClass {
    /// Describe a constructible extension type.
    pub fn of<T: Construct>() -> Self {
        Self {
            id: ExtensionId::of::<T>(),
            name: short_type_name::<T>(),
            provides: T::provides(),
            ctor: Arc::new(construct_erased::<T>),
        }
    }

    /// The derived identifier of this extension type.
    pub fn id(&self) -> &ExtensionId {
        &self.id
    }

    /// The short type name, without the module path.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Operation names declared by the extension type.
    pub fn provides(&self) -> &'static [&'static str] {
        self.provides
    }

    /// Construct a new instance with the given arguments.
    ///
    /// Constructor failures are wrapped in
    /// [`RegistryError::Construction`] and surfaced to the caller
    /// unchanged; the registry never catches them.
    pub fn construct(&self, args: &Value) -> Result<SharedExtension> {
        (self.ctor)(args).map_err(RegistryError::Construction)
    }
}

impl fmt::Debug for ExtensionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionClass")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("provides", &self.provides)
            .finish()
    }
}

impl PartialEq for ExtensionClass {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ExtensionClass {}

fn construct_erased<T: Construct>(args: &Value) -> anyhow::Result<SharedExtension> {
    let instance: SharedExtension = Arc::new(T::build(args)?);
    Ok(instance)
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    match full.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
