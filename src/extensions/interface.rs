//! Interface contracts and conformance checking
//!
//! An [`Interface`] is a structural capability surface: a named set of
//! operation names every extension registered under a constrained category
//! must expose. Conformance is a name-only check against the operations an
//! extension type declares — no signatures, no semantics. Checking happens
//! at registration boundaries where the declared surface is known, so no
//! runtime reflection is involved.

use std::collections::BTreeSet;
use std::fmt;

use super::types::ExtensionClass;

/// A required capability surface.
///
/// Identity is structural: two interfaces are equal when they require the
/// same set of operation names, regardless of what they are called.
#[derive(Debug, Clone)]
pub struct Interface {
    name: String,
    required: BTreeSet<String>,
}

impl Interface {
    /// Create an interface requiring the given operation names.
    ///
    /// Duplicate names collapse; an empty operation list means "no
    /// requirement" and every extension trivially conforms.
    pub fn new<N, I, S>(name: N, operations: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            required: operations.into_iter().map(Into::into).collect(),
        }
    }

    /// The interface's display name, used in validation errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The required operation names, in sorted order.
    pub fn required_ops(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    /// Whether this interface requires nothing.
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }
}

impl PartialEq for Interface {
    fn eq(&self, other: &Self) -> bool {
        self.required == other.required
    }
}

impl Eq for Interface {}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Check whether an extension class conforms to an interface.
///
/// Returns true iff every operation the interface requires appears in the
/// class's declared operations. An empty interface always returns true.
/// No side effects, no errors — a missing operation is the failure signal
/// itself.
pub fn conforms(class: &ExtensionClass, interface: &Interface) -> bool {
    interface
        .required_ops()
        .all(|op| class.provides().iter().any(|provided| *provided == op))
}
