//! Incompatibility edge type.

use crate::ids::{DsId, IncompatibilityId};

/// A labelled incompatibility between two design solutions.
///
/// The endpoints are stored in ascending id order so that `(a, b)` and
/// `(b, a)` describe the same edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incompatibility {
    /// Edge identifier.
    pub id: IncompatibilityId,
    /// Human-readable label.
    pub name: String,
    a: DsId,
    b: DsId,
}

impl Incompatibility {
    /// Creates an edge, normalizing endpoint order.
    ///
    /// # Panics
    /// Panics if `a == b`.
    pub fn new(id: IncompatibilityId, name: impl Into<String>, a: DsId, b: DsId) -> Self {
        assert_ne!(a, b, "a design solution cannot be incompatible with itself");
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        Self {
            id,
            name: name.into(),
            a,
            b,
        }
    }

    /// Default label used when the caller does not name the edge.
    pub fn default_name(id: IncompatibilityId) -> String {
        format!("incompatibility-{:04}", id.get())
    }

    /// Both endpoints, lower id first.
    pub fn pair(&self) -> (DsId, DsId) {
        (self.a, self.b)
    }

    /// Whether `ds` is one of the endpoints.
    pub fn touches(&self, ds: DsId) -> bool {
        self.a == ds || self.b == ds
    }

    /// The endpoint opposite `ds`, if `ds` is an endpoint.
    pub fn other(&self, ds: DsId) -> Option<DsId> {
        if ds == self.a {
            Some(self.b)
        } else if ds == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}
