//! Identifier newtypes.
//!
//! Every entity in a matrix is addressed by a small copyable id rather than
//! by reference, so relations (incompatibilities, solution bindings) can be
//! stored on both sides without aliasing.

use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw numeric value.
            pub fn get(self) -> u64 {
                self.0
            }

            /// The id after this one, or `None` at `u64::MAX`.
            pub fn checked_next(self) -> Option<Self> {
                self.0.checked_add(1).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

id_type!(
    /// Identifies a functional requirement (a matrix row).
    FrId,
    "fr-"
);
id_type!(
    /// Identifies a design solution (a cell within a row).
    DsId,
    "ds-"
);
id_type!(
    /// Identifies a labelled incompatibility edge.
    IncompatibilityId,
    "inc-"
);
id_type!(
    /// Identifies a stored solution.
    SolutionId,
    "sol-"
);
