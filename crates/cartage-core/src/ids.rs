//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as keys of the ordered
//! registries and as sorted-collection elements without ceremony.  Equality is
//! the only operation the engine requires of a `LocationId`; the inner integer
//! is `pub` for the benefit of estimators that interpret locations as
//! positions (e.g. the linear corridor used by demos and tests).

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> Self {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// A cart in the fleet.
    pub struct CartId(u32);
}

typed_id! {
    /// A transfer or out-of-service job.
    pub struct JobId(u32);
}

typed_id! {
    /// An opaque place a cart can occupy.  The engine only ever compares
    /// locations for equality; meaning is supplied by the injected estimators.
    pub struct LocationId(u32);
}
