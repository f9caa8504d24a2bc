//! Dense handles for registered variables and constraints.

use serde::{Deserialize, Serialize};

macro_rules! define_handle_type {
    ($name:ident, $label:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create a handle from its raw value.
            pub fn new(value: u32) -> Self {
                Self(value)
            }

            /// Get the raw value.
            pub fn inner(self) -> u32 {
                self.0
            }

            /// Position of the handle in registration order.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}", $label, self.0)
            }
        }
    };
}

define_handle_type!(VarId, "x");
define_handle_type!(ConstrId, "c");
