// SPDX-License-Identifier: Apache-2.0

/// Errors reported by document operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The arena has no room left for the requested allocation.
    NoMemory,
    /// The target value is not an array or object of the expected kind.
    NotACollection,
    /// A handle does not address a slot of this arena.
    InvalidSlot,
    /// Growing would exceed the largest supported arena.
    CapacityOverflow,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::NoMemory => write!(f, "Arena exhausted"),
            Error::NotACollection => write!(f, "Value is not a collection of the expected kind"),
            Error::InvalidSlot => write!(f, "Handle does not address a slot"),
            Error::CapacityOverflow => write!(f, "Arena capacity overflow"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Error::NoMemory.to_string(), "Arena exhausted");
        assert_eq!(
            Error::CapacityOverflow.to_string(),
            "Arena capacity overflow"
        );
    }
}
