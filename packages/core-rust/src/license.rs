//! License categories and the eligibility order between drivers and trucks.
//!
//! Categories are totally ordered `A < B < C < D < E`. A driver may operate a
//! truck when the driver's category ranks at least as high as the truck's
//! minimum category.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error returned when a string is not one of the recognized category symbols.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid license category '{0}', expected one of A, B, C, D, E")]
pub struct InvalidCategory(pub String);

/// Driver license category, ranked 1 (A) through 5 (E).
///
/// The derived `Ord` follows declaration order, which matches the rank.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum LicenseCategory {
    A,
    B,
    C,
    D,
    E,
}

impl LicenseCategory {
    /// All categories in ascending rank order.
    pub const ALL: [LicenseCategory; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    /// Numeric rank of the category: A=1 through E=5.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::A => 1,
            Self::B => 2,
            Self::C => 3,
            Self::D => 4,
            Self::E => 5,
        }
    }

    /// Single-letter symbol used on the wire and in storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }

    /// Returns `true` if a holder of `self` may drive a vehicle requiring `required`.
    #[must_use]
    pub fn meets(self, required: LicenseCategory) -> bool {
        self.rank() >= required.rank()
    }
}

impl fmt::Display for LicenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseCategory {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "E" => Ok(Self::E),
            other => Err(InvalidCategory(other.to_string())),
        }
    }
}

/// Compares two category symbols.
///
/// # Errors
///
/// Returns [`InvalidCategory`] if either symbol is not one of `A`..`E`.
pub fn meets(driver: &str, required: &str) -> Result<bool, InvalidCategory> {
    let driver: LicenseCategory = driver.parse()?;
    let required: LicenseCategory = required.parse()?;
    Ok(driver.meets(required))
}
