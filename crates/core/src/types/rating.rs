//! Review rating type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The value is outside the 1-5 star range.
    #[error("rating must be between {min} and {max} (got {value})")]
    OutOfRange {
        /// The rejected value.
        value: i64,
        /// Lowest accepted rating.
        min: u8,
        /// Highest accepted rating.
        max: u8,
    },
    /// The input is not a whole number.
    #[error("rating must be a whole number")]
    NotANumber,
}

/// A star rating attached to a product review.
///
/// ## Constraints
///
/// - Whole stars only
/// - Range 1-5 inclusive
///
/// ## Examples
///
/// ```
/// use cartwheel_core::Rating;
///
/// assert!(Rating::new(5).is_ok());
/// assert!(Rating::new(0).is_err());
/// assert!(Rating::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Create a rating, validating the 1-5 range.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] if `value` is not in 1-5.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(RatingError::OutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            }),
        }
    }

    /// The number of stars.
    #[must_use]
    pub const fn stars(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::str::FromStr for Rating {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<i64>().map_err(|_| RatingError::NotANumber)?;
        Self::new(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        for stars in 1..=5 {
            assert_eq!(Rating::new(stars).unwrap().stars(), u8::try_from(stars).unwrap());
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            Rating::new(0),
            Err(RatingError::OutOfRange { value: 0, .. })
        ));
        assert!(matches!(
            Rating::new(-3),
            Err(RatingError::OutOfRange { .. })
        ));
        assert!(matches!(
            Rating::new(300),
            Err(RatingError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("3".parse::<Rating>().unwrap().stars(), 3);
        assert_eq!("three".parse::<Rating>(), Err(RatingError::NotANumber));
    }

    #[test]
    fn test_display() {
        assert_eq!(Rating::new(4).unwrap().to_string(), "4/5");
    }
}
