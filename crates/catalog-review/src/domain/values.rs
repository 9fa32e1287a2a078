//! Value objects for the review domain.
//!
//! Constructors validate their input. Replay runs stored event fields
//! through the same constructors, so historical data is held to the same
//! standard as live input.

use std::fmt;

use uuid::Uuid;

use catalog_core::error::DomainError;

/// Trust threshold used when the caller does not supply one.
pub const DEFAULT_TRUST_THRESHOLD: f64 = 0.6;

/// Unique identifier of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReviewId(Uuid);

impl ReviewId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an identifier recovered from storage.
    #[must_use]
    pub const fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ReviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of the reviewed book, an ISBN in digit form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookId(String);

impl BookId {
    /// Validates and wraps an ISBN digit string.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] unless `value` is exactly 10 or
    /// 13 ASCII digits.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let digits_only = !value.is_empty() && value.chars().all(|c| c.is_ascii_digit());
        if !digits_only || !(value.len() == 10 || value.len() == 13) {
            return Err(DomainError::Validation(format!(
                "book id must be 10 or 13 digits, got {value:?}"
            )));
        }
        Ok(Self(value))
    }

    /// Returns the digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name of the reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerName(String);

impl ReviewerName {
    /// Maximum name length in characters.
    pub const MAX_LENGTH: usize = 50;

    /// Validates and wraps a reviewer name.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if the name is empty or longer
    /// than [`Self::MAX_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let length = value.chars().count();
        if length == 0 || length > Self::MAX_LENGTH {
            return Err(DomainError::Validation(format!(
                "reviewer name must be 1 to {} characters, got {length}",
                Self::MAX_LENGTH
            )));
        }
        Ok(Self(value))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Star rating between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Validates and wraps a star rating.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if `value` is outside 1 to 5.
    pub fn new(value: u8) -> Result<Self, DomainError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(DomainError::Validation(format!(
                "rating must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(value))
    }

    /// Returns the raw star count.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Normalized quality on `[0.0, 1.0]`: one star maps to 0.0 and five
    /// stars to 1.0.
    #[must_use]
    pub fn quality_factor(&self) -> f64 {
        f64::from(self.0 - Self::MIN) / f64::from(Self::MAX - Self::MIN)
    }
}

/// Free-text comment attached to a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment(String);

impl Comment {
    /// Maximum comment length in characters.
    pub const MAX_LENGTH: usize = 1000;

    /// Validates and wraps a comment.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if the comment is empty or longer
    /// than [`Self::MAX_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let length = value.chars().count();
        if length == 0 || length > Self::MAX_LENGTH {
            return Err(DomainError::Validation(format!(
                "comment must be 1 to {} characters, got {length}",
                Self::MAX_LENGTH
            )));
        }
        Ok(Self(value))
    }

    /// Returns the comment text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quality on `[0.2, 1.0]` rising with the trimmed length: fewer than 10
    /// characters scores 0.2, 100 or more scores 1.0, linear in between.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn quality_factor(&self) -> f64 {
        let length = self.0.trim().chars().count();
        if length < 10 {
            0.2
        } else if length >= 100 {
            1.0
        } else {
            0.2 + 0.8 * ((length - 10) as f64 / 90.0)
        }
    }
}
