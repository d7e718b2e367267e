//! Tenant fiscal identifier.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of digits in a CUIT.
pub const CUIT_DIGITS: usize = 11;

/// Tax identifier (CUIT) of the tenant a ticket is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cuit(u64);

impl Cuit {
    /// Wrap a raw CUIT number.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCuit`] when the number does not have exactly
    /// [`CUIT_DIGITS`] digits.
    pub fn new(value: u64) -> Result<Self, InvalidCuit> {
        if !(10_000_000_000..=99_999_999_999).contains(&value) {
            return Err(InvalidCuit(value.to_string()));
        }

        Ok(Self(value))
    }

    /// Raw CUIT number.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for Cuit {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for Cuit {
    type Err = InvalidCuit;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();

        if trimmed.len() != CUIT_DIGITS || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(InvalidCuit(value.to_string()));
        }

        let number = trimmed
            .parse::<u64>()
            .map_err(|_parse_error| InvalidCuit(value.to_string()))?;

        Self::new(number)
    }
}

impl From<Cuit> for u64 {
    fn from(value: Cuit) -> Self {
        value.as_u64()
    }
}

/// Raised when a value is not an 11-digit CUIT.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid CUIT: {0:?}")]
pub struct InvalidCuit(pub String);
