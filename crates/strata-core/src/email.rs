//! Email value object.

use crate::StrataError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A normalized email address: trimmed and lower-cased.
///
/// Uniqueness among active users compares these normalized values, so two
/// spellings that differ only in case or surrounding whitespace collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalizes and minimally checks an address.
    ///
    /// Full format validation happens on the request DTOs; this only
    /// rejects values that cannot be an address at all.
    pub fn parse(raw: &str) -> Result<Self, StrataError> {
        let normalized = raw.trim().to_lowercase();
        match normalized.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(Self(normalized)),
            _ => Err(StrataError::validation(format!("Invalid email: {raw}"))),
        }
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = StrataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}
