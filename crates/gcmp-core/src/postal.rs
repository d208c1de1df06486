use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::EngineError;

static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][0-9][A-Z][0-9][A-Z][0-9]$").expect("valid regex"));

/// A validated Canadian postal code, stored in canonical `A1A 1A1` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Parses shopper input. Spaces are ignored and letters are upper-cased,
    /// so `"m5v3a8"` and `"M5V 3A8"` are the same code.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if the input does not match the
    /// `A1A1A1` pattern.
    pub fn parse(input: &str) -> Result<Self, EngineError> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if !POSTAL_CODE_RE.is_match(&compact) {
            return Err(EngineError::InvalidInput(format!(
                "'{}' is not a valid postal code",
                input.trim()
            )));
        }

        Ok(Self(format!("{} {}", &compact[..3], &compact[3..])))
    }

    /// Canonical `A1A 1A1` form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The forward sortation area (first three characters), e.g. `"M5V"`.
    #[must_use]
    pub fn fsa(&self) -> &str {
        &self.0[..3]
    }

    /// The code without the separating space, as used in request paths.
    #[must_use]
    pub fn compact(&self) -> String {
        self.0.replace(' ', "")
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(value: PostalCode) -> Self {
        value.0
    }
}
