use core::fmt::Debug;
use std::fmt::Display;

use crate::{HpoError, HpoResult};

/// Prefix of UMLS cross references in the HPO master data
pub const UMLS_PREFIX: &str = "UMLS:";

/// A UMLS Concept Unique Identifier, e.g. `C0036572`
///
/// The identifier is treated as an opaque token. It is matched
/// exactly, without any validation of its inner structure.
///
/// The HPO references concepts as `UMLS:C0036572`, cTAKES only
/// writes the bare `C0036572`. Both forms parse to the same `Cui`.
///
/// # Examples
///
/// ```
/// use xmi2hpo::Cui;
///
/// let from_obo = Cui::try_from("UMLS:C0036572").unwrap();
/// let from_xmi = Cui::try_from("C0036572").unwrap();
/// assert_eq!(from_obo, from_xmi);
/// assert_eq!(from_obo.as_str(), "C0036572");
/// assert_eq!(from_obo.to_string(), "UMLS:C0036572");
/// ```
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Cui {
    inner: String,
}

impl Cui {
    /// Returns the bare identifier without the `UMLS:` prefix
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl TryFrom<&str> for Cui {
    type Error = HpoError;
    fn try_from(s: &str) -> HpoResult<Self> {
        let s = s.trim();
        let token = s.strip_prefix(UMLS_PREFIX).unwrap_or(s);
        if token.is_empty() || token.contains(char::is_whitespace) {
            return Err(HpoError::InvalidInput(format!("invalid UMLS CUI: {s}")));
        }
        Ok(Self {
            inner: token.to_string(),
        })
    }
}

impl Debug for Cui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cui({})", self.inner)
    }
}

impl Display for Cui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{UMLS_PREFIX}{}", self.inner)
    }
}
