use core::fmt::Debug;
use std::fmt::Display;

use crate::{HpoError, HpoResult};

const ID_DIGITS: usize = 7;

/// The identifier of an [`HpoTerm`](crate::HpoTerm)
///
/// The ID is stored as the integer part of `HP:nnnnnnn` and
/// is always displayed zero-padded to 7 digits. Parsing rejects
/// IDs with more than 7 digits, so the numeric and the displayed
/// order are the same.
///
/// # Examples
///
/// ```
/// use xmi2hpo::HpoTermId;
///
/// let id = HpoTermId::try_from("HP:0000118").unwrap();
/// assert_eq!(id.as_u32(), 118);
/// assert_eq!(id.to_string(), "HP:0000118");
/// ```
#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HpoTermId {
    inner: u32,
}

impl HpoTermId {
    /// Returns the integer representation of the ID
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl TryFrom<&str> for HpoTermId {
    type Error = HpoError;
    fn try_from(s: &str) -> HpoResult<Self> {
        let Some(digits) = s.trim().strip_prefix("HP:") else {
            return Err(HpoError::InvalidInput(format!("invalid HPO term id: {s}")));
        };
        if digits.is_empty()
            || digits.len() > ID_DIGITS
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(HpoError::InvalidInput(format!("invalid HPO term id: {s}")));
        }
        Ok(HpoTermId {
            inner: digits.parse::<u32>()?,
        })
    }
}

impl From<u32> for HpoTermId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl Debug for HpoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HpoTermId({self})")
    }
}

impl Display for HpoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HP:{:07}", self.inner)
    }
}

impl PartialEq<str> for HpoTermId {
    fn eq(&self, other: &str) -> bool {
        HpoTermId::try_from(other).is_ok_and(|other| self == &other)
    }
}

impl PartialEq<&str> for HpoTermId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_and_display() {
        let id = HpoTermId::try_from("HP:0001250").unwrap();
        assert_eq!(id.as_u32(), 1250);
        assert_eq!(id.to_string(), "HP:0001250");
        assert_eq!(format!("{id:?}"), "HpoTermId(HP:0001250)");
    }

    #[test]
    fn invalid_ids() {
        assert!(HpoTermId::try_from("HP:000A250").is_err());
        assert!(HpoTermId::try_from("0001250").is_err());
        assert!(HpoTermId::try_from("HP:").is_err());
        assert!(HpoTermId::try_from("HP:-0001").is_err());
    }

    #[test]
    fn more_than_seven_digits() {
        assert!(HpoTermId::try_from("HP:12345678").is_err());
        assert!(HpoTermId::try_from("HP:00001250").is_err());
        assert_eq!(HpoTermId::try_from("HP:9999999").unwrap().as_u32(), 9_999_999);
    }

    #[test]
    fn compare_to_str() {
        let id = HpoTermId::from(118u32);
        assert_eq!(id, "HP:0000118");
        assert!(id != "HP:0000119");
        assert!(id != "Foobar");
    }

    #[test]
    fn ordering_matches_display() {
        let a = HpoTermId::from(99u32);
        let b = HpoTermId::from(1000u32);
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }
}
