//! Type-safe identifier wrappers.
//!
//! Bodies and artifacts are keyed on chain by `uint256` values. The store
//! never uses that raw form: every identifier is normalized to a single
//! canonical spelling (64 lowercase hex digits, zero-padded, no prefix)
//! before it reaches an entity. Addresses are kept as lowercase
//! `0x`-prefixed hex so that equality is plain string equality.
//!
//! Conversion from the raw chain encoding lives in `starfall-chain`; the
//! constructors here only accept values that are already canonical.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of hex digits in a canonical body or artifact identifier.
pub const HEX_ID_LEN: usize = 64;

/// Number of hex digits in an address (without the `0x` prefix).
pub const ADDRESS_HEX_LEN: usize = 40;

/// Errors raised when a string is not a canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The value has the wrong number of hex digits.
    #[error("expected {expected} hex digits, got {actual} in {value:?}")]
    Length {
        /// Required digit count.
        expected: usize,
        /// Digit count found.
        actual: usize,
        /// The rejected value.
        value: String,
    },

    /// The value contains something other than lowercase hex digits.
    #[error("not lowercase hex: {0:?}")]
    NotHex(String),

    /// An address is missing its `0x` prefix.
    #[error("address must start with 0x: {0:?}")]
    MissingPrefix(String),
}

fn check_lower_hex(digits: &str, expected: usize, original: &str) -> Result<(), IdError> {
    if digits.len() != expected {
        return Err(IdError::Length {
            expected,
            actual: digits.len(),
            value: original.to_owned(),
        });
    }
    if !digits
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return Err(IdError::NotHex(original.to_owned()));
    }
    Ok(())
}

fn lower_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Generates a canonical 64-digit hex identifier newtype.
macro_rules! define_hex_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(try_from = "String", into = "String")]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(String);

        impl $name {
            /// Wrap an already-canonical identifier.
            ///
            /// # Errors
            ///
            /// Returns [`IdError`] unless `value` is exactly 64 lowercase
            /// hex digits.
            pub fn parse(value: &str) -> Result<Self, IdError> {
                check_lower_hex(value, HEX_ID_LEN, value)?;
                Ok(Self(value.to_owned()))
            }

            /// Encode a big-endian `uint256` as the canonical form.
            pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
                Self(lower_hex(&bytes))
            }

            /// The canonical string form.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The character at `offset` in the canonical form, if any.
            pub fn char_at(&self, offset: usize) -> Option<char> {
                self.0.as_bytes().get(offset).map(|b| char::from(*b))
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                check_lower_hex(&value, HEX_ID_LEN, &value)?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_hex_id! {
    /// Canonical identifier of a celestial body (its location hash).
    BodyId
}

define_hex_id! {
    /// Canonical identifier of an artifact.
    ArtifactId
}

/// Identifier of a voyage, assigned sequentially by the game contract.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct VoyageId(pub u64);

impl VoyageId {
    /// Return the inner counter value.
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for VoyageId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player or contract address: `0x` followed by 40 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "String", into = "String")]
#[ts(export, export_to = "bindings/")]
pub struct Address(String);

impl Address {
    /// The zero address, used as the "unowned" sentinel.
    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(ADDRESS_HEX_LEN)))
    }

    /// Encode raw address bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("0x{}", lower_hex(&bytes)))
    }

    /// Wrap an already-canonical address.
    ///
    /// # Errors
    ///
    /// Returns [`IdError`] unless `value` is `0x` plus 40 lowercase hex digits.
    pub fn parse(value: &str) -> Result<Self, IdError> {
        let digits = value
            .strip_prefix("0x")
            .ok_or_else(|| IdError::MissingPrefix(value.to_owned()))?;
        check_lower_hex(digits, ADDRESS_HEX_LEN, value)?;
        Ok(Self(value.to_owned()))
    }

    /// Whether this is the zero ("unowned") address.
    pub fn is_zero(&self) -> bool {
        self.0.bytes().skip(2).all(|b| b == b'0')
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0000000000000000000000000000000000000000000000000000000000000abc";

    #[test]
    fn body_id_accepts_canonical_form() {
        let id = BodyId::parse(SAMPLE);
        assert!(id.is_ok());
        assert_eq!(id.ok().map(|i| i.to_string()), Some(SAMPLE.to_owned()));
    }

    #[test]
    fn body_id_rejects_short_and_uppercase() {
        assert!(matches!(BodyId::parse("abc"), Err(IdError::Length { .. })));
        let upper = SAMPLE.replace("abc", "ABC");
        assert!(matches!(BodyId::parse(&upper), Err(IdError::NotHex(_))));
    }

    #[test]
    fn char_at_reads_offsets() {
        let id = BodyId::parse(SAMPLE).ok();
        assert_eq!(id.as_ref().and_then(|i| i.char_at(0)), Some('0'));
        assert_eq!(id.as_ref().and_then(|i| i.char_at(63)), Some('c'));
        assert_eq!(id.as_ref().and_then(|i| i.char_at(64)), None);
    }

    #[test]
    fn from_be_bytes_zero_pads() {
        let mut bytes = [0_u8; 32];
        bytes[31] = 0xab;
        bytes[0] = 0x01;
        let id = BodyId::from_be_bytes(bytes);
        assert_eq!(id.as_str().len(), HEX_ID_LEN);
        assert!(id.as_str().starts_with("01"));
        assert!(id.as_str().ends_with("00ab"));
    }

    #[test]
    fn zero_address_is_zero() {
        assert_eq!(Address::from_bytes([0; 20]), Address::zero());
        assert!(Address::zero().is_zero());
        let other = Address::parse("0x00000000000000000000000000000000000000a1");
        assert!(other.is_ok_and(|a| !a.is_zero()));
    }

    #[test]
    fn address_requires_prefix() {
        let bare = "0".repeat(ADDRESS_HEX_LEN);
        assert!(matches!(Address::parse(&bare), Err(IdError::MissingPrefix(_))));
    }

    #[test]
    fn ids_roundtrip_through_json_as_strings() {
        let id = ArtifactId::parse(SAMPLE).ok();
        let json = id.as_ref().and_then(|i| serde_json::to_string(i).ok());
        assert_eq!(json.as_deref(), Some(format!("\"{SAMPLE}\"").as_str()));
        let bad: Result<ArtifactId, _> = serde_json::from_str("\"xyz\"");
        assert!(bad.is_err());
    }
}
