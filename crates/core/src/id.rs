//! Strongly-typed identifiers used across the domain.
//!
//! Both identifiers are assigned by upstream systems (product admin, snapshot
//! ingestion), so they wrap opaque strings rather than generated UUIDs.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Part number (SKU) of a product. Unique key of the product table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(String);

/// Identifier of one inventory snapshot row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap an identifier without validation.
            ///
            /// Prefer `parse`/`FromStr` for values coming from user input.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: must not be blank", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

impl_string_newtype!(PartId, "PartId");
impl_string_newtype!(SnapshotId, "SnapshotId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_rejects_blank() {
        let part: PartId = "  LAV-250 ".parse().unwrap();
        assert_eq!(part.as_str(), "LAV-250");

        let err = "   ".parse::<SnapshotId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) if msg.contains("SnapshotId") => {}
            other => panic!("Expected InvalidId error, got {other:?}"),
        }
    }

    #[test]
    fn serializes_transparently() {
        let part = PartId::new("P1");
        assert_eq!(serde_json::to_string(&part).unwrap(), "\"P1\"");

        let back: PartId = serde_json::from_str("\"P1\"").unwrap();
        assert_eq!(back, part);
    }
}
