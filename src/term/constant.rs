//! Identified atoms: [`Guid`] and the interned [`Constant`] handle.
//!
//! A constant's identity is its GUID. Instances handed out by the
//! [`ConstantRegistry`](crate::registry::ConstantRegistry) are shared `Arc`s,
//! so two interned constants with the same GUID are pointer-equal.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::InternError;

/// Globally unique identifier of a constant or indexed reified term.
///
/// Stored as a `u128`, displayed in the hyphenated 8-4-4-4-12 hex form the
/// knowledge base uses on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Guid(u128);

impl Guid {
    /// Create a GUID from its raw 128-bit value.
    pub const fn from_u128(raw: u128) -> Self {
        Guid(raw)
    }

    /// Get the underlying 128-bit value.
    pub const fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xffff_ffff_ffff
        )
    }
}

impl FromStr for Guid {
    type Err = InternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InternError::MalformedGuid { text: s.to_string() };
        let groups: Vec<&str> = s.split('-').collect();
        let widths = [8, 4, 4, 4, 12];
        if groups.len() != widths.len() {
            return Err(malformed());
        }
        let mut raw: u128 = 0;
        for (group, width) in groups.iter().zip(widths) {
            if group.len() != width || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(malformed());
            }
            let part = u64::from_str_radix(group, 16).map_err(|_| malformed())?;
            raw = (raw << (width * 4)) | u128::from(part);
        }
        Ok(Guid(raw))
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug)]
struct ConstantData {
    name: String,
    guid: Guid,
}

/// An identified atomic term.
///
/// Cloning is cheap (an `Arc` bump). Equality and hashing go by GUID;
/// use [`Constant::ptr_eq`] to check that two handles are the same interned
/// instance.
#[derive(Clone)]
pub struct Constant(Arc<ConstantData>);

impl Constant {
    /// Create an uninterned constant.
    ///
    /// Most callers want [`ConstantRegistry::intern`](crate::registry::ConstantRegistry::intern)
    /// instead, which returns the canonical instance.
    pub fn new(name: impl Into<String>, guid: Guid) -> Self {
        Constant(Arc::new(ConstantData {
            name: name.into(),
            guid,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn guid(&self) -> Guid {
        self.0.guid
    }

    /// Whether both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Constant) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.guid == other.0.guid
    }
}

impl Eq for Constant {}

impl Hash for Constant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.guid.hash(state);
    }
}

impl fmt::Debug for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#${} [{}]", self.0.name, self.0.guid)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}
