use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Datastore identity of a persistent object.
///
/// An `Oid` is 64 bits wide: the upper 32 bits name the object's class in
/// the store and the lower 32 bits are the object's number within that
/// class. The protocol layer never interprets it; it only shows up in
/// OPTIMISTIC replies to say which object failed verification.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Oid(u64);

impl Oid {
    /// Encoded width on the wire.
    pub const WIDTH: usize = 8;

    /// Build from a class id and an object number.
    pub const fn new(class_id: u32, uid: u32) -> Self {
        Self(((class_id as u64) << 32) | uid as u64)
    }

    /// Create from the raw 64-bit value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The null OID. Represents "no object".
    pub const fn null() -> Self {
        Self(0)
    }

    /// Returns `true` if this is the null OID.
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn class_id(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn uid(&self) -> u32 {
        self.0 as u32
    }

    /// Big-endian wire bytes.
    pub fn to_bytes(&self) -> [u8; Self::WIDTH] {
        self.0.to_be_bytes()
    }

    pub fn from_bytes(bytes: [u8; Self::WIDTH]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    /// Hex-encoded string (16 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let arr: [u8; Self::WIDTH] = bytes.as_slice().try_into().map_err(|_| {
            TypeError::InvalidLength {
                expected: Self::WIDTH,
                actual: bytes.len(),
            }
        })?;
        Ok(Self::from_bytes(arr))
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({}:{})", self.class_id(), self.uid())
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OID:{}-{}", self.class_id(), self.uid())
    }
}

impl From<u64> for Oid {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<Oid> for u64 {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}
