use std::fmt;

use serde::{Deserialize, Serialize};

/// Correlation key between a request and its reply.
///
/// A `RequestId` is unique within one message. It is written and read as a
/// 4-byte big-endian integer and never interpreted beyond equality and
/// ordering.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u32);

impl RequestId {
    /// Encoded width on the wire.
    pub const WIDTH: usize = 4;

    /// The first id handed out by a fresh message.
    pub const FIRST: RequestId = RequestId(1);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// The id following this one, or `None` once the space is exhausted.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Big-endian wire bytes.
    pub fn to_bytes(&self) -> [u8; Self::WIDTH] {
        self.0.to_be_bytes()
    }

    pub fn from_bytes(bytes: [u8; Self::WIDTH]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({})", self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req#{}", self.0)
    }
}

impl From<u32> for RequestId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_increments() {
        assert_eq!(RequestId::FIRST.next(), Some(RequestId::new(2)));
    }

    #[test]
    fn next_stops_at_max() {
        assert_eq!(RequestId::new(u32::MAX).next(), None);
    }

    #[test]
    fn bytes_roundtrip() {
        let id = RequestId::new(0xDEAD_BEEF);
        assert_eq!(id.to_bytes(), [0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(RequestId::from_bytes(id.to_bytes()), id);
    }

    #[test]
    fn display_format() {
        assert_eq!(RequestId::new(5).to_string(), "req#5");
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(RequestId::new(2) < RequestId::new(10));
    }
}
