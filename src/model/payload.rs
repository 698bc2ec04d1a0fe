//! Base64-on-the-wire, raw-bytes-in-memory payload newtype.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Raw document bytes. Serializes as a base64 string; holds plain bytes once
/// deserialized, so callers never juggle base64 themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Base64Payload(pub Vec<u8>);

impl Base64Payload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Base64Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Base64Payload(bytes)
    }
}

impl Serialize for Base64Payload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Base64Payload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(s.as_bytes()).map_err(D::Error::custom)?;
        Ok(Base64Payload(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let payload = Base64Payload(b"hello world".to_vec());
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, "\"aGVsbG8gd29ybGQ=\"");
        let back: Base64Payload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn rejects_invalid_base64() {
        let result: Result<Base64Payload, _> = serde_json::from_str("\"not base64!!\"");
        assert!(result.is_err());
    }
}
