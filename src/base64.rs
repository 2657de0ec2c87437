//! Base64 helpers for envelope fields (standard alphabet, padded).

use base64ct::{Base64, Encoding};

/// Base64 encode bytes (standard alphabet, with padding).
pub fn b64_encode(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Base64 decode a string to bytes.
pub fn b64_decode(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64::decode_vec(s)
}

/// Serde adapter: `Vec<u8>` as a base64 string.
pub mod serde_b64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::b64_encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::b64_decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter: `Option<Vec<u8>>` as an optional base64 string.
pub mod serde_b64_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        data: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match data {
            Some(bytes) => serializer.serialize_some(&super::b64_encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s {
            Some(s) => super::b64_decode(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
