//! JSON Parsing Utilities
//!
//! Safe JSON parsing with proper error handling. Horizon encodes 64-bit
//! values (sequence numbers, fee stats) as strings, so numeric getters
//! accept both forms.

use crate::error::{WalletError, WalletResult};
use serde::de::DeserializeOwned;

/// Safely parse JSON string into a type
pub fn parse_json<T: DeserializeOwned>(json_str: &str) -> WalletResult<T> {
    serde_json::from_str(json_str)
        .map_err(|e| WalletError::parse_error(format!("JSON parse error: {}", e)))
}

/// Safely parse JSON value from response body
pub fn parse_json_value(json_str: &str) -> WalletResult<serde_json::Value> {
    parse_json(json_str)
}

/// Safely extract a string field from JSON object
pub fn get_json_string(value: &serde_json::Value, field: &str) -> Option<String> {
    value.get(field).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Extract an i64 field given as a number or a decimal string
pub fn get_json_i64(value: &serde_json::Value, field: &str) -> Option<i64> {
    value.get(field).and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
    })
}

/// Extract a u64 field given as a number or a decimal string
pub fn get_json_u64(value: &serde_json::Value, field: &str) -> Option<u64> {
    value.get(field).and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
    })
}

/// Serde helpers for 64-bit integers carried as JSON strings
pub mod string_or_number {
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s.trim().parse().map_err(de::Error::custom),
        }
    }

    /// Written back as a string, the way Horizon sends it
    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_json_numbers() {
        let json: serde_json::Value = serde_json::json!({
            "number": 42,
            "string": "103420918407103888",
            "bad": "abc"
        });

        assert_eq!(get_json_u64(&json, "number"), Some(42));
        assert_eq!(get_json_i64(&json, "string"), Some(103420918407103888));
        assert_eq!(get_json_i64(&json, "bad"), None);
        assert_eq!(get_json_u64(&json, "missing"), None);
    }

    #[test]
    fn test_string_or_number() {
        #[derive(serde::Deserialize)]
        struct Record {
            #[serde(with = "string_or_number")]
            sequence: i64,
        }

        let a: Record = parse_json(r#"{"sequence":"12"}"#).unwrap();
        let b: Record = parse_json(r#"{"sequence":12}"#).unwrap();
        assert_eq!(a.sequence, b.sequence);
        assert!(parse_json::<Record>(r#"{"sequence":"x"}"#).is_err());
    }
}
