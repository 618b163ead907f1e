//! Canonical JSON encoding.
//!
//! Union values carry their discriminant under `"type"`. Byte strings are
//! lowercase `0x`-hex, `u64` values decimal strings (`serde_with::DisplayFromStr`
//! at the field), `U256` values decimal strings via [`u256_dec`].

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::errors::CodecError;

/// Serialization helper that prepends `"type": kind` to a struct's fields.
#[derive(Serialize)]
pub struct Tagged<'a, T: Serialize> {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(flatten)]
    pub inner: &'a T,
}

/// Read the `"type"` field of a JSON object.
pub fn kind_of(value: &Value) -> Result<u8, String> {
    let raw = value
        .get("type")
        .ok_or_else(|| "missing field `type`".to_owned())?;
    raw.as_u64()
        .and_then(|k| u8::try_from(k).ok())
        .ok_or_else(|| format!("invalid type discriminant {raw}"))
}

pub fn to_string_pretty<T: Serialize>(value: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn to_string<T: Serialize>(value: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

/// Structural JSON parse; no re-encoding check (see `Api::json_decode`).
pub fn from_str<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    Ok(serde_json::from_str(text)?)
}

pub mod prefix_hex {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    #[must_use]
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        format!("0x{}", hex::encode(bytes))
    }

    fn digits(s: &str) -> Result<&str, String> {
        s.strip_prefix("0x")
            .ok_or_else(|| format!("hex string {s:?} lacks 0x prefix"))
    }

    pub trait FromPrefixHex: Sized {
        fn from_prefix_hex(s: &str) -> Result<Self, String>;
    }

    impl FromPrefixHex for Vec<u8> {
        fn from_prefix_hex(s: &str) -> Result<Self, String> {
            hex::decode(digits(s)?).map_err(|e| format!("{s:?}: {e}"))
        }
    }

    impl<const N: usize> FromPrefixHex for [u8; N] {
        fn from_prefix_hex(s: &str) -> Result<Self, String> {
            let mut out = [0u8; N];
            hex::decode_to_slice(digits(s)?, &mut out)
                .map_err(|e| format!("{s:?}: expected {N} bytes: {e}"))?;
            Ok(out)
        }
    }

    pub fn serialize<S: Serializer, T: AsRef<[u8]>>(value: &T, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, T: FromPrefixHex>(d: D) -> Result<T, D::Error> {
        let s = String::deserialize(d)?;
        T::from_prefix_hex(&s).map_err(D::Error::custom)
    }
}

pub mod u256_dec {
    use primitive_types::U256;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        let s = String::deserialize(d)?;
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(D::Error::custom(format!("{s:?} is not a decimal integer")));
        }
        U256::from_dec_str(&s).map_err(|e| D::Error::custom(format!("{s:?} exceeds 256 bits: {e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "prefix_hex")]
        id: [u8; 4],
        #[serde(with = "prefix_hex")]
        data: Vec<u8>,
        #[serde(with = "u256_dec")]
        amount: U256,
    }

    #[test]
    fn bytes_and_big_ints_render_as_strings() {
        let s = Sample { id: [0xde, 0xad, 0xbe, 0xef], data: vec![], amount: U256::MAX };
        let text = to_string(&s).unwrap();
        assert_eq!(
            text,
            "{\"id\":\"0xdeadbeef\",\"data\":\"0x\",\"amount\":\"115792089237316195423570985008687907853269984665640564039457584007913129639935\"}"
        );
        assert_eq!(from_str::<Sample>(&text).unwrap(), s);
    }

    #[test]
    fn wrong_hex_length_is_schema_violation() {
        let text = r#"{"id":"0xdead","data":"0x","amount":"1"}"#;
        assert!(matches!(from_str::<Sample>(text), Err(CodecError::SchemaViolation { .. })));
    }

    #[test]
    fn u256_overflow_and_sign_are_rejected() {
        let over = r#"{"id":"0x00000000","data":"0x","amount":"115792089237316195423570985008687907853269984665640564039457584007913129639936"}"#;
        assert!(matches!(from_str::<Sample>(over), Err(CodecError::SchemaViolation { .. })));
        let neg = r#"{"id":"0x00000000","data":"0x","amount":"-1"}"#;
        assert!(matches!(from_str::<Sample>(neg), Err(CodecError::SchemaViolation { .. })));
    }

    #[test]
    fn syntax_errors_are_malformed() {
        assert!(matches!(from_str::<Sample>("{\"id\":"), Err(CodecError::MalformedEncoding { .. })));
    }

    #[test]
    fn tagged_flattens_fields() {
        #[derive(Serialize)]
        struct Inner {
            reference: u16,
        }
        let v = serde_json::to_value(Tagged { kind: 1, inner: &Inner { reference: 7 } }).unwrap();
        assert_eq!(v, serde_json::json!({"type": 1, "reference": 7}));
        assert_eq!(kind_of(&v), Ok(1));
        assert!(kind_of(&serde_json::json!({"type": 300})).is_err());
    }
}
