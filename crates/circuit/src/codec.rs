//! Hex wire encoding for curve points, scalars and field elements
//!
//! Values travel as hex strings of their compressed canonical encoding.
//! Decoding validates points (on curve, prime-order subgroup).

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::CircuitError;

pub fn to_hex<T: CanonicalSerialize>(value: &T) -> Result<String, CircuitError> {
    let mut bytes = Vec::with_capacity(value.compressed_size());
    value.serialize_compressed(&mut bytes)?;
    Ok(hex::encode(bytes))
}

pub fn from_hex<T: CanonicalDeserialize>(encoded: &str) -> Result<T, CircuitError> {
    let encoded = encoded.trim();
    let bytes = hex::decode(encoded.strip_prefix("0x").unwrap_or(encoded))?;
    Ok(T::deserialize_compressed(&bytes[..])?)
}

/// Implement serde as a hex string through `to_hex`/`from_hex`
macro_rules! hex_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let encoded = $crate::codec::to_hex(self).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&encoded)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let encoded = <String as serde::Deserialize>::deserialize(deserializer)?;
                $crate::codec::from_hex(&encoded).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use hex_serde;
