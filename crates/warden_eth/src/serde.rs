//! Serde helpers for JSON-RPC parameter and quantity shapes.

use serde::{
    de::{DeserializeOwned, IgnoredAny},
    ser::SerializeSeq,
    Deserialize, Deserializer, Serializer,
};

/// (De)serializes the `params` of a parameterless method as `()`.
///
/// Callers may omit `params` entirely or send an empty array; anything with
/// entries is rejected.
pub mod empty_params {
    use super::{Deserialize, Deserializer, IgnoredAny, SerializeSeq, Serializer};

    /// Deserializes an absent or empty params array into `()`.
    pub fn deserialize<'de, DeserializerT>(d: DeserializerT) -> Result<(), DeserializerT::Error>
    where
        DeserializerT: Deserializer<'de>,
    {
        let params: Option<Vec<IgnoredAny>> = Deserialize::deserialize(d)?;
        match params.as_ref().map_or(0, Vec::len) {
            0 => Ok(()),
            count => Err(serde::de::Error::invalid_length(
                count,
                &"an empty params array",
            )),
        }
    }

    /// Serializes `()` as an empty params array.
    pub fn serialize<SerializerT, T>(
        _params: &T,
        s: SerializerT,
    ) -> Result<SerializerT::Ok, SerializerT::Error>
    where
        SerializerT: Serializer,
    {
        s.serialize_seq(Some(0))?.end()
    }
}

/// (De)serializes a lone parameter from/to the one-element params array it
/// travels in.
pub mod sequence {
    use super::{Deserialize, DeserializeOwned, Deserializer, SerializeSeq, Serializer};

    /// Deserializes a params array carrying exactly one entry.
    pub fn deserialize<'de, T, DeserializerT>(d: DeserializerT) -> Result<T, DeserializerT::Error>
    where
        DeserializerT: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let mut params: Vec<T> = Deserialize::deserialize(d)?;
        match params.len() {
            1 => Ok(params.swap_remove(0)),
            count => Err(serde::de::Error::invalid_length(
                count,
                &"a params array with a single entry",
            )),
        }
    }

    /// Serializes a parameter as a one-element params array.
    pub fn serialize<SerializerT, T>(
        param: &T,
        s: SerializerT,
    ) -> Result<SerializerT::Ok, SerializerT::Error>
    where
        SerializerT: Serializer,
        T: serde::Serialize,
    {
        let mut params = s.serialize_seq(Some(1))?;
        params.serialize_element(param)?;
        params.end()
    }
}

/// Helper module for (de)serializing a `u64` from/to its `0x`-prefixed
/// hexadecimal quantity form.
pub mod quantity {
    use super::{Deserialize, Deserializer, Serializer};

    /// Deserializes a `0x`-prefixed hexadecimal quantity into a `u64`.
    pub fn deserialize<'de, DeserializerT>(d: DeserializerT) -> Result<u64, DeserializerT::Error>
    where
        DeserializerT: Deserializer<'de>,
    {
        let value = alloy_primitives::U64::deserialize(d)?;
        Ok(value.to())
    }

    /// Serializes a `u64` as a `0x`-prefixed hexadecimal quantity.
    pub fn serialize<SerializerT>(
        value: &u64,
        s: SerializerT,
    ) -> Result<SerializerT::Ok, SerializerT::Error>
    where
        SerializerT: Serializer,
    {
        s.serialize_str(&format!("0x{value:x}"))
    }
}

/// Helper module for (de)serializing an `Option<u64>` from/to its
/// `0x`-prefixed hexadecimal quantity form.
pub mod optional_quantity {
    use super::{Deserialize, Deserializer, Serializer};

    /// Deserializes an optional `0x`-prefixed hexadecimal quantity.
    pub fn deserialize<'de, DeserializerT>(
        d: DeserializerT,
    ) -> Result<Option<u64>, DeserializerT::Error>
    where
        DeserializerT: Deserializer<'de>,
    {
        let value = Option::<alloy_primitives::U64>::deserialize(d)?;
        Ok(value.map(|value| value.to()))
    }

    /// Serializes an optional `u64` as a `0x`-prefixed hexadecimal quantity.
    pub fn serialize<SerializerT>(
        value: &Option<u64>,
        s: SerializerT,
    ) -> Result<SerializerT::Ok, SerializerT::Error>
    where
        SerializerT: Serializer,
    {
        match value {
            Some(value) => s.serialize_str(&format!("0x{value:x}")),
            None => s.serialize_none(),
        }
    }
}
