use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A named block tag, as accepted by the `eth_*` block parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    /// The genesis block
    Earliest,
    /// The latest canonical block
    Latest,
    /// The pending block
    Pending,
    /// The latest safe block
    Safe,
    /// The latest finalized block
    Finalized,
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockTag::Earliest => "earliest",
            BlockTag::Latest => "latest",
            BlockTag::Pending => "pending",
            BlockTag::Safe => "safe",
            BlockTag::Finalized => "finalized",
        })
    }
}

/// A block specifier: either an explicit block number or a named tag.
///
/// EIP-1898 object specifiers (`{"blockNumber": …}` / `{"blockHash": …}`) are
/// rejected at deserialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockSpec {
    /// A `0x`-prefixed hexadecimal block number
    Number(u64),
    /// A named tag
    Tag(BlockTag),
}

impl BlockSpec {
    /// Constructs an instance for the latest block.
    pub fn latest() -> Self {
        Self::Tag(BlockTag::Latest)
    }
}

impl fmt::Display for BlockSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockSpec::Number(number) => write!(f, "0x{number:x}"),
            BlockSpec::Tag(tag) => tag.fmt(f),
        }
    }
}

impl Serialize for BlockSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BlockSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Error when parsing a [`BlockSpec`] from its string form.
#[derive(Debug, thiserror::Error)]
#[error("invalid block specifier: '{0}'")]
pub struct InvalidBlockSpec(String);

impl std::str::FromStr for BlockSpec {
    type Err = InvalidBlockSpec;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "earliest" => Ok(Self::Tag(BlockTag::Earliest)),
            "latest" => Ok(Self::Tag(BlockTag::Latest)),
            "pending" => Ok(Self::Tag(BlockTag::Pending)),
            "safe" => Ok(Self::Tag(BlockTag::Safe)),
            "finalized" => Ok(Self::Tag(BlockTag::Finalized)),
            _ => raw
                .strip_prefix("0x")
                .and_then(|digits| u64::from_str_radix(digits, 16).ok())
                .map(Self::Number)
                .ok_or_else(|| InvalidBlockSpec(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() -> anyhow::Result<()> {
        for (json, spec) in [
            (r#""latest""#, BlockSpec::Tag(BlockTag::Latest)),
            (r#""pending""#, BlockSpec::Tag(BlockTag::Pending)),
            (r#""0xf297c5""#, BlockSpec::Number(0xf297c5)),
            (r#""0x0""#, BlockSpec::Number(0)),
        ] {
            assert_eq!(serde_json::from_str::<BlockSpec>(json)?, spec);
            assert_eq!(serde_json::to_string(&spec)?, json);
        }

        Ok(())
    }

    #[test]
    fn rejects_eip1898_objects_and_garbage() {
        assert!(serde_json::from_str::<BlockSpec>(r#"{"blockNumber": "0x1"}"#).is_err());
        assert!(serde_json::from_str::<BlockSpec>(r#""0xzz""#).is_err());
        assert!(serde_json::from_str::<BlockSpec>(r#""newest""#).is_err());
    }
}
