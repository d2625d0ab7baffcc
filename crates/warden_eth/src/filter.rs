use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::block_spec::BlockSpec;

/// Either a single value or a list of values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMore<T> {
    /// A single value
    One(T),
    /// A list of values
    Many(Vec<T>),
}

impl<T: PartialEq> OneOrMore<T> {
    /// Whether the filter value matches `candidate`.
    pub fn matches(&self, candidate: &T) -> bool {
        match self {
            OneOrMore::One(value) => value == candidate,
            OneOrMore::Many(values) => values.contains(candidate),
        }
    }
}

/// The filter options of `eth_getLogs`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilterOptions {
    /// First block of the queried range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<BlockSpec>,
    /// Last block of the queried range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<BlockSpec>,
    /// A single block, mutually exclusive with the range fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    /// Emitting contract address(es)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<OneOrMore<Address>>,
    /// Per-position topic filters; `null` entries match any topic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Option<OneOrMore<B256>>>>,
}

impl LogFilterOptions {
    /// Whether a log with the given address and topics passes the filter's
    /// address and topic clauses.
    pub fn matches_log(&self, address: &Address, topics: &[B256]) -> bool {
        if let Some(filter) = &self.address {
            if !filter.matches(address) {
                return false;
            }
        }

        if let Some(positions) = &self.topics {
            for (position, filter) in positions.iter().enumerate() {
                let Some(filter) = filter else {
                    continue;
                };
                match topics.get(position) {
                    Some(topic) if filter.matches(topic) => {}
                    _ => return false,
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_and_topic_clauses() {
        let address = Address::repeat_byte(0xaa);
        let topic = B256::repeat_byte(0xbb);

        let filter = LogFilterOptions {
            address: Some(OneOrMore::One(address)),
            topics: Some(vec![None, Some(OneOrMore::Many(vec![topic]))]),
            ..LogFilterOptions::default()
        };

        assert!(filter.matches_log(&address, &[B256::ZERO, topic]));
        assert!(!filter.matches_log(&Address::ZERO, &[B256::ZERO, topic]));
        assert!(!filter.matches_log(&address, &[B256::ZERO, B256::ZERO]));
        // A filtered position beyond the log's topics is a mismatch.
        assert!(!filter.matches_log(&address, &[B256::ZERO]));
    }

    #[test]
    fn serde_shape() -> anyhow::Result<()> {
        let filter: LogFilterOptions = serde_json::from_str(
            r#"{
                "fromBlock": "0x1",
                "toBlock": "latest",
                "address": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                "topics": [null, ["0x0000000000000000000000000000000000000000000000000000000000000001"]]
            }"#,
        )?;

        assert_eq!(filter.from_block, Some(BlockSpec::Number(1)));
        assert!(matches!(filter.address, Some(OneOrMore::One(_))));
        assert_eq!(
            filter.topics.as_ref().map(|topics| topics.len()),
            Some(2usize)
        );
        Ok(())
    }
}
