//! Log filter
//!
//! Addresses combine with OR. Each topic position is an OR set; all
//! populated positions combine with AND. An empty address set or an empty
//! topic position is a wildcard.

use shared_types::{Address, Log, Topic};

use super::bloom_digest::BloomDigest;

/// Filter over log addresses and topics.
///
/// The per-element bloom patterns are computed once at construction so a
/// range scan only does superset tests per block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogQuery {
    addresses: Vec<Address>,
    topics: Vec<Vec<Topic>>,
    address_patterns: Vec<BloomDigest>,
    topic_patterns: Vec<Vec<BloomDigest>>,
}

impl LogQuery {
    /// Create a query from an address set and ordered topic positions.
    pub fn new(addresses: Vec<Address>, topics: Vec<Vec<Topic>>) -> Self {
        let address_patterns = addresses.iter().map(|a| BloomDigest::of(a)).collect();
        let topic_patterns = topics
            .iter()
            .map(|position| position.iter().map(|t| BloomDigest::of(t)).collect())
            .collect();
        Self {
            addresses,
            topics,
            address_patterns,
            topic_patterns,
        }
    }

    /// Query matching every log.
    pub fn any() -> Self {
        Self::default()
    }

    /// Query on addresses only.
    pub fn for_addresses(addresses: Vec<Address>) -> Self {
        Self::new(addresses, Vec::new())
    }

    /// Builder-style method to add one address.
    pub fn with_address(self, address: Address) -> Self {
        let mut addresses = self.addresses;
        addresses.push(address);
        Self::new(addresses, self.topics)
    }

    /// Builder-style method to append a topic position.
    ///
    /// An empty `position` is a wildcard.
    pub fn with_topic_position(self, position: Vec<Topic>) -> Self {
        let mut topics = self.topics;
        topics.push(position);
        Self::new(self.addresses, topics)
    }

    /// Candidate addresses (empty = any).
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Topic positions (an empty position = any).
    pub fn topics(&self) -> &[Vec<Topic>] {
        &self.topics
    }

    /// True if the query constrains nothing.
    pub fn is_wildcard(&self) -> bool {
        self.addresses.is_empty() && self.topics.iter().all(|position| position.is_empty())
    }

    /// Bloom pre-filter: could a block with this digest contain a match?
    pub fn matches(&self, digest: &BloomDigest) -> bool {
        let address_ok = self.address_patterns.is_empty()
            || self
                .address_patterns
                .iter()
                .any(|pattern| digest.possibly_contains(pattern));
        if !address_ok {
            return false;
        }

        self.topic_patterns.iter().all(|position| {
            position.is_empty() || position.iter().any(|pattern| digest.possibly_contains(pattern))
        })
    }

    /// Exact match against a concrete log.
    ///
    /// A log with fewer topics than a populated query position never
    /// matches that position.
    pub fn matches_exact(&self, log: &Log) -> bool {
        if !self.addresses.is_empty() && !self.addresses.contains(&log.address) {
            return false;
        }

        self.topics.iter().enumerate().all(|(i, position)| {
            position.is_empty()
                || log
                    .topics
                    .get(i)
                    .is_some_and(|topic| position.contains(topic))
        })
    }
}
