//! The record emitted for every match.

use std::collections::BTreeMap;

use serde::Serialize;

/// Result of a successful vanity match.
///
/// Optional fields are omitted from the serialized form rather than written as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VanityResult {
    /// The account address (0x prefixed, checksummed unless disabled)
    pub address: String,
    /// Uncompressed public key hex, when key material is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,
    /// Private key hex, when key material is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<String>,
    /// Contract addresses by 1-based ordinal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contracts: Option<BTreeMap<usize, String>>,
}

impl VanityResult {
    /// Compact single-line JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_omitted() {
        let result = VanityResult {
            address: "0xabc".into(),
            public: None,
            private: None,
            contracts: None,
        };
        assert_eq!(result.to_json().unwrap(), r#"{"address":"0xabc"}"#);
    }

    #[test]
    fn test_contracts_serialize_in_ordinal_order() {
        let contracts = [(2, "0x2".to_string()), (1, "0x1".to_string())]
            .into_iter()
            .collect();
        let result = VanityResult {
            address: "0xabc".into(),
            public: Some("0xpub".into()),
            private: Some("0xpriv".into()),
            contracts: Some(contracts),
        };
        assert_eq!(
            result.to_json().unwrap(),
            r#"{"address":"0xabc","public":"0xpub","private":"0xpriv","contracts":{"1":"0x1","2":"0x2"}}"#
        );
    }
}
