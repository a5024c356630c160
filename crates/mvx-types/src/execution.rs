//! Execution records returned by the network for a processed transaction.
//!
//! These mirror the JSON the network reports (camelCase keys, base64-encoded
//! event topics and data) so they can be deserialized directly.

use mvx_primitives::Address;
use serde::{Deserialize, Serialize};

/// Processing status as reported by the network (`success`, `fail`, `invalid`, ...)
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionStatus(pub String);

impl TransactionStatus {
    /// Create from a status string
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    /// Executed and successful
    pub fn is_successful(&self) -> bool {
        matches!(self.0.as_str(), "executed" | "success" | "successful")
    }

    /// Executed with failure
    pub fn is_failed(&self) -> bool {
        matches!(self.0.as_str(), "fail" | "failed" | "unsuccessful")
    }

    /// Rejected before execution (e.g. insufficient funds)
    pub fn is_invalid(&self) -> bool {
        self.0 == "invalid"
    }

    /// Status text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Event emitted during execution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Emitting address
    pub address: Address,
    /// Event identifier (`signalError`, `writeLog`, ...)
    pub identifier: String,
    /// Topics, base64 on the wire
    #[serde(default, with = "base64_vec")]
    pub topics: Vec<Vec<u8>>,
    /// Event data, base64 on the wire
    #[serde(default, with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl LogEvent {
    /// Create an event
    pub fn new(address: Address, identifier: impl Into<String>, topics: Vec<Vec<u8>>) -> Self {
        Self {
            address,
            identifier: identifier.into(),
            topics,
            data: Vec::new(),
        }
    }
}

/// Log container attached to a transaction or a contract result
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLogs {
    /// Address the logs belong to
    #[serde(default)]
    pub address: Address,
    /// Emitted events
    #[serde(default)]
    pub events: Vec<LogEvent>,
}

impl TransactionLogs {
    /// Find events by identifier
    pub fn find_events<'a>(&'a self, identifier: &'a str) -> impl Iterator<Item = &'a LogEvent> {
        self.events.iter().filter(move |e| e.identifier == identifier)
    }

    /// Find the first event with the given identifier
    pub fn find_first_event<'a>(&'a self, identifier: &'a str) -> Option<&'a LogEvent> {
        self.find_events(identifier).next()
    }
}

/// Smart-contract result: an intra- or cross-shard message produced by execution
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractResult {
    /// Result hash
    #[serde(default)]
    pub hash: String,
    /// Nonce of the result (non-zero for results returning to the caller)
    #[serde(default)]
    pub nonce: u64,
    /// Sender address
    #[serde(default)]
    pub sender: Address,
    /// Receiver address
    #[serde(default)]
    pub receiver: Address,
    /// Call data of the result, e.g. `@6f6b@2a`
    #[serde(default)]
    pub data: String,
    /// Message attached by the VM
    #[serde(default)]
    pub return_message: String,
    /// Logs emitted while processing this result
    #[serde(default)]
    pub logs: TransactionLogs,
}

/// Receipt attached to transactions that failed before execution
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReceipt {
    /// Receipt data, e.g. `insufficient funds`
    #[serde(default)]
    pub data: String,
    /// Hash of the transaction the receipt belongs to
    #[serde(default)]
    pub tx_hash: String,
}

/// Everything the network reports about one processed transaction
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    /// Transaction hash
    #[serde(default)]
    pub hash: String,
    /// Sender address
    #[serde(default)]
    pub sender: Address,
    /// Receiver address
    #[serde(default)]
    pub receiver: Address,
    /// Call data of the transaction, base64 on the wire
    #[serde(default, with = "base64_bytes")]
    pub data: Vec<u8>,
    /// Processing status
    #[serde(default)]
    pub status: TransactionStatus,
    /// Receipt, if any
    #[serde(default)]
    pub receipt: Option<ExecutionReceipt>,
    /// Smart-contract results
    #[serde(default, rename = "smartContractResults")]
    pub contract_results: Vec<ContractResult>,
    /// Transaction logs
    #[serde(default)]
    pub logs: TransactionLogs,
}

impl ExecutionRecord {
    /// Parse from the network's JSON representation
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s {
            Some(s) => BASE64.decode(s.as_bytes()).map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

mod base64_vec {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(items: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(&BASE64.encode(item))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let items: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
        items
            .unwrap_or_default()
            .into_iter()
            .map(|item| match item {
                Some(s) => BASE64.decode(s.as_bytes()).map_err(serde::de::Error::custom),
                None => Ok(Vec::new()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "hash": "2a8b4c",
        "sender": "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th",
        "receiver": "erd1qqqqqqqqqqqqqpgqhy6nl6zq07rnzry8uyh6rtyq0uzgtk3e69fqgtz9l4",
        "data": "Z2V0U3Vt",
        "status": "success",
        "smartContractResults": [
            {
                "hash": "ab01",
                "nonce": 7,
                "sender": "erd1qqqqqqqqqqqqqpgqhy6nl6zq07rnzry8uyh6rtyq0uzgtk3e69fqgtz9l4",
                "receiver": "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th",
                "data": "@6f6b@2a",
                "returnMessage": ""
            }
        ],
        "logs": {
            "address": "erd1qqqqqqqqqqqqqpgqhy6nl6zq07rnzry8uyh6rtyq0uzgtk3e69fqgtz9l4",
            "events": [
                {
                    "address": "erd1qqqqqqqqqqqqqpgqhy6nl6zq07rnzry8uyh6rtyq0uzgtk3e69fqgtz9l4",
                    "identifier": "completedTxEvent",
                    "topics": ["aGVsbG8=", null],
                    "data": null
                }
            ]
        }
    }"#;

    #[test]
    fn test_deserialize_execution_record() {
        let record = ExecutionRecord::from_json(SAMPLE).unwrap();
        assert!(record.status.is_successful());
        assert_eq!(record.data, b"getSum".to_vec());
        assert_eq!(record.contract_results.len(), 1);
        assert_eq!(record.contract_results[0].nonce, 7);
        assert_eq!(record.contract_results[0].data, "@6f6b@2a");
        assert!(record.receiver.is_smart_contract());
        assert!(record.receipt.is_none());

        let event = &record.logs.events[0];
        assert_eq!(event.identifier, "completedTxEvent");
        assert_eq!(event.topics, vec![b"hello".to_vec(), Vec::new()]);
        assert!(event.data.is_empty());
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let record = ExecutionRecord::from_json(r#"{"status":"invalid","receipt":{"data":"insufficient funds"}}"#)
            .unwrap();
        assert!(record.status.is_invalid());
        assert_eq!(record.receipt.unwrap().data, "insufficient funds");
        assert!(record.contract_results.is_empty());
        assert!(record.logs.events.is_empty());
    }

    #[test]
    fn test_event_serde_roundtrip() {
        let mut event = LogEvent::new(Address::ZERO, "writeLog", vec![vec![1, 2, 3]]);
        event.data = b"data".to_vec();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""topics":["AQID"]"#));
        let back: LogEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_find_first_event() {
        let logs = TransactionLogs {
            address: Address::ZERO,
            events: vec![
                LogEvent::new(Address::ZERO, "writeLog", vec![]),
                LogEvent::new(Address::ZERO, "signalError", vec![b"x".to_vec()]),
            ],
        };
        let found = logs.find_first_event("signalError").unwrap();
        assert_eq!(found.topics[0], b"x");
        assert!(logs.find_first_event("missing").is_none());
    }
}
