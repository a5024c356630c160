//! Contract call outcome parsing
//!
//! The network does not report a contract's return values in one place.
//! Depending on how the call ended they sit in a contract result, in a
//! `signalError` event or in a `writeLog` event. [`ResultsParser`] tries
//! these locations in a fixed order and slices the data field found there
//! into a return code and return values.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use mvx_primitives::Address;
use mvx_types::{ExecutionRecord, LogEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::abi::{decode_top_level_at, DecodeError, DecodeErrorKind, EndpointDef, Type, TypedValue};
use crate::call_data::parse_call_data;
use crate::SdkError;

/// Event emitted when a contract signals an error
pub const SIGNAL_ERROR_EVENT: &str = "signalError";

/// Event carrying the return data of completed calls
pub const WRITE_LOG_EVENT: &str = "writeLog";

/// Topic prefix of the refund warning emitted on completed calls
pub const TOO_MUCH_GAS_TOPIC_PREFIX: &str = "@too much gas provided for processing";

/// Head of token transfer call data
pub const ESDT_TRANSFER_FUNCTION: &str = "ESDTTransfer";

/// Head of single NFT/SFT transfer call data
pub const ESDT_NFT_TRANSFER_FUNCTION: &str = "ESDTNFTTransfer";

/// Head of multi-token transfer call data
pub const MULTI_ESDT_NFT_TRANSFER_FUNCTION: &str = "MultiESDTNFTTransfer";

/// Outcome status reported by the VM
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnCode {
    /// No contract was involved
    None,
    /// Success
    Ok,
    /// Endpoint does not exist
    FunctionNotFound,
    /// Endpoint called with wrong arguments
    FunctionWrongSignature,
    /// No contract at the address
    ContractNotFound,
    /// The contract signalled an error
    UserError,
    /// Execution ran out of gas
    OutOfGas,
    /// Deploy address already used
    AccountCollision,
    /// Sender cannot cover the transfer and fees
    OutOfFunds,
    /// Call depth exceeded
    CallStackOverFlow,
    /// Bytecode is not a valid contract
    ContractInvalid,
    /// Any other VM failure
    ExecutionFailed,
    /// A code this crate does not know
    Other(String),
}

/// Network texts of the known return codes
pub const KNOWN_RETURN_CODES: &[(&str, ReturnCode)] = &[
    ("ok", ReturnCode::Ok),
    ("function not found", ReturnCode::FunctionNotFound),
    ("wrong signature for function", ReturnCode::FunctionWrongSignature),
    ("contract not found", ReturnCode::ContractNotFound),
    ("user error", ReturnCode::UserError),
    ("out of gas", ReturnCode::OutOfGas),
    ("account collision", ReturnCode::AccountCollision),
    ("out of funds", ReturnCode::OutOfFunds),
    ("call stack overflow", ReturnCode::CallStackOverFlow),
    ("contract invalid", ReturnCode::ContractInvalid),
    ("execution failed", ReturnCode::ExecutionFailed),
];

impl ReturnCode {
    /// Code for a network text; unknown texts are kept verbatim
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return ReturnCode::None;
        }
        KNOWN_RETURN_CODES
            .iter()
            .find(|(t, _)| *t == text)
            .map(|(_, code)| code.clone())
            .unwrap_or_else(|| ReturnCode::Other(text.to_string()))
    }

    /// Code for the raw return-code segment of a data field
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_text(&String::from_utf8_lossy(bytes))
    }

    /// Network text of the code
    pub fn as_text(&self) -> &str {
        match self {
            ReturnCode::None => "",
            ReturnCode::Other(text) => text,
            known => KNOWN_RETURN_CODES
                .iter()
                .find(|(_, code)| code == known)
                .map(|(text, _)| *text)
                .unwrap_or_default(),
        }
    }

    /// True for `Ok` and for plain transfers
    pub fn is_success(&self) -> bool {
        matches!(self, ReturnCode::Ok | ReturnCode::None)
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

/// Outcome with raw return values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntypedOutcomeBundle {
    /// Return code
    pub return_code: ReturnCode,
    /// Human-readable message
    pub return_message: String,
    /// Return values, one buffer per part
    pub values: Vec<Vec<u8>>,
}

/// Outcome with return values decoded against an endpoint's outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedOutcomeBundle {
    /// Return code
    pub return_code: ReturnCode,
    /// Human-readable message
    pub return_message: String,
    /// Decoded values, one per declared output
    pub values: Vec<TypedValue>,
}

impl TypedOutcomeBundle {
    /// First decoded value
    pub fn first_value(&self) -> Option<&TypedValue> {
        self.values.first()
    }
}

/// Response of a read-only query as reported by the network
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Return code text
    #[serde(default)]
    pub return_code: String,
    /// Return message
    #[serde(default)]
    pub return_message: String,
    /// Base64 return parts
    #[serde(default)]
    pub return_data: Vec<String>,
}

impl QueryResponse {
    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decoded return parts
    pub fn return_data_parts(&self) -> Result<Vec<Vec<u8>>, SdkError> {
        self.return_data
            .iter()
            .map(|part| {
                BASE64
                    .decode(part)
                    .map_err(|e| SdkError::Serialization(format!("invalid base64 return data: {}", e)))
            })
            .collect()
    }
}

/// What a transaction asked for, read from its data field
///
/// Token transfers sent to oneself carry the called contract and function
/// inside their arguments; `receiver` and `function` name those instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionMetadata {
    /// Caller
    pub sender: Address,
    /// Contract the call is meant for
    pub receiver: Address,
    /// Called function; empty for plain transfers
    pub function: String,
    /// Call arguments after any transfer segments
    pub arguments: Vec<Vec<u8>>,
}

impl TransactionMetadata {
    /// Read the metadata of a processed transaction
    ///
    /// Data that is not call data yields the transaction's own receiver
    /// and no function.
    pub fn from_record(record: &ExecutionRecord) -> Self {
        let mut metadata = Self {
            sender: record.sender,
            receiver: record.receiver,
            function: String::new(),
            arguments: Vec::new(),
        };
        let data = match std::str::from_utf8(&record.data) {
            Ok(data) if !data.is_empty() => data,
            _ => return metadata,
        };
        let Ok((head, args)) = parse_call_data(data) else {
            return metadata;
        };

        let self_sent = record.sender == record.receiver;
        let transfer = match head.as_str() {
            ESDT_TRANSFER_FUNCTION => Some((None, 2)),
            ESDT_NFT_TRANSFER_FUNCTION if self_sent => Some((args.get(3), 4)),
            MULTI_ESDT_NFT_TRANSFER_FUNCTION if self_sent => {
                let count = args.get(1).map(|c| be_usize(c)).unwrap_or_default();
                Some((args.first(), count.saturating_mul(3).saturating_add(2)))
            }
            _ => None,
        };
        let Some((receiver, call_start)) = transfer else {
            metadata.function = head;
            metadata.arguments = args;
            return metadata;
        };

        if let Some(receiver) = receiver {
            match Address::from_slice(receiver) {
                Ok(address) => metadata.receiver = address,
                Err(_) => return metadata,
            }
        }
        if let Some((function, rest)) = args.get(call_start..).and_then(|a| a.split_first()) {
            metadata.function = String::from_utf8_lossy(function).into_owned();
            metadata.arguments = rest.to_vec();
        }
        metadata
    }
}

fn be_usize(bytes: &[u8]) -> usize {
    bytes.iter().fold(0usize, |acc, b| acc.saturating_mul(256).saturating_add(usize::from(*b)))
}

/// Extra outcome lookup tried after the built-in event heuristics
pub trait OutcomeHeuristic: Send + Sync {
    /// Outcome of `record`, or `None` to let later heuristics try
    fn find_outcome(
        &self,
        record: &ExecutionRecord,
        metadata: &TransactionMetadata,
    ) -> Option<Result<UntypedOutcomeBundle, SdkError>>;
}

/// Locates and decodes contract call outcomes
#[derive(Clone, Default)]
pub struct ResultsParser {
    custom: Vec<Arc<dyn OutcomeHeuristic>>,
}

impl fmt::Debug for ResultsParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultsParser")
            .field("custom_heuristics", &self.custom.len())
            .finish()
    }
}

impl ResultsParser {
    /// Create a parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a heuristic tried before the contract-result fallback
    pub fn with_heuristic(mut self, heuristic: impl OutcomeHeuristic + 'static) -> Self {
        self.custom.push(Arc::new(heuristic));
        self
    }

    /// Find the outcome of a processed transaction
    pub fn parse_untyped_outcome(&self, record: &ExecutionRecord) -> Result<UntypedOutcomeBundle, SdkError> {
        let metadata = TransactionMetadata::from_record(record);

        if record.contract_results.is_empty() && record.logs.events.is_empty() {
            debug!(tx = %record.hash, "No contract results or events, plain transfer");
            return Ok(UntypedOutcomeBundle {
                return_code: ReturnCode::None,
                return_message: String::new(),
                values: Vec::new(),
            });
        }

        if record.status.is_invalid() {
            if let Some(receipt) = record.receipt.as_ref().filter(|r| !r.data.is_empty()) {
                debug!(tx = %record.hash, "Invalid transaction with receipt");
                return Ok(UntypedOutcomeBundle {
                    return_code: ReturnCode::OutOfFunds,
                    return_message: receipt.data.clone(),
                    values: Vec::new(),
                });
            }
        }

        if let Some(result) = record
            .contract_results
            .iter()
            .find(|r| r.nonce != 0 && r.data.starts_with('@'))
        {
            debug!(tx = %record.hash, result = %result.hash, "Outcome found in contract result");
            let (return_code, values) = slice_data_field(&result.data)?;
            let return_message = if result.return_message.is_empty() {
                return_code.to_string()
            } else {
                result.return_message.clone()
            };
            return Ok(UntypedOutcomeBundle {
                return_code,
                return_message,
                values,
            });
        }

        // Event heuristics only look at the transaction's own logs; events of
        // nested calls are left to the fallback below
        let logs = &record.logs;

        if let Some(event) = logs.find_first_event(SIGNAL_ERROR_EVENT) {
            debug!(tx = %record.hash, "Outcome found in signalError event");
            return bundle_from_event(event, true);
        }

        if let Some(event) = logs.find_events(WRITE_LOG_EVENT).find(|e| {
            e.topics
                .iter()
                .any(|t| t.starts_with(TOO_MUCH_GAS_TOPIC_PREFIX.as_bytes()))
        }) {
            debug!(tx = %record.hash, "Outcome found in gas refund writeLog event");
            return bundle_from_event(event, true);
        }

        if let Some(event) = logs
            .find_events(WRITE_LOG_EVENT)
            .find(|e| e.topics.iter().any(|t| t.as_slice() == record.sender.as_bytes()))
        {
            debug!(tx = %record.hash, "Outcome found in writeLog event addressed to sender");
            return bundle_from_event(event, false);
        }

        for heuristic in &self.custom {
            if let Some(outcome) = heuristic.find_outcome(record, &metadata) {
                debug!(tx = %record.hash, "Outcome found by custom heuristic");
                return outcome;
            }
        }

        for result in &record.contract_results {
            let found = result.logs.find_events(WRITE_LOG_EVENT).find(|e| {
                e.address == record.sender
                    && e.topics.first().map(Vec::as_slice) == Some(metadata.receiver.as_bytes())
            });
            if let Some(event) = found {
                debug!(
                    tx = %record.hash,
                    result = %result.hash,
                    function = %metadata.function,
                    "Outcome found in contract result writeLog event"
                );
                return bundle_from_event(event, false);
            }
        }

        warn!(tx = %record.hash, "Cannot locate contract call outcome");
        Err(SdkError::OutcomeNotFound(format!("transaction {}", record.hash)))
    }

    /// Find the outcome and decode its values against `endpoint`'s outputs
    pub fn parse_outcome(
        &self,
        record: &ExecutionRecord,
        endpoint: &EndpointDef,
    ) -> Result<TypedOutcomeBundle, SdkError> {
        let bundle = self.parse_untyped_outcome(record)?;
        let values = decode_outputs(&bundle.values, &endpoint.outputs)?;
        Ok(TypedOutcomeBundle {
            return_code: bundle.return_code,
            return_message: bundle.return_message,
            values,
        })
    }

    /// Raw outcome of a query
    pub fn parse_untyped_query_response(
        &self,
        response: &QueryResponse,
    ) -> Result<UntypedOutcomeBundle, SdkError> {
        Ok(UntypedOutcomeBundle {
            return_code: ReturnCode::from_text(&response.return_code),
            return_message: response.return_message.clone(),
            values: response.return_data_parts()?,
        })
    }

    /// Query outcome decoded against `endpoint`'s outputs
    pub fn parse_query_response(
        &self,
        response: &QueryResponse,
        endpoint: &EndpointDef,
    ) -> Result<TypedOutcomeBundle, SdkError> {
        let bundle = self.parse_untyped_query_response(response)?;
        let values = decode_outputs(&bundle.values, &endpoint.outputs)?;
        Ok(TypedOutcomeBundle {
            return_code: bundle.return_code,
            return_message: bundle.return_message,
            values,
        })
    }
}

fn bundle_from_event(event: &LogEvent, message_from_topic: bool) -> Result<UntypedOutcomeBundle, SdkError> {
    let (return_code, values) = slice_data_field(&String::from_utf8_lossy(&event.data))?;
    let last_topic = event
        .topics
        .last()
        .filter(|_| message_from_topic)
        .map(|t| String::from_utf8_lossy(t).into_owned())
        .filter(|t| !t.is_empty());
    let return_message = last_topic.unwrap_or_else(|| return_code.to_string());
    Ok(UntypedOutcomeBundle {
        return_code,
        return_message,
        values,
    })
}

/// Split a data field into its return code and values
///
/// The first segment (usually empty) is skipped; token transfer data also
/// skips the token identifier and amount.
fn slice_data_field(data: &str) -> Result<(ReturnCode, Vec<Vec<u8>>), SdkError> {
    let start = if data.starts_with(ESDT_TRANSFER_FUNCTION) { 3 } else { 1 };
    let (head, args) = parse_call_data(data)?;
    let mut parts = std::iter::once(head.into_bytes()).chain(args).skip(start);

    let code = parts.next().unwrap_or_default();
    if code.is_empty() {
        return Err(SdkError::OutcomeNotFound(format!("no return code in {:?}", data)));
    }
    Ok((ReturnCode::from_bytes(&code), parts.collect()))
}

fn decode_outputs(parts: &[Vec<u8>], outputs: &[Type]) -> Result<Vec<TypedValue>, SdkError> {
    let mut values = Vec::with_capacity(outputs.len());
    let mut next = 0;

    for (index, ty) in outputs.iter().enumerate() {
        let path = format!("output[{}]", index);
        match ty {
            Type::Variadic(item) => {
                let items = parts[next.min(parts.len())..]
                    .iter()
                    .enumerate()
                    .map(|(j, part)| decode_top_level_at(part, item, &format!("{}[{}]", path, j)))
                    .collect::<Result<Vec<_>, _>>()?;
                next = parts.len();
                values.push(TypedValue::variadic((**item).clone(), items));
            }
            Type::Optional(inner) => match parts.get(next) {
                Some(part) => {
                    next += 1;
                    let value = decode_top_level_at(part, inner, &path)?;
                    values.push(TypedValue::optional_some(value));
                }
                None => values.push(TypedValue::optional_none((**inner).clone())),
            },
            _ => {
                let part = parts.get(next).ok_or_else(|| DecodeError {
                    path: path.clone(),
                    offset: 0,
                    kind: DecodeErrorKind::Unsupported(format!(
                        "missing return part for {}",
                        ty
                    )),
                })?;
                next += 1;
                values.push(decode_top_level_at(part, ty, &path)?);
            }
        }
    }
    Ok(values)
}
