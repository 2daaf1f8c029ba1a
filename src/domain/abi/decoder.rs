//! ABI decoder trait and types

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, B256};
use indexmap::IndexMap;
use thiserror::Error;

/// Decoded arguments keyed by parameter name, in declaration order
pub type DecodedArguments = IndexMap<String, DynSolValue>;

/// Errors raised while decoding calldata or logs against an ABI
///
/// Decoding is deterministic: the same input against the same registry
/// always fails the same way, so none of these are retryable.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No method or event in the registry matches the selector
    #[error("unknown selector: 0x{}", hex::encode(.0))]
    UnknownSelector(Vec<u8>),

    /// Byte layout does not match the declared parameter types
    #[error("failed to decode {context}: {reason}")]
    Decode { context: String, reason: String },

    /// A log carries more indexed topics than the event declares
    #[error("event {event} declares {indexed} indexed params but log has {topics} topics")]
    IndexedParamMismatch {
        event: String,
        topics: usize,
        indexed: usize,
    },

    /// Calldata is shorter than a 4-byte selector
    #[error("calldata too short (need at least 4 bytes for selector, got {0})")]
    InputTooShort(usize),

    /// A log without topic 0 cannot be matched to an event
    #[error("log has no topics, cannot identify event")]
    MissingEventTopic,
}

impl DecodeError {
    pub(crate) fn decode(context: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            context: context.into(),
            reason: reason.to_string(),
        }
    }
}

/// A raw event log as returned in a transaction receipt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntry {
    /// Emitting contract
    pub address: Address,
    /// Topic 0 is the event selector, topics 1..N are indexed params
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed params
    pub data: Bytes,
    /// Position of the log in the block, if known
    pub log_index: Option<u64>,
}

/// Result of decoding a method call
#[derive(Debug, Clone)]
pub struct DecodedCall {
    /// Method name
    pub method_name: String,
    /// Full method signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Decoded arguments
    pub arguments: DecodedArguments,
}

/// A decoded indexed event parameter
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTopic {
    /// Parameter name (or "arg{n}" if unnamed)
    pub name: String,
    /// Solidity type of the parameter
    pub kind: String,
    /// Decoded value
    pub value: DynSolValue,
}

/// Result of decoding one event log
#[derive(Debug, Clone)]
pub struct DecodedLog {
    /// Event name
    pub event_name: String,
    /// Full event signature (e.g., "Transfer(address,address,uint256)")
    pub signature: String,
    /// Emitting contract
    pub address: Address,
    /// Indexed params decoded from topics 1..N, in topic order
    pub indexed: Vec<DecodedTopic>,
    /// Non-indexed params decoded from the data payload
    pub data: DecodedArguments,
    /// Topics as they appeared on the log, selector included
    pub topics: Vec<B256>,
    /// Undecoded data payload
    pub raw_data: Bytes,
    /// Position of the log in the block, if known
    pub log_index: Option<u64>,
}

impl DecodedLog {
    /// Whether the data payload is long enough to carry non-indexed params
    ///
    /// Payloads of 0 or 1 bytes are treated as "no data".
    pub fn has_data(&self) -> bool {
        has_log_data(&self.raw_data)
    }
}

/// Length guard shared by the decoder and the report
pub fn has_log_data(data: &[u8]) -> bool {
    data.len() > 1
}

/// Trait for ABI decoding implementations
///
/// This trait abstracts over the actual ABI decoding implementation,
/// allowing us to swap out alloy-dyn-abi for a different library if needed.
pub trait AbiDecoder: Send + Sync {
    /// Decode calldata by looking up its selector
    ///
    /// # Arguments
    /// * `data` - The calldata bytes (including the 4-byte selector)
    ///
    /// # Returns
    /// * `Ok(DecodedCall)` - The decoded method call
    /// * `Err(DecodeError::UnknownSelector)` - If no method matches
    /// * `Err(...)` - If the payload does not match the method's types
    fn decode_calldata(&self, data: &[u8]) -> Result<DecodedCall, DecodeError>;

    /// Decode a single log entry by looking up topic 0
    fn decode_log(&self, log: &LogEntry) -> Result<DecodedLog, DecodeError>;

    /// Decode every log of a receipt, stopping at the first failure
    fn decode_logs(&self, logs: &[LogEntry]) -> Result<Vec<DecodedLog>, DecodeError> {
        logs.iter().map(|log| self.decode_log(log)).collect()
    }
}
