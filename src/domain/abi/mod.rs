//! ABI domain models and contracts
//!
//! This module defines the traits and types for ABI decoding,
//! independent of the underlying implementation (alloy-dyn-abi).

mod decoder;
mod registry;

pub use decoder::{
    AbiDecoder, DecodeError, DecodedArguments, DecodedCall, DecodedLog, DecodedTopic, LogEntry,
    has_log_data,
};
pub use registry::{AbiRegistry, EventSignature, MethodSignature, ParamSpec};
