//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based Ethereum provider implementations
//! - ABI loading and decoding using alloy-json-abi / alloy-dyn-abi

pub mod abi;
pub mod ethereum;

pub use abi::{AbiLoader, AlloyAbiDecoder};
