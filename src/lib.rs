//! Fetch a transaction from an Ethereum node and decode its calldata and
//! event logs against a local JSON ABI.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod report;
