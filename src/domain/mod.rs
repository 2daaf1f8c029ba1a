//! Domain layer - implementation-independent models and contracts

pub mod abi;
