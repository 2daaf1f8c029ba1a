//! Chain-agnostic block, transaction and receipt types parsed from raw JSON-RPC

use alloy::primitives::{Address, Bytes, B256, U256};
use anyhow::{Context, Result};

use crate::domain::abi::LogEntry;

/// Raw block header data parsed from JSON - works with any EVM chain
#[derive(Debug, Clone)]
pub struct RawBlock {
    pub number: u64,
    pub hash: B256,
    pub timestamp: u64,
    pub tx_count: usize,
}

/// Raw transaction data parsed from JSON - chain agnostic
#[derive(Debug, Clone)]
pub struct RawTransaction {
    pub hash: B256,
    pub chain_id: Option<u64>,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub gas: u64,
    pub gas_price: Option<U256>,
    pub nonce: u64,
}

/// Raw receipt data parsed from JSON
#[derive(Debug, Clone)]
pub struct RawReceipt {
    pub status: Option<bool>,
    pub gas_used: u64,
    pub logs: Vec<LogEntry>,
}

/// Parse raw JSON block response to our chain-agnostic RawBlock type
pub fn parse_raw_block(json: &serde_json::Value) -> Result<RawBlock> {
    let number = parse_hex_u64(str_field(json, "number").context("block is missing 'number'")?)?;
    let hash = parse_b256(str_field(json, "hash").context("block is missing 'hash'")?)?;
    let timestamp = parse_hex_u64(str_field(json, "timestamp").unwrap_or("0x0"))?;
    let tx_count = json
        .get("transactions")
        .and_then(|v| v.as_array())
        .map(|txs| txs.len())
        .unwrap_or(0);

    Ok(RawBlock {
        number,
        hash,
        timestamp,
        tx_count,
    })
}

/// Parse a single transaction from JSON
pub fn parse_raw_transaction(json: &serde_json::Value) -> Result<RawTransaction> {
    let hash = parse_b256(str_field(json, "hash").context("transaction is missing 'hash'")?)?;
    let from = parse_address(str_field(json, "from").context("transaction is missing 'from'")?)?;
    let to = str_field(json, "to").map(parse_address).transpose()?;

    let value = parse_hex_u256(str_field(json, "value").unwrap_or("0x0"))?;
    let input = parse_bytes(str_field(json, "input").unwrap_or("0x"))?;

    let gas = parse_hex_u64(str_field(json, "gas").unwrap_or("0x0"))?;
    let gas_price = str_field(json, "gasPrice").map(parse_hex_u256).transpose()?;
    let nonce = parse_hex_u64(str_field(json, "nonce").unwrap_or("0x0"))?;
    let chain_id = str_field(json, "chainId").map(parse_hex_u64).transpose()?;

    Ok(RawTransaction {
        hash,
        chain_id,
        from,
        to,
        value,
        input,
        gas,
        gas_price,
        nonce,
    })
}

/// Parse a transaction receipt from JSON
pub fn parse_raw_receipt(json: &serde_json::Value) -> Result<RawReceipt> {
    // Pre-Byzantium receipts carry a state root instead of a status
    let status = str_field(json, "status")
        .map(parse_hex_u64)
        .transpose()?
        .map(|s| s == 1);
    let gas_used = parse_hex_u64(str_field(json, "gasUsed").unwrap_or("0x0"))?;

    let logs = json
        .get("logs")
        .and_then(|v| v.as_array())
        .map(|logs| logs.iter().map(parse_log).collect::<Result<Vec<_>>>())
        .transpose()?
        .unwrap_or_default();

    Ok(RawReceipt {
        status,
        gas_used,
        logs,
    })
}

/// Parse a single receipt log from JSON
fn parse_log(json: &serde_json::Value) -> Result<LogEntry> {
    let address = parse_address(str_field(json, "address").context("log is missing 'address'")?)?;

    let topics = json
        .get("topics")
        .and_then(|v| v.as_array())
        .map(|topics| {
            topics
                .iter()
                .map(|t| t.as_str().context("topic is not a string").and_then(parse_b256))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    let data = parse_bytes(str_field(json, "data").unwrap_or("0x"))?;
    let log_index = str_field(json, "logIndex").map(parse_hex_u64).transpose()?;

    Ok(LogEntry {
        address,
        topics,
        data,
        log_index,
    })
}

fn str_field<'a>(json: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    json.get(key).and_then(|v| v.as_str())
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parse hex string to u64
pub fn parse_hex_u64(s: &str) -> Result<u64> {
    let s = strip_hex_prefix(s);
    if s.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(s, 16).with_context(|| format!("Failed to parse hex u64 '{}'", s))
}

/// Parse a JSON-RPC quantity into U256
pub fn parse_hex_u256(s: &str) -> Result<U256> {
    let digits = strip_hex_prefix(s);
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).with_context(|| format!("Failed to parse hex U256 '{}'", s))
}

/// Parse `0x`-prefixed hex into bytes
pub fn parse_bytes(s: &str) -> Result<Bytes> {
    s.parse::<Bytes>()
        .with_context(|| format!("Invalid hex bytes '{}'", s))
}

/// Parse a 20-byte address, accepting any casing
pub fn parse_address(s: &str) -> Result<Address> {
    s.trim()
        .parse::<Address>()
        .with_context(|| format!("Invalid address '{}'", s))
}

/// Parse a 32-byte hash or word
pub fn parse_b256(s: &str) -> Result<B256> {
    s.trim()
        .parse::<B256>()
        .with_context(|| format!("Invalid 32-byte hex '{}'", s))
}
