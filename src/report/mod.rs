//! Console and JSON rendering of an inspection run

use std::fmt::Write as _;

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::domain::abi::{DecodedArguments, DecodedCall, DecodedLog};
use crate::infrastructure::abi::format_value;
use crate::infrastructure::ethereum::{RawBlock, RawReceipt, RawTransaction};

/// Everything gathered during one run
#[derive(Debug, Clone)]
pub struct Report {
    pub account: Address,
    pub balance: U256,
    pub block: RawBlock,
    pub transaction: RawTransaction,
    pub call: DecodedCall,
    pub receipt: RawReceipt,
    pub logs: Vec<DecodedLog>,
}

const SEPARATOR: &str = "===========================================================";

/// Render the report as human-readable text
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let tx = &report.transaction;

    let _ = writeln!(
        out,
        "Account balance: {} wei ({} ETH)",
        report.balance,
        format_ether(report.balance)
    );
    let _ = writeln!(out, "Latest block: {}", report.block.number);

    let _ = writeln!(out, "Hash: {}", tx.hash);
    let _ = writeln!(out, "ChainID: {}", display_opt(tx.chain_id));
    let _ = writeln!(out, "Value: {}", tx.value);
    let _ = writeln!(out, "From: {}", tx.from.to_checksum(None));
    let _ = writeln!(
        out,
        "To: {}",
        tx.to
            .map(|to| to.to_checksum(None))
            .unwrap_or_else(|| "contract creation".to_string())
    );
    let _ = writeln!(out, "Gas: {}", tx.gas);
    let _ = writeln!(out, "GasPrice: {}", display_opt(tx.gas_price));
    let _ = writeln!(out, "Nonce: {}", tx.nonce);

    let _ = writeln!(out, "Method Name: {}", report.call.method_name);
    let _ = writeln!(out, "Method Inputs: {}", format_arguments(&report.call.arguments));

    for log in &report.logs {
        let _ = writeln!(out, "Event name: {}", log.event_name);
        for (i, topic) in log.indexed.iter().enumerate() {
            let _ = writeln!(
                out,
                "Indexed params {} name {} value decoded {}",
                i,
                topic.name,
                format_value(&topic.value)
            );
        }
        if log.has_data() {
            let _ = writeln!(out, "Log Data in Hex: {}", hex::encode(&log.raw_data));
            let _ = writeln!(out, "Event outputs: {}", format_arguments(&log.data));
        }
    }

    out.push_str(SEPARATOR);
    out.push('\n');
    out
}

/// Render the report as a pretty-printed JSON document
pub fn render_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExportableReport::from(report))
}

/// Format decoded arguments as `{name: value, ...}` in declaration order
pub fn format_arguments(arguments: &DecodedArguments) -> String {
    let items: Vec<String> = arguments
        .iter()
        .map(|(name, value)| format!("{}: {}", name, format_value(value)))
        .collect();
    format!("{{{}}}", items.join(", "))
}

fn display_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[derive(Serialize)]
struct ExportableReport {
    account: String,
    balance_wei: String,
    latest_block: ExportableBlock,
    transaction: ExportableTransaction,
    call: ExportableCall,
    receipt_status: Option<bool>,
    gas_used: u64,
    logs: Vec<ExportableLog>,
}

#[derive(Serialize)]
struct ExportableBlock {
    number: u64,
    hash: String,
    timestamp: u64,
    tx_count: usize,
}

#[derive(Serialize)]
struct ExportableTransaction {
    hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    chain_id: Option<u64>,
    value: String,
    from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<String>,
    gas: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_price: Option<String>,
    nonce: u64,
}

#[derive(Serialize)]
struct ExportableCall {
    method: String,
    signature: String,
    arguments: Vec<ExportableArg>,
}

#[derive(Serialize)]
struct ExportableLog {
    event: String,
    signature: String,
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_index: Option<u64>,
    topics: Vec<String>,
    indexed: Vec<ExportableArg>,
    data_hex: String,
    data: Vec<ExportableArg>,
}

#[derive(Serialize)]
struct ExportableArg {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    value: String,
}

fn exportable_args(arguments: &DecodedArguments) -> Vec<ExportableArg> {
    arguments
        .iter()
        .map(|(name, value)| ExportableArg {
            name: name.clone(),
            kind: None,
            value: format_value(value),
        })
        .collect()
}

impl From<&Report> for ExportableReport {
    fn from(report: &Report) -> Self {
        let tx = &report.transaction;
        Self {
            account: report.account.to_checksum(None),
            balance_wei: report.balance.to_string(),
            latest_block: ExportableBlock {
                number: report.block.number,
                hash: report.block.hash.to_string(),
                timestamp: report.block.timestamp,
                tx_count: report.block.tx_count,
            },
            transaction: ExportableTransaction {
                hash: tx.hash.to_string(),
                chain_id: tx.chain_id,
                value: tx.value.to_string(),
                from: tx.from.to_checksum(None),
                to: tx.to.map(|to| to.to_checksum(None)),
                gas: tx.gas,
                gas_price: tx.gas_price.map(|p| p.to_string()),
                nonce: tx.nonce,
            },
            call: ExportableCall {
                method: report.call.method_name.clone(),
                signature: report.call.signature.clone(),
                arguments: exportable_args(&report.call.arguments),
            },
            receipt_status: report.receipt.status,
            gas_used: report.receipt.gas_used,
            logs: report
                .logs
                .iter()
                .map(|log| ExportableLog {
                    event: log.event_name.clone(),
                    signature: log.signature.clone(),
                    address: log.address.to_checksum(None),
                    log_index: log.log_index,
                    topics: log.topics.iter().map(|topic| topic.to_string()).collect(),
                    indexed: log
                        .indexed
                        .iter()
                        .map(|topic| ExportableArg {
                            name: topic.name.clone(),
                            kind: Some(topic.kind.clone()),
                            value: format_value(&topic.value),
                        })
                        .collect(),
                    data_hex: log.raw_data.to_string(),
                    data: exportable_args(&log.data),
                })
                .collect(),
        }
    }
}
