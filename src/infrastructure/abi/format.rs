//! Human-readable rendering of decoded ABI values

use alloy_dyn_abi::DynSolValue;

/// Format a DynSolValue for display
///
/// Integers are decimal, addresses EIP-55 checksummed, byte strings `0x` hex.
pub fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => {
            let bytes = &word.as_slice()[..(*size).min(32)];
            format!("0x{}", hex::encode(bytes))
        }
        DynSolValue::Address(addr) => addr.to_checksum(None),
        DynSolValue::Function(func) => format!("0x{}", hex::encode(func.as_slice())),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => format!("{:?}", s),
        DynSolValue::Array(arr) | DynSolValue::FixedArray(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        DynSolValue::Tuple(fields) => {
            let items: Vec<String> = fields.iter().map(format_value).collect();
            format!("({})", items.join(", "))
        }
        #[allow(unreachable_patterns)]
        other => format!("{:?}", other),
    }
}
