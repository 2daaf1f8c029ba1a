//! ABI registry - stores method and event signatures by selector

use alloy_primitives::B256;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A method or event parameter specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    /// Canonical Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
    /// Whether the parameter is stored in a log topic (events only)
    #[serde(default)]
    pub indexed: bool,
}

impl ParamSpec {
    /// Create a non-indexed parameter
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            indexed: false,
        }
    }

    /// Create an indexed event parameter
    pub fn indexed(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            indexed: true,
        }
    }

    /// Name used as the key in decoded output, `arg{position}` when unnamed
    pub fn display_name(&self, position: usize) -> String {
        if self.name.trim().is_empty() {
            format!("arg{}", position)
        } else {
            self.name.clone()
        }
    }
}

/// A method signature with its metadata
#[derive(Debug, Clone)]
pub struct MethodSignature {
    /// 4-byte method selector
    pub selector: [u8; 4],
    /// Method name
    pub name: String,
    /// Full signature string (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Input parameters
    pub inputs: Vec<ParamSpec>,
}

/// An event signature with its metadata
#[derive(Debug, Clone)]
pub struct EventSignature {
    /// 32-byte event selector (topic 0)
    pub selector: B256,
    /// Event name
    pub name: String,
    /// Full signature string (e.g., "Transfer(address,address,uint256)")
    pub signature: String,
    /// All parameters in declaration order
    pub inputs: Vec<ParamSpec>,
}

impl EventSignature {
    /// Parameters stored in topics 1..N, in declaration order
    pub fn indexed_inputs(&self) -> impl Iterator<Item = (usize, &ParamSpec)> {
        self.inputs.iter().enumerate().filter(|(_, p)| p.indexed)
    }

    /// Parameters stored in the data payload, in declaration order
    pub fn data_inputs(&self) -> impl Iterator<Item = (usize, &ParamSpec)> {
        self.inputs.iter().enumerate().filter(|(_, p)| !p.indexed)
    }

    /// Number of indexed parameters
    pub fn indexed_count(&self) -> usize {
        self.inputs.iter().filter(|p| p.indexed).count()
    }
}

/// Parsed contract interface: methods and events indexed by selector
///
/// Built once by the loader and treated as read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct AbiRegistry {
    /// Methods indexed by 4-byte selector, in declaration order
    methods: IndexMap<[u8; 4], MethodSignature>,
    /// Events indexed by topic 0, in declaration order
    events: IndexMap<B256, EventSignature>,
}

impl AbiRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a method signature
    ///
    /// Note: First method for a given selector wins (no overwrite)
    pub fn insert_method(&mut self, method: MethodSignature) {
        self.methods.entry(method.selector).or_insert(method);
    }

    /// Insert an event signature
    ///
    /// Note: First event for a given selector wins (no overwrite)
    pub fn insert_event(&mut self, event: EventSignature) {
        self.events.entry(event.selector).or_insert(event);
    }

    /// Look up a method by selector
    pub fn method(&self, selector: [u8; 4]) -> Option<&MethodSignature> {
        self.methods.get(&selector)
    }

    /// Look up an event by topic 0
    pub fn event(&self, selector: &B256) -> Option<&EventSignature> {
        self.events.get(selector)
    }

    /// Look up a method by selector hex string (e.g., "0xa9059cbb")
    pub fn method_hex(&self, selector_hex: &str) -> Option<&MethodSignature> {
        let normalized = selector_hex
            .strip_prefix("0x")
            .or_else(|| selector_hex.strip_prefix("0X"))
            .unwrap_or(selector_hex);

        if normalized.len() != 8 {
            return None;
        }

        let bytes = hex::decode(normalized).ok()?;
        let selector: [u8; 4] = bytes.try_into().ok()?;
        self.method(selector)
    }

    /// All methods in declaration order
    pub fn methods(&self) -> impl Iterator<Item = &MethodSignature> {
        self.methods.values()
    }

    /// All events in declaration order
    pub fn events(&self) -> impl Iterator<Item = &EventSignature> {
        self.events.values()
    }

    /// Number of registered methods and events
    pub fn len(&self) -> usize {
        self.methods.len() + self.events.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.events.is_empty()
    }
}
