//! ABI file loader - parses a local JSON ABI into an `AbiRegistry`

use std::fs;
use std::path::Path;

use alloy_json_abi::{Event, Function, JsonAbi};
use alloy_primitives::{keccak256, B256};
use anyhow::{Context, Result};

use crate::domain::abi::{AbiRegistry, EventSignature, MethodSignature, ParamSpec};

/// Files larger than this are not treated as ABIs
const MAX_ABI_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Bored Ape Yacht Club ABI compiled into the binary
///
/// Used when no ABI path is configured, so the default run does not depend
/// on the working directory.
pub const BUNDLED_ABI: &str = include_str!("../../../abis/bored_ape.json");

/// ABI file loader
pub struct AbiLoader;

impl AbiLoader {
    /// Load a single ABI file
    ///
    /// Accepts either a bare ABI array or a build artifact with an `abi` field.
    pub fn load(path: impl AsRef<Path>) -> Result<AbiRegistry> {
        let path = path.as_ref();

        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to stat ABI file {}", path.display()))?;
        if metadata.len() > MAX_ABI_FILE_BYTES {
            anyhow::bail!(
                "ABI file {} is too large ({} bytes)",
                path.display(),
                metadata.len()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read ABI file {}", path.display()))?;
        let registry = Self::parse_str(&content)
            .with_context(|| format!("Failed to parse ABI file {}", path.display()))?;

        if registry.is_empty() {
            tracing::warn!(path = %path.display(), "ABI declares no functions or events");
        }
        tracing::debug!(
            path = %path.display(),
            methods = registry.methods().count(),
            events = registry.events().count(),
            "ABI loaded"
        );

        Ok(registry)
    }

    /// Load the ABI compiled into the binary
    pub fn bundled() -> Result<AbiRegistry> {
        Self::parse_str(BUNDLED_ABI).context("Failed to parse bundled ABI")
    }

    /// Parse ABI JSON text
    pub fn parse_str(content: &str) -> Result<AbiRegistry> {
        let value: serde_json::Value = serde_json::from_str(content).context("Invalid JSON")?;

        // Try to extract ABI - either raw array or nested in "abi" field
        let abi_value = if value.is_array() {
            value
        } else if let Some(abi) = value.get("abi") {
            abi.clone()
        } else {
            anyhow::bail!("No ABI found (expected a JSON array or an object with an \"abi\" field)");
        };

        let abi: JsonAbi = serde_json::from_value(abi_value).context("Malformed ABI entries")?;
        Ok(Self::from_json_abi(&abi))
    }

    /// Build a registry from an already parsed `JsonAbi`
    pub fn from_json_abi(abi: &JsonAbi) -> AbiRegistry {
        let mut registry = AbiRegistry::new();

        for function in abi.functions() {
            registry.insert_method(Self::method_signature(function));
        }

        for event in abi.events() {
            // Anonymous events have no selector in topic 0
            if event.anonymous {
                tracing::trace!(event = %event.name, "Skipping anonymous event");
                continue;
            }
            registry.insert_event(Self::event_signature(event));
        }

        registry
    }

    fn method_signature(function: &Function) -> MethodSignature {
        let signature = function.signature();
        let selector = Self::compute_selector(&signature);

        let inputs = function
            .inputs
            .iter()
            .map(|input| ParamSpec::new(input.name.clone(), input.selector_type()))
            .collect();

        MethodSignature {
            selector,
            name: function.name.clone(),
            signature,
            inputs,
        }
    }

    fn event_signature(event: &Event) -> EventSignature {
        let signature = event.signature();
        let selector = Self::compute_topic(&signature);

        let inputs = event
            .inputs
            .iter()
            .map(|input| ParamSpec {
                name: input.name.clone(),
                kind: input.selector_type().into_owned(),
                indexed: input.indexed,
            })
            .collect();

        EventSignature {
            selector,
            name: event.name.clone(),
            signature,
            inputs,
        }
    }

    /// Compute the 4-byte method selector from a signature
    fn compute_selector(signature: &str) -> [u8; 4] {
        let hash = keccak256(signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Compute the 32-byte event topic from a signature
    fn compute_topic(signature: &str) -> B256 {
        keccak256(signature.as_bytes())
    }
}
