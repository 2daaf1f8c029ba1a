//! Ethereum provider abstraction and Alloy implementations
//!
//! Uses raw JSON requests for block, transaction and receipt fetching to
//! support all EVM chains including L2s like Optimism/Base that have
//! non-standard transaction types.

use std::path::PathBuf;

use alloy::network::Ethereum;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use anyhow::{Context, Result};

use super::types::{
    parse_raw_block, parse_raw_receipt, parse_raw_transaction, RawBlock, RawReceipt,
    RawTransaction,
};

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

/// Abstract Ethereum provider trait
///
/// This trait defines the node queries the inspector needs,
/// abstracting over the specific Alloy transport.
#[async_trait::async_trait]
pub trait EthereumProvider: Send + Sync + 'static {
    /// Get the chain id reported by the node
    async fn chain_id(&self) -> Result<u64>;

    /// Get account balance at the latest block
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Get the latest block header (chain-agnostic raw format)
    async fn latest_block(&self) -> Result<RawBlock>;

    /// Get a transaction by hash
    async fn get_transaction(&self, hash: B256) -> Result<Option<RawTransaction>>;

    /// Get transaction receipt
    async fn get_receipt(&self, hash: B256) -> Result<Option<RawReceipt>>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

// Filled provider shared by every transport
type FilledProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Enum-based provider that stores the connected provider for each transport
pub enum AlloyProvider {
    Http {
        provider: FilledProvider,
        endpoint: String,
    },
    WebSocket {
        provider: FilledProvider,
        endpoint: String,
    },
    #[cfg(unix)]
    Ipc {
        provider: FilledProvider,
        endpoint: String,
    },
}

/// Create a provider from configuration
pub async fn create_provider(config: ProviderConfig) -> Result<Box<dyn EthereumProvider>> {
    tracing::debug!(endpoint = %config.display(), "Connecting to node");
    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            Ok(Box::new(AlloyProvider::Http {
                provider,
                endpoint: url,
            }))
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .context("Failed to create WebSocket provider")?;
            Ok(Box::new(AlloyProvider::WebSocket {
                provider,
                endpoint: url,
            }))
        }
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc_path = path.to_string_lossy().to_string();
            let ipc = IpcConnect::new(ipc_path);
            let provider = ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .context("Failed to create IPC provider")?;
            let display = path.display().to_string();
            Ok(Box::new(AlloyProvider::Ipc {
                provider,
                endpoint: display,
            }))
        }
    }
}

impl AlloyProvider {
    fn provider(&self) -> &FilledProvider {
        match self {
            AlloyProvider::Http { provider, .. } => provider,
            AlloyProvider::WebSocket { provider, .. } => provider,
            #[cfg(unix)]
            AlloyProvider::Ipc { provider, .. } => provider,
        }
    }

    /// Issue a raw JSON-RPC request and return the untyped result
    async fn raw_json<P>(&self, method: &'static str, params: P) -> Result<serde_json::Value>
    where
        P: serde::Serialize + Clone + std::fmt::Debug + Send + Sync + Unpin + 'static,
    {
        tracing::trace!(method, "Sending raw request");
        self.provider()
            .raw_request(method.into(), params)
            .await
            .with_context(|| format!("{} request failed", method))
    }
}

#[async_trait::async_trait]
impl EthereumProvider for AlloyProvider {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider().get_chain_id().await?)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.provider().get_balance(address).await?)
    }

    async fn latest_block(&self) -> Result<RawBlock> {
        let json = self.raw_json("eth_getBlockByNumber", ("latest", false)).await?;

        if json.is_null() {
            anyhow::bail!("Node returned no latest block");
        }

        parse_raw_block(&json)
    }

    async fn get_transaction(&self, hash: B256) -> Result<Option<RawTransaction>> {
        let json = self.raw_json("eth_getTransactionByHash", (hash,)).await?;

        if json.is_null() {
            return Ok(None);
        }

        Ok(Some(parse_raw_transaction(&json)?))
    }

    async fn get_receipt(&self, hash: B256) -> Result<Option<RawReceipt>> {
        let json = self.raw_json("eth_getTransactionReceipt", (hash,)).await?;

        if json.is_null() {
            return Ok(None);
        }

        Ok(Some(parse_raw_receipt(&json)?))
    }

    fn endpoint_name(&self) -> String {
        match self {
            AlloyProvider::Http { endpoint, .. } => endpoint.clone(),
            AlloyProvider::WebSocket { endpoint, .. } => endpoint.clone(),
            #[cfg(unix)]
            AlloyProvider::Ipc { endpoint, .. } => endpoint.clone(),
        }
    }
}
