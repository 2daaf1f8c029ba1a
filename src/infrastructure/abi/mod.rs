//! ABI infrastructure - Alloy-based ABI loading and decoding

mod decoder;
mod format;
mod loader;

pub use decoder::AlloyAbiDecoder;
pub use format::format_value;
pub use loader::AbiLoader;
