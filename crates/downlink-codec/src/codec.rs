//! Codec entry point.

use crate::decode::{decode_frame, DecodedFrame};
use crate::encode::{encode_frame, DownlinkRequest, EncodedFrame};
use crate::hexstr::parse_hex;
use crate::registry::Registry;
use crate::Result;
use std::sync::Arc;

/// Encoder and decoder bound to one registry.
///
/// Cloning is cheap; clones share the registry.
#[derive(Debug, Clone)]
pub struct DownlinkCodec {
    registry: Arc<Registry>,
}

impl DownlinkCodec {
    /// Codec over a custom registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        DownlinkCodec { registry }
    }

    /// Codec over [`Registry::standard`].
    pub fn standard() -> Self {
        DownlinkCodec::new(Arc::new(Registry::standard()))
    }

    /// The registry in use.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Build a frame.
    pub fn encode(&self, request: &DownlinkRequest) -> Result<EncodedFrame> {
        encode_frame(&self.registry, request)
    }

    /// Decode a hex string. Whitespace is ignored.
    pub fn decode(&self, hex: &str) -> Result<DecodedFrame> {
        let bytes = parse_hex(hex)?;
        self.decode_bytes(&bytes)
    }

    /// Decode raw frame bytes.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodedFrame> {
        decode_frame(&self.registry, bytes)
    }
}

impl Default for DownlinkCodec {
    fn default() -> Self {
        DownlinkCodec::standard()
    }
}
