//! Metadata codec boundary
//!
//! Stored metadata nodes hold serialized payload bytes; the codec is
//! the seam between the opaque in-memory payload and that raw content.

use crate::metadata::Metadata;
use bytes::Bytes;
use preservio_common::{Error, Result};

/// Serializes and deserializes metadata payloads
pub trait MetadataCodec: Send + Sync {
    /// Serialize a payload to the raw form stored on its metadata node
    fn serialize(&self, metadata: &Metadata) -> Result<Bytes>;

    /// Deserialize a payload from stored raw content
    fn deserialize(&self, raw: &[u8]) -> Result<Metadata>;

    /// Media type recorded for stored metadata content
    fn content_type(&self) -> &'static str;
}

/// JSON codec for metadata payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl MetadataCodec for JsonCodec {
    fn serialize(&self, metadata: &Metadata) -> Result<Bytes> {
        let raw = serde_json::to_vec(metadata)?;
        Ok(Bytes::from(raw))
    }

    fn deserialize(&self, raw: &[u8]) -> Result<Metadata> {
        serde_json::from_slice(raw).map_err(|e| Error::Codec(e.to_string()))
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataKind;
    use serde_json::json;

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let md = Metadata::new(MetadataKind::TextMd, json!({"encoding": "UTF-8"}));
        let raw = codec.serialize(&md).unwrap();
        let back = codec.deserialize(&raw).unwrap();
        assert_eq!(back, md);
    }

    #[test]
    fn test_json_codec_rejects_garbage() {
        let codec = JsonCodec;
        let err = codec.deserialize(b"not json").unwrap_err();
        assert!(matches!(err, Error::Codec(_)));
    }
}
