//! The fixed predicate vocabulary
//!
//! All relation and property statements use predicate URIs from the
//! single model namespace below.

/// Namespace all predicates live under
pub const MODEL_NS: &str = "http://scapeproject.eu/model#";

pub const HAS_REPRESENTATION: &str = "http://scapeproject.eu/model#hasRepresentation";
pub const HAS_FILE: &str = "http://scapeproject.eu/model#hasFile";
pub const HAS_BITSTREAM: &str = "http://scapeproject.eu/model#hasBitStream";
pub const HAS_TYPE: &str = "http://scapeproject.eu/model#hasType";
pub const HAS_SCHEMA: &str = "http://scapeproject.eu/model#hasSchema";
pub const HAS_FILE_NAME: &str = "http://scapeproject.eu/model#hasFileName";
pub const HAS_MIME_TYPE: &str = "http://scapeproject.eu/model#hasMimeType";
pub const HAS_INGEST_SOURCE: &str = "http://scapeproject.eu/model#hasIngestSource";
pub const HAS_TITLE: &str = "http://scapeproject.eu/model#hasTitle";
pub const HAS_BITSTREAM_TYPE: &str = "http://scapeproject.eu/model#hasBitstreamType";
pub const HAS_LIFECYCLE_STATE: &str = "http://scapeproject.eu/model#hasLifeCycleState";
pub const HAS_LIFECYCLE_STATE_DETAILS: &str = "http://scapeproject.eu/model#hasLifeCycleStateDetails";
/// Queue membership on the well-known queue node
pub const HAS_ITEM: &str = "http://scapeproject.eu/model#hasItem";
/// Quarantined queue entries that exhausted their ingest attempts
pub const HAS_FAILED_ITEM: &str = "http://scapeproject.eu/model#hasFailedItem";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates_share_namespace() {
        for predicate in [
            HAS_REPRESENTATION,
            HAS_FILE,
            HAS_BITSTREAM,
            HAS_TYPE,
            HAS_SCHEMA,
            HAS_FILE_NAME,
            HAS_MIME_TYPE,
            HAS_INGEST_SOURCE,
            HAS_TITLE,
            HAS_BITSTREAM_TYPE,
            HAS_LIFECYCLE_STATE,
            HAS_LIFECYCLE_STATE_DETAILS,
            HAS_ITEM,
            HAS_FAILED_ITEM,
        ] {
            assert!(predicate.starts_with(MODEL_NS));
        }
    }
}
