use std::collections::BTreeMap;

/// A stored blob: opaque payload + declared media type + metadata + cached size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    /// The payload bytes.
    pub data: Vec<u8>,
    pub media_type: String,
    /// Flat string attributes stored beside the payload.
    pub metadata: BTreeMap<String, String>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredBlob {
    pub fn new(data: Vec<u8>, media_type: impl Into<String>, metadata: BTreeMap<String, String>) -> Self {
        let size = data.len() as u64;
        Self {
            data,
            media_type: media_type.into(),
            metadata,
            size,
        }
    }
}

/// One page of a key listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyPage {
    /// Keys in ascending lexicographic order.
    pub keys: Vec<String>,
    /// Pass back to continue after the last key; `None` when exhausted.
    pub continuation: Option<String>,
}

impl KeyPage {
    pub fn is_truncated(&self) -> bool {
        self.continuation.is_some()
    }
}
