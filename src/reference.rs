//! The mutable named-pointer data model (§3).

use crate::key::ObjId;

/// A named mutable pointer: branch or tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    pub pointer_id: ObjId,
    pub deleted: bool,
    pub generation: u64,
    /// Opaque extended metadata, passed through unexamined by the cache.
    pub extended_info: Vec<u8>,
}

impl Reference {
    pub fn new(name: impl Into<String>, pointer_id: ObjId, generation: u64) -> Self {
        Self {
            name: name.into(),
            pointer_id,
            deleted: false,
            generation,
            extended_info: Vec::new(),
        }
    }
}
