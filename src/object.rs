//! The `Obj` data model (§3): a caller-defined value with a `kind` and an `id`, opaque to
//! the cache beyond those two accessors.

use crate::key::ObjId;

/// What the cache needs to know about an object, independent of its actual payload type.
pub trait ObjectMeta<Kind> {
    fn id(&self) -> ObjId;
    fn kind(&self) -> &Kind;
}
