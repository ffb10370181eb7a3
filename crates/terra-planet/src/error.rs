//! Structural errors for planet sessions.
//!
//! Only invariant violations are errors. Missing prerequisites (no color
//! stops, no vertices, a flat height field) are reported as skipped outcomes.

use crate::planet::{MeshHandle, OverlayKind};

/// Errors raised when an operation targets a buffer that no longer exists.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanetError {
    /// The session was disposed; no buffers remain.
    #[error("planet session has been disposed")]
    Disposed,

    /// The handle refers to a terrain mesh that was replaced or never built.
    #[error("terrain handle {handle:?} is stale (current: {current:?})")]
    StaleMesh {
        /// The handle that was presented.
        handle: MeshHandle,
        /// The live terrain handle, if any.
        current: Option<MeshHandle>,
    },

    /// The handle refers to an overlay shell that was disabled or rebuilt.
    #[error("{kind:?} overlay handle is stale")]
    StaleOverlay {
        /// Which overlay the handle was issued for.
        kind: OverlayKind,
    },

    /// A per-vertex attribute does not match the mesh's vertex count.
    #[error("attribute `{name}` has {actual} entries but the mesh has {expected} vertices")]
    AttributeLength {
        /// Attribute name.
        name: String,
        /// Vertex count of the mesh.
        expected: usize,
        /// Entries supplied.
        actual: usize,
    },
}
