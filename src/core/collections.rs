//! Collection aliases used throughout the mesh and insertion code.
//!
//! The face registries of [`TetrahedralMesh`](crate::core::tetrahedral_mesh::TetrahedralMesh)
//! sit on the hot path of every insertion, so they use `rustc_hash` instead of the default
//! SipHash, and short-lived per-flip scratch lists use `smallvec` to stay on the stack.

mod aliases;
mod buffers;

pub use aliases::*;
pub use buffers::*;
