//! mc4d-core - geometry for orientation-independent 4D puzzle macros
//!
//! Integer 4-vectors, the signed-permutation symmetry group of the
//! hypercube, grips, reference frames and the search that matches a
//! puzzle's current reference stickers against a macro's recorded ones.

pub mod error;
pub mod frame;
pub mod geometry;
pub mod grip;
pub mod symmetry;

pub use error::{Error, ErrorCode, Result};
pub use frame::{ReferenceFrame, Reorientation, MAXREFS};
pub use geometry::{Mat4, Vec4, NDIMS};
pub use grip::{Grip, GripGeometry, HypercubeGeometry};

pub mod prelude {
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::frame::{ReferenceFrame, Reorientation, MAXREFS};
    pub use crate::geometry::{Mat4, Vec4, NDIMS};
    pub use crate::grip::{Grip, GripGeometry, HypercubeGeometry};
    pub use crate::symmetry::hyperoctahedral_group;
}
