//! Grips and the geometry that validates them
//!
//! A grip is a sticker position on the puzzle surface, named by its integer
//! coordinates. On an `n^4` hypercube the face axis carries `±n` and the
//! remaining three coordinates step by two through `-(n-1)..=(n-1)`.

use crate::geometry::{Mat4, Vec4};
use crate::symmetry;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grip {
    pub coords: Vec4,
}

impl Grip {
    pub fn new(coords: Vec4) -> Self {
        Self { coords }
    }

    /// This grip as seen after applying `m`.
    pub fn transformed(&self, m: &Mat4) -> Self {
        Self {
            coords: m.apply(&self.coords),
        }
    }
}

impl From<Vec4> for Grip {
    fn from(coords: Vec4) -> Self {
        Self { coords }
    }
}

impl fmt::Display for Grip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.coords;
        write!(f, "{} {} {} {}", c[0], c[1], c[2], c[3])
    }
}

/// Puzzle shape collaborator: knows which coordinates name real grips and
/// which orthogonal transforms map the puzzle onto itself.
pub trait GripGeometry: fmt::Debug + Send + Sync {
    fn is_valid_grip(&self, coords: &Vec4) -> bool;

    /// The puzzle's discrete symmetry group.
    fn symmetries(&self) -> &[Mat4];

    fn admits(&self, m: &Mat4) -> bool {
        self.symmetries().contains(m)
    }
}

/// The `length^4` hypercube. Its symmetry group is the full hyperoctahedral
/// group, so every signed permutation is admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypercubeGeometry {
    pub length: i32,
}

impl HypercubeGeometry {
    pub fn new(length: i32) -> Self {
        Self { length }
    }

    /// The face axis and its sign, if `coords` lie on a face.
    pub fn face_of(&self, coords: &Vec4) -> Option<(usize, i32)> {
        let length = self.length.unsigned_abs();
        let mut faces = coords
            .iter()
            .enumerate()
            .filter(|(_, c)| c.unsigned_abs() == length);
        match (faces.next(), faces.next()) {
            (Some((axis, c)), None) => Some((axis, c.signum())),
            _ => None,
        }
    }
}

impl Default for HypercubeGeometry {
    fn default() -> Self {
        Self::new(3)
    }
}

impl GripGeometry for HypercubeGeometry {
    fn is_valid_grip(&self, coords: &Vec4) -> bool {
        if self.length < 1 {
            return false;
        }
        let Some((face_axis, _)) = self.face_of(coords) else {
            return false;
        };
        let inner = self.length - 1;
        coords
            .iter()
            .enumerate()
            .filter(|(axis, _)| *axis != face_axis)
            .all(|(_, &c)| {
                c.unsigned_abs() <= inner.unsigned_abs() && c.rem_euclid(2) == inner.rem_euclid(2)
            })
    }

    fn symmetries(&self) -> &[Mat4] {
        symmetry::hyperoctahedral_group()
    }

    fn admits(&self, m: &Mat4) -> bool {
        m.is_signed_permutation()
    }
}
