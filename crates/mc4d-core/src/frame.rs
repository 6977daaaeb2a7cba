//! Reference frames and the reorientation search
//!
//! A macro remembers three reference stickers. To replay it after the puzzle
//! has been turned or mirrored, the host supplies the stickers that now sit
//! where the recorded ones did, and we look for the symmetry `M` with
//! `current[i] · M == recorded[i]` for all three of them.

use crate::error::{Error, Result};
use crate::geometry::{self, Mat4, Vec4, NDIMS};
use crate::grip::GripGeometry;
use serde::{Deserialize, Serialize};

pub const MAXREFS: usize = 3;

/// Three linearly independent reference directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[Vec4; MAXREFS]", into = "[Vec4; MAXREFS]")]
pub struct ReferenceFrame {
    refs: [Vec4; MAXREFS],
}

impl ReferenceFrame {
    pub fn new(refs: [Vec4; MAXREFS]) -> Result<Self> {
        if !geometry::linearly_independent(&refs) {
            return Err(Error::degenerate_frame(&refs));
        }
        Ok(Self { refs })
    }

    /// Like [`ReferenceFrame::new`], but every reference must also be a
    /// sticker of `geometry`. Fails with `INVALID_GRIP` otherwise.
    pub fn checked(refs: [Vec4; MAXREFS], geometry: &dyn GripGeometry) -> Result<Self> {
        if let Some(bad) = refs.iter().find(|r| !geometry.is_valid_grip(r)) {
            return Err(Error::invalid_grip(bad));
        }
        Self::new(refs)
    }

    pub fn refs(&self) -> &[Vec4; MAXREFS] {
        &self.refs
    }

    /// This frame after applying `m` to every reference.
    pub fn transformed(&self, m: &Mat4) -> Self {
        // an orthogonal image of an independent triple stays independent
        Self {
            refs: self.refs.map(|r| m.apply(&r)),
        }
    }

    /// Finds the symmetry carrying `current` onto `self`.
    pub fn reorientation_from(
        &self,
        current: &ReferenceFrame,
        geometry: &dyn GripGeometry,
    ) -> Result<Reorientation> {
        let mut search = Search {
            from: &current.refs,
            to: &self.refs,
            geometry,
            mat: Mat4::ZERO,
            used: [false; NDIMS],
        };
        if search.assign(0) {
            let matrix = search.mat;
            let det = matrix.det();
            tracing::debug!(det, "matched reference frame");
            Ok(Reorientation { matrix, det })
        } else {
            tracing::warn!(
                current = ?current.refs,
                recorded = ?self.refs,
                "no symmetry matches reference frame"
            );
            Err(Error::no_matching_orientation(&current.refs))
        }
    }
}

impl TryFrom<[Vec4; MAXREFS]> for ReferenceFrame {
    type Error = Error;

    fn try_from(refs: [Vec4; MAXREFS]) -> Result<Self> {
        Self::new(refs)
    }
}

impl From<ReferenceFrame> for [Vec4; MAXREFS] {
    fn from(frame: ReferenceFrame) -> Self {
        frame.refs
    }
}

/// A matched transform plus its handedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reorientation {
    pub matrix: Mat4,
    /// +1 for a rotation, -1 when the match needed a reflection.
    pub det: i32,
}

impl Reorientation {
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::identity(),
            det: 1,
        }
    }

    pub fn is_reflection(&self) -> bool {
        self.det < 0
    }
}

/// Backtracking over axis images. Row `r` of the matrix says where axis `r`
/// of the current frame goes; an assignment `r -> sign * e[c]` survives only
/// if it agrees with every reference pair on that coordinate.
struct Search<'a> {
    from: &'a [Vec4; MAXREFS],
    to: &'a [Vec4; MAXREFS],
    geometry: &'a dyn GripGeometry,
    mat: Mat4,
    used: [bool; NDIMS],
}

impl Search<'_> {
    fn assign(&mut self, row: usize) -> bool {
        if row == NDIMS {
            return self.geometry.admits(&self.mat);
        }
        for col in 0..NDIMS {
            if self.used[col] {
                continue;
            }
            for sign in [1, -1] {
                if !self.consistent(row, col, sign) {
                    continue;
                }
                self.mat.0[row][col] = sign as i32;
                self.used[col] = true;
                if self.assign(row + 1) {
                    return true;
                }
                self.used[col] = false;
                self.mat.0[row][col] = 0;
            }
        }
        false
    }

    fn consistent(&self, row: usize, col: usize, sign: i64) -> bool {
        self.from
            .iter()
            .zip(self.to.iter())
            .all(|(f, t)| i64::from(f[row]) * sign == i64::from(t[col]))
    }
}
