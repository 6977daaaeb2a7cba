//! Integer 4-vectors and signed-permutation matrices
//!
//! Vectors are rows: applying `M` to `v` computes `v · M`, so row `r` of a
//! matrix is the image of axis `r`.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const NDIMS: usize = 4;

pub type Vec4 = [i32; NDIMS];

/// 4x4 integer matrix. Reorientation transforms are always signed
/// permutations: one entry of ±1 per row and column, zeros elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mat4(pub [[i32; NDIMS]; NDIMS]);

impl Mat4 {
    pub const ZERO: Mat4 = Mat4([[0; NDIMS]; NDIMS]);

    pub fn identity() -> Self {
        let mut m = Self::ZERO;
        for i in 0..NDIMS {
            m.0[i][i] = 1;
        }
        m
    }

    /// Builds the signed permutation sending axis `r` to `signs[r] * e[perm[r]]`.
    pub fn signed_permutation(perm: [usize; NDIMS], signs: [i32; NDIMS]) -> Self {
        let mut m = Self::ZERO;
        for r in 0..NDIMS {
            m.0[r][perm[r]] = signs[r];
        }
        m
    }

    /// `v · self`
    pub fn apply(&self, v: &Vec4) -> Vec4 {
        let mut out = [0; NDIMS];
        for (c, o) in out.iter_mut().enumerate() {
            *o = (0..NDIMS).map(|r| v[r] * self.0[r][c]).sum();
        }
        out
    }

    /// `self · other`, i.e. apply `self` first, then `other`.
    pub fn then(&self, other: &Mat4) -> Mat4 {
        let mut m = Self::ZERO;
        for r in 0..NDIMS {
            m.0[r] = other.apply(&self.0[r]);
        }
        m
    }

    pub fn transpose(&self) -> Mat4 {
        let mut m = Self::ZERO;
        for r in 0..NDIMS {
            for c in 0..NDIMS {
                m.0[c][r] = self.0[r][c];
            }
        }
        m
    }

    pub fn is_signed_permutation(&self) -> bool {
        let mut col_used = [false; NDIMS];
        for row in &self.0 {
            let mut nonzero = row.iter().enumerate().filter(|(_, x)| **x != 0);
            match (nonzero.next(), nonzero.next()) {
                (Some((c, &x)), None) if x.abs() == 1 && !col_used[c] => col_used[c] = true,
                _ => return false,
            }
        }
        true
    }

    /// Determinant by cofactor expansion along the first row. Saturates
    /// when the result leaves the `i32` range.
    pub fn det(&self) -> i32 {
        let m = &self.0;
        let det = (0..NDIMS).fold(0i128, |acc, c| {
            let sign = if c % 2 == 0 { 1 } else { -1 };
            let term = minor3(m, 0, c).saturating_mul(sign * i128::from(m[0][c]));
            acc.saturating_add(term)
        });
        det.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Mat4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<String> = self
            .0
            .iter()
            .map(|r| format!("{:2} {:2} {:2} {:2}", r[0], r[1], r[2], r[3]))
            .collect();
        write!(f, "{}", rows.join("\n"))
    }
}

/// 3x3 minor of a 4x4 matrix with `skip_row` and `skip_col` removed.
fn minor3(m: &[[i32; NDIMS]; NDIMS], skip_row: usize, skip_col: usize) -> i128 {
    let mut sub = [[0i32; 3]; 3];
    let mut i = 0;
    for r in (0..NDIMS).filter(|&r| r != skip_row) {
        let mut j = 0;
        for c in (0..NDIMS).filter(|&c| c != skip_col) {
            sub[i][j] = m[r][c];
            j += 1;
        }
        i += 1;
    }
    det3(&sub)
}

/// Exact for any `i32` entries: three factors of at most 2^31 each.
pub(crate) fn det3(m: &[[i32; 3]; 3]) -> i128 {
    let m = m.map(|row| row.map(i128::from));
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// True when the three vectors span a 3-dimensional subspace, i.e. at least
/// one of the four 3x3 minors of the 3x4 matrix they form is non-zero.
pub fn linearly_independent(vs: &[Vec4; 3]) -> bool {
    (0..NDIMS).any(|skip| {
        let mut sub = [[0i32; 3]; 3];
        for (i, v) in vs.iter().enumerate() {
            let mut j = 0;
            for c in (0..NDIMS).filter(|&c| c != skip) {
                sub[i][j] = v[c];
                j += 1;
            }
        }
        det3(&sub) != 0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_applies_unchanged() {
        let v = [3, -2, 0, 2];
        assert_eq!(Mat4::identity().apply(&v), v);
        assert_eq!(Mat4::identity().det(), 1);
    }

    #[test]
    fn swap_is_a_reflection() {
        let m = Mat4::signed_permutation([1, 0, 2, 3], [1, 1, 1, 1]);
        assert!(m.is_signed_permutation());
        assert_eq!(m.det(), -1);
        assert_eq!(m.apply(&[3, 2, 0, 0]), [2, 3, 0, 0]);
    }

    #[test]
    fn single_sign_flip_is_a_reflection_and_two_are_not() {
        let one = Mat4::signed_permutation([0, 1, 2, 3], [-1, 1, 1, 1]);
        let two = Mat4::signed_permutation([0, 1, 2, 3], [-1, -1, 1, 1]);
        assert_eq!(one.det(), -1);
        assert_eq!(two.det(), 1);
    }

    #[test]
    fn then_composes_in_application_order() {
        let a = Mat4::signed_permutation([1, 2, 3, 0], [1, 1, 1, 1]);
        let b = Mat4::signed_permutation([0, 1, 2, 3], [1, -1, 1, 1]);
        let v = [1, 2, 3, 4];
        assert_eq!(a.then(&b).apply(&v), b.apply(&a.apply(&v)));
    }

    #[test]
    fn transpose_inverts_signed_permutations() {
        let m = Mat4::signed_permutation([2, 0, 3, 1], [-1, 1, 1, -1]);
        assert_eq!(m.then(&m.transpose()), Mat4::identity());
    }

    #[test]
    fn rejects_non_permutations() {
        let mut m = Mat4::identity();
        m.0[0][1] = 1;
        assert!(!m.is_signed_permutation());
        let mut scaled = Mat4::identity();
        scaled.0[2][2] = 2;
        assert!(!scaled.is_signed_permutation());
        assert!(!Mat4::ZERO.is_signed_permutation());
    }

    #[test]
    fn independence() {
        assert!(linearly_independent(&[[3, 0, 0, 0], [0, 3, 0, 0], [0, 0, 3, 0]]));
        assert!(linearly_independent(&[[3, 2, 0, 0], [3, 0, 2, 0], [3, 0, 0, 2]]));
        assert!(!linearly_independent(&[[3, 0, 0, 0], [-3, 0, 0, 0], [0, 3, 0, 0]]));
        assert!(!linearly_independent(&[[3, 2, 0, 0], [0, 0, 3, 2], [3, 2, 3, 2]]));
    }

    #[test]
    fn huge_entries_do_not_overflow() {
        let big = 2_000_000;
        assert!(linearly_independent(&[[big, 0, 0, 0], [0, big, 0, 0], [0, 0, big, 0]]));
        let (max, min) = (i32::MAX, i32::MIN);
        assert!(linearly_independent(&[[max, min, 0, 0], [min, min, 0, 0], [0, 0, max, 0]]));
        assert!(!linearly_independent(&[[min, 0, 0, 0], [max, 0, 0, 0], [0, min, 0, 0]]));

        let mut scaled = Mat4::identity();
        for i in 0..NDIMS {
            scaled.0[i][i] = big;
        }
        assert_eq!(scaled.det(), i32::MAX);
        scaled.0[0][0] = -big;
        assert_eq!(scaled.det(), i32::MIN);
    }
}
