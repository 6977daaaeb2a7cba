//! The hyperoctahedral group: every signed permutation of the four axes
//!
//! 4! permutations times 2^4 sign patterns gives 384 members, half of them
//! rotations (det +1) and half reflections (det -1).

use crate::geometry::{Mat4, NDIMS};
use once_cell::sync::Lazy;

pub const GROUP_ORDER: usize = 384;

static HYPEROCTAHEDRAL: Lazy<Vec<Mat4>> = Lazy::new(|| {
    let mut group = Vec::with_capacity(GROUP_ORDER);
    for perm in permutations() {
        for bits in 0..(1u32 << NDIMS) {
            let mut signs = [1; NDIMS];
            for (axis, s) in signs.iter_mut().enumerate() {
                if bits & (1 << axis) != 0 {
                    *s = -1;
                }
            }
            group.push(Mat4::signed_permutation(perm, signs));
        }
    }
    tracing::debug!(order = group.len(), "built 4d symmetry group");
    group
});

/// All signed 4x4 permutation matrices, computed once per process.
pub fn hyperoctahedral_group() -> &'static [Mat4] {
    &HYPEROCTAHEDRAL
}

/// Only the orientation-preserving half of the group.
pub fn rotations() -> impl Iterator<Item = &'static Mat4> {
    hyperoctahedral_group().iter().filter(|m| m.det() == 1)
}

fn permutations() -> Vec<[usize; NDIMS]> {
    let mut out = Vec::with_capacity(24);
    let mut current = [0usize; NDIMS];
    let mut used = [false; NDIMS];
    permute(0, &mut current, &mut used, &mut out);
    out
}

fn permute(
    depth: usize,
    current: &mut [usize; NDIMS],
    used: &mut [bool; NDIMS],
    out: &mut Vec<[usize; NDIMS]>,
) {
    if depth == NDIMS {
        out.push(*current);
        return;
    }
    for axis in 0..NDIMS {
        if used[axis] {
            continue;
        }
        used[axis] = true;
        current[depth] = axis;
        permute(depth + 1, current, used, out);
        used[axis] = false;
    }
}
