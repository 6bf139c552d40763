//! Triangular matrix inversion.

use crate::{
    join_raw,
    mul::triangular::{mul_lower_left_in_place, mul_lower_right_in_place},
    Diag, MatMut, MatRef, Parallelism, RealField,
};
use assert2::assert as fancy_assert;
use reborrow::*;

/// Blocks at most this large are inverted row by row instead of being split.
const RECURSION_THRESHOLD: usize = 48;

/// This error signifies that a triangular matrix could not be inverted because one of its
/// diagonal entries is exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingularMatrixError {
    /// The 1-based index of the first zero diagonal entry.
    pub zero_diagonal: usize,
}

impl core::fmt::Display for SingularMatrixError {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for SingularMatrixError {}

fn first_zero_diagonal<T: RealField>(mat: MatRef<'_, T>) -> Option<usize> {
    (0..mat.nrows()).find(|&i| mat.read(i, i) == T::zero())
}

// row `i` of the inverse only depends on row `i` of the input and on rows `..i` of the inverse
fn invert_lower_triangular_rows<T: RealField>(mat: MatMut<'_, T>, diag: Diag) {
    let mut mat = mat;
    let n = mat.nrows();

    for i in 0..n {
        let inv_diag = match diag {
            Diag::NonUnit => {
                let inv = mat.read(i, i).recip();
                mat.write(i, i, inv);
                inv
            }
            Diag::Unit => T::one(),
        };

        for j in 0..i {
            let mut acc = match diag {
                Diag::NonUnit => mat.read(i, j) * mat.read(j, j),
                Diag::Unit => mat.read(i, j),
            };
            for k in j + 1..i {
                acc = acc + mat.read(i, k) * mat.read(k, j);
            }
            mat.write(i, j, -(acc * inv_diag));
        }
    }
}

fn invert_lower_triangular_impl<T: RealField>(
    mat: MatMut<'_, T>,
    diag: Diag,
    parallelism: Parallelism,
) {
    let n = mat.nrows();
    if n <= RECURSION_THRESHOLD {
        invert_lower_triangular_rows(mat, diag);
        return;
    }

    //      A 0          A^-1              0
    //      B C    ->   -C^-1 × B × A^-1   C^-1
    let bs = n / 2;
    let (mut tl, _, mut bl, mut br) = mat.split_at(bs, bs);

    join_raw(
        |parallelism| invert_lower_triangular_impl(tl.rb_mut(), diag, parallelism),
        |parallelism| invert_lower_triangular_impl(br.rb_mut(), diag, parallelism),
        parallelism,
    );

    mul_lower_right_in_place(bl.rb_mut(), tl.rb(), diag, T::one(), parallelism);
    mul_lower_left_in_place(br.rb(), bl.rb_mut(), diag, -T::one(), parallelism);
}

/// Computes the inverse of the lower triangular matrix `mat` and stores its lower triangular
/// part back in `mat`. The strictly upper triangular part is not accessed.
///
/// If `diag` is [`Diag::Unit`], the diagonal is implicitly one and is neither read nor written.
///
/// # Errors
///
/// If a diagonal entry is exactly zero, returns the 1-based index of the first one. In that
/// case the rows before it hold the inverse of the leading block, and the remaining rows are
/// left in an unspecified state.
///
/// # Panics
///
/// Panics if `mat` is not square.
///
/// # Example
///
/// ```
/// use lltri_core::{inverse::invert_lower_triangular_in_place, mat, Diag, Parallelism};
///
/// let mut l = mat![[2.0, 0.0], [1.0, 4.0]];
/// invert_lower_triangular_in_place(l.as_mut(), Diag::NonUnit, Parallelism::None).unwrap();
///
/// assert_eq!(l[(0, 0)], 0.5);
/// assert_eq!(l[(1, 1)], 0.25);
/// assert_eq!(l[(1, 0)], -0.125);
/// ```
#[track_caller]
pub fn invert_lower_triangular_in_place<T: RealField>(
    mat: MatMut<'_, T>,
    diag: Diag,
    parallelism: Parallelism,
) -> Result<(), SingularMatrixError> {
    fancy_assert!(
        mat.nrows() == mat.ncols(),
        "only square matrices can be inverted"
    );

    if diag == Diag::NonUnit {
        if let Some(k) = first_zero_diagonal(mat.rb()) {
            let (leading, _, _, _) = mat.split_at(k, k);
            invert_lower_triangular_rows(leading, diag);
            return Err(SingularMatrixError {
                zero_diagonal: k + 1,
            });
        }
    }

    invert_lower_triangular_impl(mat, diag, parallelism);
    Ok(())
}

/// Computes the inverse of the upper triangular matrix `mat` and stores its upper triangular
/// part back in `mat`. The strictly lower triangular part is not accessed.
///
/// Errors and panics are the same as [`invert_lower_triangular_in_place`], with the diagonal
/// indexed in the same order.
#[track_caller]
#[inline]
pub fn invert_upper_triangular_in_place<T: RealField>(
    mat: MatMut<'_, T>,
    diag: Diag,
    parallelism: Parallelism,
) -> Result<(), SingularMatrixError> {
    invert_lower_triangular_in_place(mat.transpose(), diag, parallelism)
}

/// Computes the inverse of the lower triangular matrix `src` and stores its lower triangular
/// part in `dst`. The strictly upper triangular parts of `src` and `dst` are not accessed.
///
/// # Panics
///
/// Panics if `src` and `dst` have mismatching dimensions, or if they are not square.
#[track_caller]
pub fn invert_lower_triangular_to<T: RealField>(
    dst: MatMut<'_, T>,
    src: MatRef<'_, T>,
    diag: Diag,
    parallelism: Parallelism,
) -> Result<(), SingularMatrixError> {
    let mut dst = dst;
    fancy_assert!(dst.nrows() == src.nrows());
    fancy_assert!(dst.ncols() == src.ncols());
    dst.copy_lower_from(src, diag);
    invert_lower_triangular_in_place(dst, diag, parallelism)
}

/// Computes the inverse of the upper triangular matrix `src` and stores its upper triangular
/// part in `dst`. The strictly lower triangular parts of `src` and `dst` are not accessed.
///
/// # Panics
///
/// Panics if `src` and `dst` have mismatching dimensions, or if they are not square.
#[track_caller]
#[inline]
pub fn invert_upper_triangular_to<T: RealField>(
    dst: MatMut<'_, T>,
    src: MatRef<'_, T>,
    diag: Diag,
    parallelism: Parallelism,
) -> Result<(), SingularMatrixError> {
    invert_lower_triangular_to(dst.transpose(), src.transpose(), diag, parallelism)
}
