use assert2::assert as fancy_assert;
use lltri_core::{
    inverse::{invert_lower_triangular_in_place, SingularMatrixError},
    Diag, MatMut, MatRef, Parallelism, RealField,
};
use reborrow::*;

// overwrites the lower triangular `x` with the lower triangular part of `x.transpose() × x`
fn gram_lower_in_place<T: RealField>(x: MatMut<'_, T>) {
    let mut x = x;
    let n = x.nrows();

    // entry (i, j) reads rows `i..` of columns `i` and `j`, so sweeping from the top left
    // corner never reads an overwritten value
    for i in 0..n {
        for j in 0..=i {
            let mut acc = T::zero();
            for k in i..n {
                acc = acc + x.read(k, i) * x.read(k, j);
            }
            x.write(i, j, acc);
        }
    }
}

/// Computes the lower triangular part of the inverse of a matrix, given its Cholesky
/// decomposition, and stores the result in `cholesky_factor`.
///
/// (L L^T)^-1 = L^-T L^-1
///
/// # Errors
///
/// Returns an error if the factor has a zero on its diagonal, which cannot happen for a factor
/// produced by a successful decomposition.
///
/// # Panics
///
/// Panics if `cholesky_factor` is not a square matrix.
#[track_caller]
pub fn invert_lower_in_place<T: RealField>(
    cholesky_factor: MatMut<'_, T>,
    parallelism: Parallelism,
) -> Result<(), SingularMatrixError> {
    let mut cholesky_factor = cholesky_factor;
    fancy_assert!(cholesky_factor.nrows() == cholesky_factor.ncols());
    invert_lower_triangular_in_place(cholesky_factor.rb_mut(), Diag::NonUnit, parallelism)?;
    gram_lower_in_place(cholesky_factor);
    Ok(())
}

/// Computes the lower triangular part of the inverse of a matrix, given its Cholesky
/// decomposition, and stores the result in `dst`.
///
/// # Panics
///
/// - Panics if `cholesky_factor` is not a square matrix.
/// - Panics if the destination shape doesn't match the shape of the matrix.
#[track_caller]
pub fn invert_lower_to<T: RealField>(
    dst: MatMut<'_, T>,
    cholesky_factor: MatRef<'_, T>,
    parallelism: Parallelism,
) -> Result<(), SingularMatrixError> {
    let mut dst = dst;
    fancy_assert!(cholesky_factor.nrows() == cholesky_factor.ncols());
    fancy_assert!((dst.nrows(), dst.ncols()) == (cholesky_factor.nrows(), cholesky_factor.ncols()));
    dst.copy_lower_from(cholesky_factor, Diag::NonUnit);
    invert_lower_in_place(dst, parallelism)
}
