//! Flat buffer entry points shaped after LAPACK's `potrf` and `trtri`.

use crate::Error;
use lltri_cholesky::llt::compute::{
    cholesky_in_place, cholesky_upper_in_place, LltInfo, LltParams, LltRegularization,
};
use lltri_core::{
    inverse::{invert_lower_triangular_in_place, invert_upper_triangular_in_place},
    Diag, Layout, MatMut, Parallelism, RealField, Uplo,
};

#[inline]
fn invalid(position: usize, reason: &'static str) -> Error {
    Error::InvalidArgument { position, reason }
}

// checks `lda` then the buffer length, and builds the view over the buffer
fn square_view<'a, T>(
    a: &'a mut [T],
    n: usize,
    layout: Layout,
    lda: usize,
    a_position: usize,
) -> Result<MatMut<'a, T>, Error> {
    if lda < n.max(1) {
        return Err(invalid(
            a_position + 1,
            "leading dimension is smaller than max(1, n)",
        ));
    }
    let required = match n {
        0 => Some(0),
        n => (n - 1).checked_mul(lda).and_then(|len| len.checked_add(n)),
    };
    match required {
        Some(required) if a.len() >= required => {
            Ok(MatMut::from_slice_mut(a, n, n, layout, lda))
        }
        _ => Err(invalid(a_position, "buffer is too short for an n by n matrix")),
    }
}

/// Computes the Cholesky factorization of the symmetric positive definite `n×n` matrix stored in
/// `a`, with the given layout and leading dimension.
///
/// With [`Uplo::Lower`], only the lower triangle is read and it is overwritten with `L` such that
/// `A = L×L^T`. With [`Uplo::Upper`], only the upper triangle is read and it is overwritten with
/// `U` such that `A = U^T×U`. The other triangle is never accessed.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] with position `5` if `lda < max(1, n)`, or position `4` if `a`
///   cannot hold the matrix. Nothing is written in that case.
/// - [`Error::NotPositiveDefinite`] with the order of the first leading minor that is not
///   positive definite. The factor columns (rows for [`Uplo::Upper`]) before it are valid.
pub fn potrf<T: RealField>(
    layout: Layout,
    uplo: Uplo,
    n: usize,
    a: &mut [T],
    lda: usize,
    parallelism: Parallelism,
) -> Result<LltInfo, Error> {
    let matrix = square_view(a, n, layout, lda, 4)?;
    let regularization = LltRegularization::default();
    let params = LltParams::default();
    let info = match uplo {
        Uplo::Lower => cholesky_in_place(matrix, regularization, parallelism, params)?,
        Uplo::Upper => cholesky_upper_in_place(matrix, regularization, parallelism, params)?,
    };
    Ok(info)
}

/// Computes the inverse of the `n×n` triangular matrix stored in `a` in place, with the given
/// layout and leading dimension.
///
/// Only the triangle selected by `uplo` is accessed. With [`Diag::Unit`], the diagonal is
/// implicitly one and is neither read nor written.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] with position `6` if `lda < max(1, n)`, or position `5` if `a`
///   cannot hold the matrix. Nothing is written in that case.
/// - [`Error::SingularMatrix`] with the index of the first zero diagonal entry. The leading block
///   before it holds its inverse.
pub fn trtri<T: RealField>(
    layout: Layout,
    uplo: Uplo,
    diag: Diag,
    n: usize,
    a: &mut [T],
    lda: usize,
    parallelism: Parallelism,
) -> Result<(), Error> {
    let matrix = square_view(a, n, layout, lda, 5)?;
    match uplo {
        Uplo::Lower => invert_lower_triangular_in_place(matrix, diag, parallelism)?,
        Uplo::Upper => invert_upper_triangular_in_place(matrix, diag, parallelism)?,
    }
    Ok(())
}

fn dense_row_major(n: usize, a: &mut [f64]) -> Result<MatMut<'_, f64>, Error> {
    match n.checked_mul(n) {
        Some(len) if len == a.len() => Ok(MatMut::from_row_major_slice_mut(a, n, n)),
        _ => Err(invalid(2, "buffer length is not n * n")),
    }
}

/// Overwrites the lower triangle of the row-major `n×n` matrix `a` with its Cholesky factor.
///
/// The strictly upper triangle is neither read nor written.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] with position `2` if `a.len() != n * n`.
/// - [`Error::NotPositiveDefinite`] with the order of the first failing leading minor.
pub fn cholesky(n: usize, a: &mut [f64]) -> Result<(), Error> {
    let matrix = dense_row_major(n, a)?;
    cholesky_in_place(
        matrix,
        LltRegularization::default(),
        Parallelism::None,
        LltParams::default(),
    )?;
    Ok(())
}

/// Overwrites the lower triangle of the row-major `n×n` matrix `a` with the inverse of the lower
/// triangular matrix it holds.
///
/// The strictly upper triangle is neither read nor written.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] with position `2` if `a.len() != n * n`.
/// - [`Error::SingularMatrix`] with the 1-based index of the first zero diagonal entry.
pub fn triinv(n: usize, a: &mut [f64]) -> Result<(), Error> {
    let matrix = dense_row_major(n, a)?;
    invert_lower_triangular_in_place(matrix, Diag::NonUnit, Parallelism::None)?;
    Ok(())
}

/// Returns the LAPACK `info` value of a call: `0` on success, see [`Error::status`] otherwise.
#[inline]
pub fn status<T>(result: &Result<T, Error>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => err.status(),
    }
}
