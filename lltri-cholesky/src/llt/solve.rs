use assert2::assert as fancy_assert;
use lltri_core::{solve, Diag, MatMut, MatRef, Parallelism, RealField};
use reborrow::*;

/// Computes the solution of `A×X = rhs`, given the Cholesky factor of `A`, and stores the
/// result in `rhs`.
///
/// The strictly upper triangular part of `cholesky_factor` is not accessed.
///
/// # Panics
///
/// - Panics if `cholesky_factor` is not a square matrix.
/// - Panics if `rhs.nrows() != cholesky_factor.nrows()`.
#[track_caller]
pub fn solve_in_place<T: RealField>(
    cholesky_factor: MatRef<'_, T>,
    rhs: MatMut<'_, T>,
    parallelism: Parallelism,
) {
    let n = cholesky_factor.nrows();

    fancy_assert!(cholesky_factor.nrows() == cholesky_factor.ncols());
    fancy_assert!(rhs.nrows() == n);

    let mut rhs = rhs;

    solve::solve_lower_triangular_in_place(
        cholesky_factor,
        Diag::NonUnit,
        rhs.rb_mut(),
        parallelism,
    );

    solve::solve_upper_triangular_in_place(
        cholesky_factor.transpose(),
        Diag::NonUnit,
        rhs.rb_mut(),
        parallelism,
    );
}
