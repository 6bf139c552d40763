use assert2::assert as fancy_assert;
use lltri_core::{join_raw, parallelism_degree, MatMut, MatRef, Parallelism, RealField};
use reborrow::*;

// rows of `dst` are rows `row_offset..` of the product
fn reconstruct_lower_rows<T: RealField>(
    dst: MatMut<'_, T>,
    row_offset: usize,
    cholesky_factor: MatRef<'_, T>,
    parallelism: Parallelism,
) {
    let mut dst = dst;
    let m = dst.nrows();

    if m > 64 && parallelism_degree(parallelism) > 1 {
        let (mut top, mut bottom) = dst.split_at_row(m / 2);
        join_raw(
            |parallelism| {
                reconstruct_lower_rows(top.rb_mut(), row_offset, cholesky_factor, parallelism)
            },
            |parallelism| {
                reconstruct_lower_rows(
                    bottom.rb_mut(),
                    row_offset + m / 2,
                    cholesky_factor,
                    parallelism,
                )
            },
            parallelism,
        );
        return;
    }

    for r in 0..m {
        let i = row_offset + r;
        for j in 0..=i {
            let mut acc = T::zero();
            for k in 0..=j {
                acc = acc + cholesky_factor.read(i, k) * cholesky_factor.read(j, k);
            }
            dst.write(r, j, acc);
        }
    }
}

/// Computes the lower triangular part of the reconstructed matrix, given its Cholesky
/// decomposition, and stores the result in `dst`.
///
/// The strictly upper triangular parts of `dst` and `cholesky_factor` are not accessed.
///
/// # Panics
///
/// - Panics if `cholesky_factor` is not a square matrix.
/// - Panics if the destination shape doesn't match the shape of the matrix.
#[track_caller]
pub fn reconstruct_lower_to<T: RealField>(
    dst: MatMut<'_, T>,
    cholesky_factor: MatRef<'_, T>,
    parallelism: Parallelism,
) {
    fancy_assert!(cholesky_factor.nrows() == cholesky_factor.ncols());
    fancy_assert!((dst.nrows(), dst.ncols()) == (cholesky_factor.nrows(), cholesky_factor.ncols()));
    reconstruct_lower_rows(dst, 0, cholesky_factor, parallelism);
}

/// Computes the lower triangular part of the reconstructed matrix, given its Cholesky
/// decomposition, and stores the result in `cholesky_factor`.
///
/// # Panics
///
/// Panics if `cholesky_factor` is not a square matrix.
#[track_caller]
pub fn reconstruct_lower_in_place<T: RealField>(cholesky_factor: MatMut<'_, T>) {
    let mut l = cholesky_factor;
    fancy_assert!(l.nrows() == l.ncols());
    let n = l.nrows();

    // entry (i, j) reads rows `i` and `j` up to column `j`, so sweeping from the bottom right
    // corner never reads an overwritten value
    for i in (0..n).rev() {
        for j in (0..=i).rev() {
            let mut acc = T::zero();
            for k in 0..=j {
                acc = acc + l.read(i, k) * l.read(j, k);
            }
            l.write(i, j, acc);
        }
    }
}
