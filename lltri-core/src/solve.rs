//! Triangular solve module.

use crate::{join_raw, parallelism_degree, Diag, MatMut, MatRef, Parallelism, RealField};
use assert2::assert as fancy_assert;
use reborrow::*;

// below this many scalar multiply-adds, a task is not split further
const PAR_THRESHOLD: usize = 64 * 64 * 32;

fn solve_lower_triangular_impl<T: RealField>(
    tril: MatRef<'_, T>,
    diag: Diag,
    rhs: MatMut<'_, T>,
    parallelism: Parallelism,
) {
    let mut rhs = rhs;
    let n = tril.nrows();
    let k = rhs.ncols();

    if k > 1 && n * n * k / 2 > PAR_THRESHOLD && parallelism_degree(parallelism) > 1 {
        let (mut left, mut right) = rhs.split_at_col(k / 2);
        join_raw(
            |parallelism| solve_lower_triangular_impl(tril, diag, left.rb_mut(), parallelism),
            |parallelism| solve_lower_triangular_impl(tril, diag, right.rb_mut(), parallelism),
            parallelism,
        );
        return;
    }

    for j in 0..k {
        for i in 0..n {
            let mut acc = rhs.read(i, j);
            for p in 0..i {
                acc = acc - tril.read(i, p) * rhs.read(p, j);
            }
            let x = match diag {
                Diag::NonUnit => acc / tril.read(i, i),
                Diag::Unit => acc,
            };
            rhs.write(i, j, x);
        }
    }
}

/// Computes the solution of `Op_lhs(triangular_lower)×X = rhs`, and stores the result in
/// `rhs`.
///
/// `triangular_lower` is interpreted as a lower triangular matrix (diagonal included, unless
/// `diag` is [`Diag::Unit`]). Its strictly upper triangular part is not accessed.
///
/// A zero on the diagonal produces non-finite values rather than an error.
///
/// # Panics
///
///  - Panics if `triangular_lower` is not a square matrix.
///  - Panics if `rhs.nrows() != triangular_lower.ncols()`
#[track_caller]
#[inline]
pub fn solve_lower_triangular_in_place<T: RealField>(
    triangular_lower: MatRef<'_, T>,
    diag: Diag,
    rhs: MatMut<'_, T>,
    parallelism: Parallelism,
) {
    fancy_assert!(triangular_lower.nrows() == triangular_lower.ncols());
    fancy_assert!(rhs.nrows() == triangular_lower.ncols());
    solve_lower_triangular_impl(triangular_lower, diag, rhs, parallelism);
}

/// Computes the solution of `Op_lhs(triangular_upper)×X = rhs`, and stores the result in
/// `rhs`.
///
/// `triangular_upper` is interpreted as an upper triangular matrix (diagonal included, unless
/// `diag` is [`Diag::Unit`]). Its strictly lower triangular part is not accessed.
///
/// # Panics
///
///  - Panics if `triangular_upper` is not a square matrix.
///  - Panics if `rhs.nrows() != triangular_upper.ncols()`
#[track_caller]
#[inline]
pub fn solve_upper_triangular_in_place<T: RealField>(
    triangular_upper: MatRef<'_, T>,
    diag: Diag,
    rhs: MatMut<'_, T>,
    parallelism: Parallelism,
) {
    solve_lower_triangular_in_place(
        triangular_upper.reverse_rows_and_cols(),
        diag,
        rhs.reverse_rows(),
        parallelism,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mul::matmul, Mat};
    use assert_approx_eq::assert_approx_eq;
    use rand::random;

    fn triangular(n: usize, lower: bool, diag: Diag) -> Mat<f64> {
        Mat::from_fn(n, n, |i, j| {
            if i == j {
                match diag {
                    Diag::NonUnit => 2.0 + random::<f64>(),
                    Diag::Unit => 1.0,
                }
            } else if (j < i) == lower {
                random::<f64>() / n as f64
            } else {
                0.0
            }
        })
    }

    #[test]
    fn test_solve_lower_and_upper() {
        for n in [0, 1, 2, 7, 32, 100] {
            for diag in [Diag::NonUnit, Diag::Unit] {
                for lower in [true, false] {
                    let tri = triangular(n, lower, diag);
                    let rhs = Mat::from_fn(n, 9, |_, _| random::<f64>());

                    let mut sol = rhs.clone();
                    for parallelism in [Parallelism::None, Parallelism::Rayon(0)] {
                        sol.as_mut().copy_from(rhs.as_ref());
                        if lower {
                            solve_lower_triangular_in_place(
                                tri.as_ref(),
                                diag,
                                sol.as_mut(),
                                parallelism,
                            );
                        } else {
                            solve_upper_triangular_in_place(
                                tri.as_ref(),
                                diag,
                                sol.as_mut(),
                                parallelism,
                            );
                        }

                        let mut prod = Mat::zeros(n, 9);
                        matmul(
                            prod.as_mut(),
                            tri.as_ref(),
                            sol.as_ref(),
                            None,
                            1.0,
                            Parallelism::None,
                        );
                        for i in 0..n {
                            for j in 0..9 {
                                assert_approx_eq!(prod[(i, j)], rhs[(i, j)], 1e-10);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_unit_diagonal_is_not_read() {
        let tri = crate::mat![[f64::NAN, 0.0], [2.0, f64::NAN]];
        let mut rhs = crate::mat![[1.0], [4.0]];
        solve_lower_triangular_in_place(tri.as_ref(), Diag::Unit, rhs.as_mut(), Parallelism::None);
        assert_eq!(rhs[(0, 0)], 1.0);
        assert_eq!(rhs[(1, 0)], 2.0);
    }
}
