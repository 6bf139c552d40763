//! The Cholesky decomposition of a symmetric positive definite matrix $A$ is such that:
//! $$A = LL^T,$$
//! where $L$ is a lower triangular matrix.

/// Computing the decomposition.
pub mod compute;
/// Reconstructing the inverse of the original matrix from the decomposition.
pub mod inverse;
/// Reconstructing the original matrix from the decomposition.
pub mod reconstruct;
/// Solving a linear system using the decomposition.
pub mod solve;

/// This error signifies that the LLT decomposition could not be computed due to the matrix not
/// being numerically positive definite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CholeskyError {
    /// The dimension of the first square non positive-definite top-left corner of the input
    /// matrix.
    pub non_positive_definite_minor: usize,
}

impl core::fmt::Display for CholeskyError {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for CholeskyError {}

#[cfg(test)]
mod tests {
    use super::{compute::*, inverse::*, reconstruct::*, solve::*};
    use assert_approx_eq::assert_approx_eq;
    use lltri_core::{mat, mul::matmul, Layout, Mat, MatMut, MatRef, Parallelism};

    type E = f64;

    fn reconstruct_matrix(cholesky_factor: MatRef<'_, E>) -> Mat<E> {
        let n = cholesky_factor.nrows();

        let mut a_reconstructed = Mat::zeros(n, n);
        reconstruct_lower_to(
            a_reconstructed.as_mut(),
            cholesky_factor,
            Parallelism::Rayon(0),
        );

        a_reconstructed
    }

    fn random_positive_definite(n: usize) -> Mat<E> {
        let a = Mat::from_fn(n, n, |_, _| rand::random::<E>());
        let mut ata = Mat::zeros(n, n);

        matmul(
            ata.as_mut(),
            a.as_ref().transpose(),
            a.as_ref(),
            None,
            1.0,
            Parallelism::Rayon(8),
        );

        // keeps the condition number small enough for tight tolerances
        for i in 0..n {
            ata[(i, i)] += n as E;
        }

        ata
    }

    fn symmetrize_from_lower(a: &mut Mat<E>) {
        let n = a.nrows();
        for j in 0..n {
            for i in 0..j {
                a[(i, j)] = a[(j, i)];
            }
        }
    }

    fn lower_part(a: &Mat<E>) -> Mat<E> {
        Mat::from_fn(a.nrows(), a.ncols(), |i, j| if j <= i { a[(i, j)] } else { 0.0 })
    }

    fn factor(a: &mut Mat<E>, parallelism: Parallelism) {
        cholesky_in_place(a.as_mut(), Default::default(), parallelism, Default::default())
            .unwrap();
    }

    #[test]
    fn test_roundtrip() {
        for n in (0..32).chain((2..10).map(|i| i * 16)) {
            let mut a = random_positive_definite(n);
            let a_orig = a.clone();
            factor(&mut a, Parallelism::Rayon(8));
            let mut a_reconstructed = reconstruct_matrix(a.as_ref());
            let mut inv = Mat::zeros(n, n);
            invert_lower_to(inv.as_mut(), a.as_ref(), Parallelism::Rayon(0)).unwrap();

            symmetrize_from_lower(&mut a_reconstructed);
            symmetrize_from_lower(&mut inv);

            let mut prod = Mat::zeros(n, n);
            matmul(
                prod.as_mut(),
                a_reconstructed.as_ref(),
                inv.as_ref(),
                None,
                1.0,
                Parallelism::Rayon(0),
            );

            for j in 0..n {
                for i in j..n {
                    assert_approx_eq!(a_reconstructed[(i, j)], a_orig[(i, j)], 1e-9);
                }
            }

            for j in 0..n {
                for i in 0..n {
                    let target = if i == j { 1.0 } else { 0.0 };
                    assert_approx_eq!(prod[(i, j)], target, 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_upper_triangle_is_not_accessed() {
        for n in [1, 5, 40, 200] {
            let a = random_positive_definite(n);
            let mut lower_only =
                Mat::from_fn(n, n, |i, j| if j <= i { a[(i, j)] } else { f64::NAN });
            factor(&mut lower_only, Parallelism::Rayon(0));

            for i in 0..n {
                for j in 0..n {
                    if j > i {
                        assert!(lower_only[(i, j)].is_nan());
                    } else {
                        assert!(lower_only[(i, j)].is_finite());
                    }
                }
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        for n in [1, 17, 129, 300] {
            let a = random_positive_definite(n);

            let mut seq = a.clone();
            factor(&mut seq, Parallelism::None);

            let mut par = a.clone();
            cholesky_in_place(
                par.as_mut(),
                Default::default(),
                Parallelism::Rayon(4),
                LltParams { par_threshold: 8 },
            )
            .unwrap();

            // every entry is computed by the same sequence of operations
            assert_eq!(seq, par);
        }
    }

    #[test]
    fn test_compare_with_nalgebra() {
        for n in [1, 4, 33, 100] {
            let a = random_positive_definite(n);
            let na = nalgebra::DMatrix::from_fn(n, n, |i, j| a[(i, j)]);
            let expected = nalgebra::Cholesky::new(na).unwrap().l();

            let mut l = a.clone();
            factor(&mut l, Parallelism::None);

            for i in 0..n {
                for j in 0..=i {
                    assert_approx_eq!(l[(i, j)], expected[(i, j)], 1e-10);
                }
            }
        }
    }

    #[test]
    fn test_not_positive_definite() {
        let mut a = mat![[1.0, 2.0], [2.0, 1.0]];
        let err = cholesky_in_place(
            a.as_mut(),
            Default::default(),
            Parallelism::None,
            Default::default(),
        )
        .unwrap_err();
        assert_eq!(err.non_positive_definite_minor, 2);
        // the first column is already factored
        assert_eq!(a[(0, 0)], 1.0);
        assert_eq!(a[(1, 0)], 2.0);

        let mut a = mat![[-1.0]];
        let err = cholesky_in_place(
            a.as_mut(),
            Default::default(),
            Parallelism::None,
            Default::default(),
        )
        .unwrap_err();
        assert_eq!(err.non_positive_definite_minor, 1);

        let mut a = mat![[0.0]];
        assert!(cholesky_in_place(
            a.as_mut(),
            Default::default(),
            Parallelism::None,
            Default::default()
        )
        .is_err());

        let mut a = mat![[f64::NAN]];
        assert!(cholesky_in_place(
            a.as_mut(),
            Default::default(),
            Parallelism::None,
            Default::default()
        )
        .is_err());
    }

    #[test]
    fn test_failing_minor_in_large_matrix() {
        for n in [10, 150] {
            for k in [0, 3, n / 2, n - 1] {
                let mut a = random_positive_definite(n);
                // makes the leading minor of order k + 1 singular
                for j in 0..n {
                    if j != k {
                        a[(k, j)] = 0.0;
                        a[(j, k)] = 0.0;
                    }
                }
                a[(k, k)] = -1.0;

                for parallelism in [Parallelism::None, Parallelism::Rayon(0)] {
                    let mut l = a.clone();
                    let err = cholesky_in_place(
                        l.as_mut(),
                        Default::default(),
                        parallelism,
                        LltParams { par_threshold: 4 },
                    )
                    .unwrap_err();
                    assert_eq!(err.non_positive_definite_minor, k + 1);
                }
            }
        }
    }

    #[test]
    fn test_zero_dimension() {
        let mut a = Mat::<f64>::new();
        let info = cholesky_in_place(
            a.as_mut(),
            Default::default(),
            Parallelism::None,
            Default::default(),
        )
        .unwrap();
        assert_eq!(info.dynamic_regularization_count, 0);
    }

    #[test]
    fn test_regularization() {
        let mut a: Mat<f64> = mat![[1.0, 1.0], [1.0, 1.0]];
        let info = cholesky_in_place(
            a.as_mut(),
            LltRegularization {
                dynamic_regularization_delta: 1e-4,
                dynamic_regularization_epsilon: 1e-8,
            },
            Parallelism::None,
            Default::default(),
        )
        .unwrap();
        assert_eq!(info.dynamic_regularization_count, 1);
        assert_approx_eq!(a[(1, 1)], 1e-2, 1e-12);

        // negative pivots are never regularized
        let mut a = mat![[1.0, 2.0], [2.0, 1.0]];
        let err = cholesky_in_place(
            a.as_mut(),
            LltRegularization {
                dynamic_regularization_delta: 1e-4,
                dynamic_regularization_epsilon: 1e-8,
            },
            Parallelism::None,
            Default::default(),
        )
        .unwrap_err();
        assert_eq!(err.non_positive_definite_minor, 2);
    }

    #[test]
    fn test_upper() {
        for n in [0, 3, 50] {
            let a = random_positive_definite(n);
            let mut u = a.clone();
            cholesky_upper_in_place(
                u.as_mut(),
                Default::default(),
                Parallelism::Rayon(0),
                Default::default(),
            )
            .unwrap();

            let u = Mat::from_fn(n, n, |i, j| if j >= i { u[(i, j)] } else { 0.0 });
            let mut utu = Mat::zeros(n, n);
            matmul(
                utu.as_mut(),
                u.as_ref().transpose(),
                u.as_ref(),
                None,
                1.0,
                Parallelism::None,
            );
            for i in 0..n {
                for j in 0..n {
                    assert_approx_eq!(utu[(i, j)], a[(i, j)], 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_column_major_with_padding() {
        let n = 20;
        let lda = 23;
        let a = random_positive_definite(n);
        let mut buf = vec![-7.0; lda * n];
        for j in 0..n {
            for i in 0..n {
                buf[i + j * lda] = a[(i, j)];
            }
        }

        cholesky_in_place(
            MatMut::from_slice_mut(&mut buf, n, n, Layout::ColMajor, lda),
            Default::default(),
            Parallelism::None,
            Default::default(),
        )
        .unwrap();

        let mut expected = a.clone();
        factor(&mut expected, Parallelism::None);
        for j in 0..n {
            for i in 0..n {
                if i >= j {
                    assert_approx_eq!(buf[i + j * lda], expected[(i, j)], 1e-12);
                } else {
                    assert_eq!(buf[i + j * lda], a[(i, j)]);
                }
            }
            for pad in n..lda {
                assert_eq!(buf[pad + j * lda], -7.0);
            }
        }
    }

    #[test]
    fn test_solve() {
        for n in 0..20 {
            let a = random_positive_definite(n);
            let mut l = a.clone();
            factor(&mut l, Parallelism::None);

            let rhs = Mat::from_fn(n, 3, |_, _| rand::random::<E>());
            let mut sol = rhs.clone();
            solve_in_place(l.as_ref(), sol.as_mut(), Parallelism::Rayon(0));

            let mut full = a.clone();
            symmetrize_from_lower(&mut full);
            let mut result = Mat::zeros(n, 3);
            matmul(
                result.as_mut(),
                full.as_ref(),
                sol.as_ref(),
                None,
                1.0,
                Parallelism::None,
            );

            for i in 0..n {
                for j in 0..3 {
                    assert_approx_eq!(result[(i, j)], rhs[(i, j)], 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_invert_factor_then_compose() {
        // (L^-1)^T × L^-1 × A == I
        for n in [0, 1, 6, 64, 120] {
            let a = random_positive_definite(n);
            let mut l = a.clone();
            factor(&mut l, Parallelism::None);

            let mut linv = lower_part(&l);
            lltri_core::inverse::invert_lower_triangular_in_place(
                linv.as_mut(),
                lltri_core::Diag::NonUnit,
                Parallelism::Rayon(0),
            )
            .unwrap();

            let mut ainv = Mat::zeros(n, n);
            matmul(
                ainv.as_mut(),
                linv.as_ref().transpose(),
                linv.as_ref(),
                None,
                1.0,
                Parallelism::None,
            );

            let mut full = a.clone();
            symmetrize_from_lower(&mut full);
            let mut prod = Mat::zeros(n, n);
            matmul(
                prod.as_mut(),
                ainv.as_ref(),
                full.as_ref(),
                None,
                1.0,
                Parallelism::None,
            );
            for i in 0..n {
                for j in 0..n {
                    let target = if i == j { 1.0 } else { 0.0 };
                    assert_approx_eq!(prod[(i, j)], target, 1e-9);
                }
            }

            // the in-place inverse agrees with the explicit product
            let mut inv = l.clone();
            invert_lower_in_place(inv.as_mut(), Parallelism::None).unwrap();
            for i in 0..n {
                for j in 0..=i {
                    assert_approx_eq!(inv[(i, j)], ainv[(i, j)], 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_reconstruct_in_place() {
        for n in [0, 1, 9, 70] {
            let a = random_positive_definite(n);
            let mut l = a.clone();
            factor(&mut l, Parallelism::None);
            reconstruct_lower_in_place(l.as_mut());
            for i in 0..n {
                for j in 0..=i {
                    assert_approx_eq!(l[(i, j)], a[(i, j)], 1e-9);
                }
            }
        }
    }
}
