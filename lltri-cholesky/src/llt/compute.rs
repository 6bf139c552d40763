use super::CholeskyError;
use assert2::assert as fancy_assert;
use lltri_core::{
    join_raw, parallelism_degree, Layout, MatMut, MatRef, Parallelism, RealField,
};
use reborrow::*;

/// LLT factorization tuning parameters.
#[derive(Copy, Clone, Debug)]
pub struct LltParams {
    /// Number of rows below which the column update stays on the current thread.
    pub par_threshold: usize,
}

impl Default for LltParams {
    #[inline]
    fn default() -> Self {
        Self { par_threshold: 128 }
    }
}

/// Dynamic LLT regularization.
/// Pivots with a value in `[0, epsilon]` are set to `delta`, as long as `delta` is positive.
/// Negative pivots are never regularized.
#[derive(Copy, Clone, Debug)]
pub struct LltRegularization<T> {
    /// Regularized value.
    pub dynamic_regularization_delta: T,
    /// Regularization threshold.
    pub dynamic_regularization_epsilon: T,
}

impl<T: RealField> Default for LltRegularization<T> {
    fn default() -> Self {
        Self {
            dynamic_regularization_delta: T::zero(),
            dynamic_regularization_epsilon: T::zero(),
        }
    }
}

/// Info about the result of the LLT factorization.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LltInfo {
    /// Number of pivots whose value was replaced by the regularization delta.
    pub dynamic_regularization_count: usize,
}

// the kernel walks rows of the lower triangle, i.e. columns of the upper one
fn layout_warning<T>(matrix: MatRef<'_, T>, preferred: Layout) -> Option<&'static str> {
    match preferred {
        Layout::RowMajor if !matrix.is_row_major() => Some(if matrix.is_col_major() {
            "LLT prefers row-major matrix. Found column-major matrix."
        } else {
            "LLT prefers row-major matrix. Found matrix with generic strides."
        }),
        Layout::ColMajor if !matrix.is_col_major() => Some(if matrix.is_row_major() {
            "Upper LLT prefers column-major matrix. Found row-major matrix."
        } else {
            "Upper LLT prefers column-major matrix. Found matrix with generic strides."
        }),
        _ => None,
    }
}

// A21 -= L20 × L10^T, then A21 /= L11
fn update_column<T: RealField>(
    below: MatMut<'_, T>,
    l10: MatRef<'_, T>,
    l11: T,
    parallelism: Parallelism,
    par_threshold: usize,
) {
    let mut below = below;
    let m = below.nrows();
    let idx = l10.ncols();

    if m > par_threshold.max(1) && parallelism_degree(parallelism) > 1 {
        let (mut top, mut bottom) = below.split_at_row(m / 2);
        join_raw(
            |parallelism| update_column(top.rb_mut(), l10, l11, parallelism, par_threshold),
            |parallelism| update_column(bottom.rb_mut(), l10, l11, parallelism, par_threshold),
            parallelism,
        );
        return;
    }

    for i in 0..m {
        let mut acc = below.read(i, idx);
        for k in 0..idx {
            acc = acc - below.read(i, k) * l10.read(0, k);
        }
        below.write(i, idx, acc / l11);
    }
}

fn cholesky_in_place_impl<T: RealField>(
    matrix: MatMut<'_, T>,
    regularization: LltRegularization<T>,
    parallelism: Parallelism,
    params: LltParams,
) -> Result<usize, CholeskyError> {
    let mut matrix = matrix;
    let n = matrix.nrows();

    let eps = regularization.dynamic_regularization_epsilon.abs();
    let delta = regularization.dynamic_regularization_delta.abs();
    let has_eps = delta > T::zero();
    let mut dynamic_regularization_count = 0usize;

    //
    //      L00
    // A =  L10  A11
    //      L20  A21  A22
    //
    // the first `idx` columns are already computed
    // we now compute A11 and A21
    for idx in 0..n {
        let (top, below) = matrix.rb_mut().split_at_row(idx + 1);
        let (_, mut l10_a11) = top.split_at_row(idx);

        // A11 -= L10 × L10^T
        let mut dot = T::zero();
        for k in 0..idx {
            let l = l10_a11.read(0, k);
            dot = dot + l * l;
        }
        let mut pivot = l10_a11.read(0, idx) - dot;

        if has_eps && pivot >= T::zero() && pivot <= eps {
            pivot = delta;
            dynamic_regularization_count += 1;
        }

        // NaN pivots fail this comparison too
        let l11 = if pivot > T::zero() {
            pivot.sqrt()
        } else {
            return Err(CholeskyError {
                non_positive_definite_minor: idx + 1,
            });
        };
        l10_a11.write(0, idx, l11);

        let l10 = l10_a11.rb().submatrix(0, 0, 1, idx);
        update_column(below, l10, l11, parallelism, params.par_threshold);
    }

    Ok(dynamic_regularization_count)
}

/// Computes the Cholesky factor `L` of the input matrix such that `L` is lower triangular, and
/// `L×L.transpose() == matrix`, then stores it back in the same matrix, or returns an error if the
/// matrix is not positive definite.
///
/// The input matrix is interpreted as symmetric and only the lower triangular part is read.
///
/// The strictly upper triangular part of the matrix is not accessed.
///
/// # Errors
///
/// If the leading minor of order `k` is not positive definite, returns `k`. The first `k - 1`
/// columns then hold the corresponding columns of the factor, and the rest of the lower
/// triangular part is left in an unspecified state.
///
/// # Panics
///
/// Panics if the input matrix is not square.
///
/// # Example
///
/// ```
/// use lltri_cholesky::llt::compute::cholesky_in_place;
/// use lltri_core::{mat, Parallelism};
///
/// let mut a = mat![[4.0, 0.0], [2.0, 10.0]];
/// cholesky_in_place(a.as_mut(), Default::default(), Parallelism::None, Default::default())
///     .unwrap();
///
/// assert_eq!(a[(0, 0)], 2.0);
/// assert_eq!(a[(1, 0)], 1.0);
/// assert_eq!(a[(1, 1)], 3.0);
/// ```
#[track_caller]
pub fn cholesky_in_place<T: RealField>(
    matrix: MatMut<'_, T>,
    regularization: LltRegularization<T>,
    parallelism: Parallelism,
    params: LltParams,
) -> Result<LltInfo, CholeskyError> {
    fancy_assert!(
        matrix.ncols() == matrix.nrows(),
        "only square matrices can be decomposed into cholesky factors",
    );

    if let Some(message) = layout_warning(matrix.rb(), Layout::RowMajor) {
        log::warn!(target: "lltri_perf", "{message}");
    }

    let dynamic_regularization_count =
        cholesky_in_place_impl(matrix, regularization, parallelism, params)?;
    Ok(LltInfo {
        dynamic_regularization_count,
    })
}

/// Computes the Cholesky factor `U` of the input matrix such that `U` is upper triangular, and
/// `U.transpose()×U == matrix`, then stores it back in the same matrix.
///
/// Only the upper triangular part is read and written, and the reported minor is the same as
/// for [`cholesky_in_place`] on the transposed matrix.
#[track_caller]
pub fn cholesky_upper_in_place<T: RealField>(
    matrix: MatMut<'_, T>,
    regularization: LltRegularization<T>,
    parallelism: Parallelism,
    params: LltParams,
) -> Result<LltInfo, CholeskyError> {
    fancy_assert!(
        matrix.ncols() == matrix.nrows(),
        "only square matrices can be decomposed into cholesky factors",
    );

    if let Some(message) = layout_warning(matrix.rb(), Layout::ColMajor) {
        log::warn!(target: "lltri_perf", "{message}");
    }

    let dynamic_regularization_count =
        cholesky_in_place_impl(matrix.transpose(), regularization, parallelism, params)?;
    Ok(LltInfo {
        dynamic_regularization_count,
    })
}
