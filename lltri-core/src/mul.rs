//! Matrix multiplication.

use crate::{join_raw, parallelism_degree, Diag, MatMut, MatRef, Parallelism, RealField};
use assert2::assert as fancy_assert;
use reborrow::*;

// below this many scalar multiply-adds, a task is not split further
const PAR_THRESHOLD: usize = 48 * 48 * 48;

#[inline]
fn should_split(work: usize, len: usize, parallelism: Parallelism) -> bool {
    len > 1 && work > PAR_THRESHOLD && parallelism_degree(parallelism) > 1
}

#[inline]
fn gemm_parallelism(parallelism: Parallelism) -> gemm::Parallelism {
    match parallelism {
        Parallelism::None => gemm::Parallelism::None,
        Parallelism::Rayon(0) => gemm::Parallelism::Rayon(rayon::current_num_threads()),
        Parallelism::Rayon(n_threads) => gemm::Parallelism::Rayon(n_threads),
    }
}

/// Computes the matrix product `[alpha * dst] + beta * lhs * rhs` and stores the result in
/// `dst`.
///
/// If `alpha` is not provided, the previous contents of `dst` are not read.
///
/// # Panics
///
/// Panics if the matrix dimensions are not compatible for matrix multiplication.
/// i.e.
///  - `dst.nrows() == lhs.nrows()`
///  - `dst.ncols() == rhs.ncols()`
///  - `lhs.ncols() == rhs.nrows()`
#[track_caller]
pub fn matmul<T: RealField>(
    dst: MatMut<'_, T>,
    lhs: MatRef<'_, T>,
    rhs: MatRef<'_, T>,
    alpha: Option<T>,
    beta: T,
    parallelism: Parallelism,
) {
    fancy_assert!(dst.nrows() == lhs.nrows());
    fancy_assert!(dst.ncols() == rhs.ncols());
    fancy_assert!(lhs.ncols() == rhs.nrows());

    let m = dst.nrows();
    let n = dst.ncols();
    let k = lhs.ncols();
    if m == 0 || n == 0 {
        return;
    }

    let dst_row_stride = dst.row_stride();
    let dst_col_stride = dst.col_stride();

    // SAFETY:
    // * matching operand/destination dimensions.
    // * strides were verified during creation of matrix views.
    // * `RealField` is only implemented for `f32` and `f64`.
    unsafe {
        gemm::gemm(
            m,
            n,
            k,
            dst.as_ptr(),
            dst_col_stride,
            dst_row_stride,
            alpha.is_some(),
            lhs.as_ptr(),
            lhs.col_stride(),
            lhs.row_stride(),
            rhs.as_ptr(),
            rhs.col_stride(),
            rhs.row_stride(),
            alpha.unwrap_or(T::zero()),
            beta,
            false,
            false,
            false,
            gemm_parallelism(parallelism),
        )
    }
}

/// In-place products with a triangular factor.
pub mod triangular {
    use super::*;

    // diagonal blocks at most this large are multiplied with scalar loops
    const BLOCK_THRESHOLD: usize = 16;

    #[inline]
    fn diag_at<T: RealField>(tri: MatRef<'_, T>, k: usize, diag: Diag) -> T {
        match diag {
            Diag::NonUnit => tri.read(k, k),
            Diag::Unit => T::one(),
        }
    }

    fn mul_lower_right_base<T: RealField>(
        dst: MatMut<'_, T>,
        tril: MatRef<'_, T>,
        diag: Diag,
        beta: T,
        parallelism: Parallelism,
    ) {
        let mut dst = dst;
        let m = dst.nrows();
        let n = dst.ncols();

        if should_split(m * n * n / 2, m, parallelism) {
            let (mut top, mut bottom) = dst.split_at_row(m / 2);
            join_raw(
                |parallelism| mul_lower_right_base(top.rb_mut(), tril, diag, beta, parallelism),
                |parallelism| {
                    mul_lower_right_base(bottom.rb_mut(), tril, diag, beta, parallelism)
                },
                parallelism,
            );
            return;
        }

        // column `j` of the product only reads columns `j..` of the row, so going left to right
        // never reads an overwritten value
        for i in 0..m {
            for j in 0..n {
                let mut acc = dst.read(i, j) * diag_at(tril, j, diag);
                for k in j + 1..n {
                    acc = acc + dst.read(i, k) * tril.read(k, j);
                }
                dst.write(i, j, beta * acc);
            }
        }
    }

    //                  L00 0
    // [D0 D1] ×        L10 L11     = [D0×L00 + D1×L10   D1×L11]
    fn mul_lower_right_impl<T: RealField>(
        dst: MatMut<'_, T>,
        tril: MatRef<'_, T>,
        diag: Diag,
        beta: T,
        parallelism: Parallelism,
    ) {
        let n = tril.nrows();
        if n <= BLOCK_THRESHOLD {
            mul_lower_right_base(dst, tril, diag, beta, parallelism);
            return;
        }

        let bs = n / 2;
        let (l00, _, l10, l11) = tril.split_at(bs, bs);
        let (mut d0, mut d1) = dst.split_at_col(bs);

        // `D1` must still hold its input values when it is multiplied by `L10`
        mul_lower_right_impl(d0.rb_mut(), l00, diag, beta, parallelism);
        matmul(d0.rb_mut(), d1.rb(), l10, Some(T::one()), beta, parallelism);
        mul_lower_right_impl(d1.rb_mut(), l11, diag, beta, parallelism);
    }

    fn mul_lower_left_base<T: RealField>(
        dst: MatMut<'_, T>,
        tril: MatRef<'_, T>,
        diag: Diag,
        beta: T,
        parallelism: Parallelism,
    ) {
        let mut dst = dst;
        let m = dst.nrows();
        let n = dst.ncols();

        if should_split(m * m * n / 2, n, parallelism) {
            let (mut left, mut right) = dst.split_at_col(n / 2);
            join_raw(
                |parallelism| mul_lower_left_base(left.rb_mut(), tril, diag, beta, parallelism),
                |parallelism| mul_lower_left_base(right.rb_mut(), tril, diag, beta, parallelism),
                parallelism,
            );
            return;
        }

        // row `i` of the product only reads rows `..=i` of the column, so going bottom to top
        // never reads an overwritten value
        for j in 0..n {
            for i in (0..m).rev() {
                let mut acc = dst.read(i, j) * diag_at(tril, i, diag);
                for k in 0..i {
                    acc = acc + tril.read(i, k) * dst.read(k, j);
                }
                dst.write(i, j, beta * acc);
            }
        }
    }

    // L00 0          D0       L00×D0
    // L10 L11   ×    D1   =   L10×D0 + L11×D1
    fn mul_lower_left_impl<T: RealField>(
        dst: MatMut<'_, T>,
        tril: MatRef<'_, T>,
        diag: Diag,
        beta: T,
        parallelism: Parallelism,
    ) {
        let m = tril.nrows();
        if m <= BLOCK_THRESHOLD {
            mul_lower_left_base(dst, tril, diag, beta, parallelism);
            return;
        }

        let bs = m / 2;
        let (l00, _, l10, l11) = tril.split_at(bs, bs);
        let (mut d0, mut d1) = dst.split_at_row(bs);

        // `D0` must still hold its input values when it is multiplied by `L10`
        mul_lower_left_impl(d1.rb_mut(), l11, diag, beta, parallelism);
        matmul(d1.rb_mut(), l10, d0.rb(), Some(T::one()), beta, parallelism);
        mul_lower_left_impl(d0.rb_mut(), l00, diag, beta, parallelism);
    }

    /// Computes `beta * dst * tril` where `tril` is lower triangular, and stores the result in
    /// `dst`. The strictly upper triangular part of `tril` is not accessed.
    ///
    /// # Panics
    ///
    /// Panics if `tril` is not square, or if `dst.ncols() != tril.nrows()`.
    #[track_caller]
    pub fn mul_lower_right_in_place<T: RealField>(
        dst: MatMut<'_, T>,
        tril: MatRef<'_, T>,
        diag: Diag,
        beta: T,
        parallelism: Parallelism,
    ) {
        fancy_assert!(tril.nrows() == tril.ncols());
        fancy_assert!(dst.ncols() == tril.nrows());
        mul_lower_right_impl(dst, tril, diag, beta, parallelism);
    }

    /// Computes `beta * tril * dst` where `tril` is lower triangular, and stores the result in
    /// `dst`. The strictly upper triangular part of `tril` is not accessed.
    ///
    /// # Panics
    ///
    /// Panics if `tril` is not square, or if `dst.nrows() != tril.ncols()`.
    #[track_caller]
    pub fn mul_lower_left_in_place<T: RealField>(
        tril: MatRef<'_, T>,
        dst: MatMut<'_, T>,
        diag: Diag,
        beta: T,
        parallelism: Parallelism,
    ) {
        fancy_assert!(tril.nrows() == tril.ncols());
        fancy_assert!(dst.nrows() == tril.ncols());
        mul_lower_left_impl(dst, tril, diag, beta, parallelism);
    }
}

#[cfg(test)]
mod tests {
    use super::triangular::*;
    use super::*;
    use crate::Mat;
    use assert_approx_eq::assert_approx_eq;
    use rand::random;

    fn random_mat(m: usize, n: usize) -> Mat<f64> {
        Mat::from_fn(m, n, |_, _| random::<f64>())
    }

    fn lower_part(a: &Mat<f64>, diag: Diag) -> Mat<f64> {
        Mat::from_fn(a.nrows(), a.ncols(), |i, j| {
            if i == j && diag == Diag::Unit {
                1.0
            } else if j <= i {
                a[(i, j)]
            } else {
                0.0
            }
        })
    }

    fn naive(lhs: &Mat<f64>, rhs: &Mat<f64>) -> Mat<f64> {
        Mat::from_fn(lhs.nrows(), rhs.ncols(), |i, j| {
            (0..lhs.ncols()).map(|k| lhs[(i, k)] * rhs[(k, j)]).sum()
        })
    }

    #[test]
    fn test_matmul() {
        for (m, n, k) in [(0, 0, 0), (1, 1, 1), (3, 4, 5), (17, 9, 30), (64, 70, 65)] {
            let lhs = random_mat(m, k);
            let rhs = random_mat(k, n);
            let init = random_mat(m, n);
            let expected = naive(&lhs, &rhs);

            for parallelism in [Parallelism::None, Parallelism::Rayon(0)] {
                let mut dst = init.clone();
                matmul(
                    dst.as_mut(),
                    lhs.as_ref(),
                    rhs.as_ref(),
                    None,
                    2.0,
                    parallelism,
                );
                for i in 0..m {
                    for j in 0..n {
                        assert_approx_eq!(dst[(i, j)], 2.0 * expected[(i, j)], 1e-10);
                    }
                }

                let mut dst = init.clone();
                matmul(
                    dst.as_mut(),
                    lhs.as_ref(),
                    rhs.as_ref(),
                    Some(0.5),
                    1.0,
                    parallelism,
                );
                for i in 0..m {
                    for j in 0..n {
                        let target = 0.5 * init[(i, j)] + expected[(i, j)];
                        assert_approx_eq!(dst[(i, j)], target, 1e-10);
                    }
                }
            }
        }
    }

    #[test]
    fn test_matmul_strided() {
        let lhs = random_mat(40, 13);
        let rhs = random_mat(40, 9);
        let rhs_flipped = Mat::from_fn(40, 9, |i, j| rhs[(39 - i, j)]);
        let expected = naive(&lhs.as_ref().transpose().to_owned(), &rhs);

        // column-major destination, transposed lhs, rhs with a negative row stride
        let mut dst = Mat::zeros(9, 13);
        matmul(
            dst.as_mut().transpose(),
            lhs.as_ref().transpose(),
            rhs_flipped.as_ref().reverse_rows(),
            None,
            1.0,
            Parallelism::None,
        );
        for i in 0..13 {
            for j in 0..9 {
                assert_approx_eq!(dst[(j, i)], expected[(i, j)], 1e-10);
            }
        }
    }

    #[test]
    fn test_mul_lower_in_place() {
        for n in [0, 1, 2, 5, 33, 80] {
            for diag in [Diag::NonUnit, Diag::Unit] {
                let tri = random_mat(n, n);
                let tril = lower_part(&tri, diag);
                let other = random_mat(7, n);

                let mut right = other.clone();
                mul_lower_right_in_place(
                    right.as_mut(),
                    tri.as_ref(),
                    diag,
                    -1.0,
                    Parallelism::Rayon(0),
                );
                let expected = naive(&other, &tril);
                for i in 0..7 {
                    for j in 0..n {
                        assert_approx_eq!(right[(i, j)], -expected[(i, j)], 1e-10);
                    }
                }

                let other = random_mat(n, 7);
                let mut left = other.clone();
                mul_lower_left_in_place(
                    tri.as_ref(),
                    left.as_mut(),
                    diag,
                    1.0,
                    Parallelism::Rayon(0),
                );
                let expected = naive(&tril, &other);
                for i in 0..n {
                    for j in 0..7 {
                        assert_approx_eq!(left[(i, j)], expected[(i, j)], 1e-10);
                    }
                }
            }
        }
    }
}
