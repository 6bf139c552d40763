//! C ABI for `lltri`.
//!
//! Every function returns the LAPACK `info` convention: `0` on success, `-i` when argument `i`
//! is invalid, and a positive 1-based index when the matrix is not positive definite or is
//! singular. Matrices are dense buffers of `double` owned by the caller and overwritten in place.

use core::ffi::{c_char, c_int};
use lltri::{Diag, Error, Layout, Parallelism, Uplo};

/// Row-major storage, element `(i, j)` at `a[i * lda + j]`.
pub const LLTRI_ROW_MAJOR: c_int = 101;
/// Column-major storage, element `(i, j)` at `a[i + j * lda]`.
pub const LLTRI_COL_MAJOR: c_int = 102;

#[inline]
fn reject(func: &str, position: usize, reason: &'static str) -> c_int {
    let err = Error::InvalidArgument { position, reason };
    log::debug!("{func}: {err}");
    err.status()
}

#[inline]
fn report<T>(func: &str, result: Result<T, Error>) -> c_int {
    if let Err(err @ Error::InvalidArgument { .. }) = &result {
        log::debug!("{func}: {err}");
    }
    lltri::status(&result)
}

fn parse_layout(layout: c_int) -> Option<Layout> {
    match layout {
        LLTRI_ROW_MAJOR => Some(Layout::RowMajor),
        LLTRI_COL_MAJOR => Some(Layout::ColMajor),
        _ => None,
    }
}

fn parse_uplo(uplo: c_char) -> Option<Uplo> {
    match uplo as u8 {
        b'L' | b'l' => Some(Uplo::Lower),
        b'U' | b'u' => Some(Uplo::Upper),
        _ => None,
    }
}

fn parse_diag(diag: c_char) -> Option<Diag> {
    match diag as u8 {
        b'N' | b'n' => Some(Diag::NonUnit),
        b'U' | b'u' => Some(Diag::Unit),
        _ => None,
    }
}

/// Builds the slice covering an `n×n` matrix with leading dimension `lda`, or `None` if its
/// length overflows. `a` may be null only when `n == 0`.
unsafe fn matrix_slice<'a>(a: *mut f64, n: usize, lda: usize) -> Option<&'a mut [f64]> {
    if n == 0 {
        return Some(&mut []);
    }
    let len = (n - 1).checked_mul(lda)?.checked_add(n)?;
    if len > isize::MAX as usize / core::mem::size_of::<f64>() {
        return None;
    }
    Some(core::slice::from_raw_parts_mut(a, len))
}

/// Overwrites the lower triangle of the row-major `n×n` matrix `a` with its Cholesky factor `L`,
/// such that `A = L×L^T`. The strictly upper triangle is neither read nor written.
///
/// Returns `0` on success, `k > 0` if the leading minor of order `k` is not positive definite,
/// `-1` if `n` is negative, and `-2` if `a` is null while `n > 0`.
///
/// # Safety
///
/// When `n > 0`, `a` must point to `n * n` initialized doubles, valid for reads and writes and
/// not accessed by anything else during the call.
#[no_mangle]
pub unsafe extern "C" fn lltri_cholesky(n: c_int, a: *mut f64) -> c_int {
    const FUNC: &str = "lltri_cholesky";
    let Ok(n) = usize::try_from(n) else {
        return reject(FUNC, 1, "dimension is negative");
    };
    if n > 0 && a.is_null() {
        return reject(FUNC, 2, "matrix pointer is null");
    }
    match matrix_slice(a, n, n) {
        Some(a) => report(FUNC, lltri::cholesky(n, a)),
        None => reject(FUNC, 1, "dimension is too large"),
    }
}

/// Overwrites the lower triangle of the row-major `n×n` lower triangular matrix `a` with its
/// inverse. The strictly upper triangle is neither read nor written.
///
/// Returns `0` on success, `k > 0` if diagonal entry `k` is exactly zero, `-1` if `n` is
/// negative, and `-2` if `a` is null while `n > 0`.
///
/// # Safety
///
/// Same requirements as [`lltri_cholesky`].
#[no_mangle]
pub unsafe extern "C" fn lltri_triinv(n: c_int, a: *mut f64) -> c_int {
    const FUNC: &str = "lltri_triinv";
    let Ok(n) = usize::try_from(n) else {
        return reject(FUNC, 1, "dimension is negative");
    };
    if n > 0 && a.is_null() {
        return reject(FUNC, 2, "matrix pointer is null");
    }
    match matrix_slice(a, n, n) {
        Some(a) => report(FUNC, lltri::triinv(n, a)),
        None => reject(FUNC, 1, "dimension is too large"),
    }
}

/// Computes the Cholesky factorization of the symmetric positive definite `n×n` matrix `a`, in
/// place.
///
/// `layout` is [`LLTRI_ROW_MAJOR`] or [`LLTRI_COL_MAJOR`], `uplo` is `'L'` to read and overwrite
/// the lower triangle with `L` (`A = L×L^T`), or `'U'` for the upper triangle with `U`
/// (`A = U^T×U`).
///
/// Returns `0` on success, `k > 0` if the leading minor of order `k` is not positive definite, or
/// `-i` if argument `i` is invalid.
///
/// # Safety
///
/// When `n > 0`, `a` must point to `(n - 1) * lda + n` initialized doubles, valid for reads and
/// writes and not accessed by anything else during the call.
#[no_mangle]
pub unsafe extern "C" fn lltri_dpotrf(
    layout: c_int,
    uplo: c_char,
    n: c_int,
    a: *mut f64,
    lda: c_int,
) -> c_int {
    const FUNC: &str = "lltri_dpotrf";
    let Some(layout) = parse_layout(layout) else {
        return reject(FUNC, 1, "unknown layout");
    };
    let Some(uplo) = parse_uplo(uplo) else {
        return reject(FUNC, 2, "uplo must be 'L' or 'U'");
    };
    let Ok(n) = usize::try_from(n) else {
        return reject(FUNC, 3, "dimension is negative");
    };
    if n > 0 && a.is_null() {
        return reject(FUNC, 4, "matrix pointer is null");
    }
    let lda = match usize::try_from(lda) {
        Ok(lda) if lda >= n.max(1) => lda,
        _ => return reject(FUNC, 5, "leading dimension is smaller than max(1, n)"),
    };
    match matrix_slice(a, n, lda) {
        Some(a) => report(
            FUNC,
            lltri::potrf(layout, uplo, n, a, lda, Parallelism::None),
        ),
        None => reject(FUNC, 5, "leading dimension is too large"),
    }
}

/// Computes the inverse of the `n×n` triangular matrix `a`, in place.
///
/// `layout` is [`LLTRI_ROW_MAJOR`] or [`LLTRI_COL_MAJOR`], `uplo` is `'L'` or `'U'` and selects
/// the triangle that is read and overwritten, `diag` is `'N'`, or `'U'` for an implicit unit
/// diagonal that is neither read nor written.
///
/// Returns `0` on success, `k > 0` if diagonal entry `k` is exactly zero, or `-i` if argument `i`
/// is invalid.
///
/// # Safety
///
/// Same requirements as [`lltri_dpotrf`].
#[no_mangle]
pub unsafe extern "C" fn lltri_dtrtri(
    layout: c_int,
    uplo: c_char,
    diag: c_char,
    n: c_int,
    a: *mut f64,
    lda: c_int,
) -> c_int {
    const FUNC: &str = "lltri_dtrtri";
    let Some(layout) = parse_layout(layout) else {
        return reject(FUNC, 1, "unknown layout");
    };
    let Some(uplo) = parse_uplo(uplo) else {
        return reject(FUNC, 2, "uplo must be 'L' or 'U'");
    };
    let Some(diag) = parse_diag(diag) else {
        return reject(FUNC, 3, "diag must be 'N' or 'U'");
    };
    let Ok(n) = usize::try_from(n) else {
        return reject(FUNC, 4, "dimension is negative");
    };
    if n > 0 && a.is_null() {
        return reject(FUNC, 5, "matrix pointer is null");
    }
    let lda = match usize::try_from(lda) {
        Ok(lda) if lda >= n.max(1) => lda,
        _ => return reject(FUNC, 6, "leading dimension is smaller than max(1, n)"),
    };
    match matrix_slice(a, n, lda) {
        Some(a) => report(
            FUNC,
            lltri::trtri(layout, uplo, diag, n, a, lda, Parallelism::None),
        ),
        None => reject(FUNC, 6, "leading dimension is too large"),
    }
}
