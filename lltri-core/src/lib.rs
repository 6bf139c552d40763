//! `lltri` core module.
//!
//! This module contains:
//! - definitions of matrix structures ([`MatRef`], [`MatMut`], [`Mat`]),
//! - the parallelism strategy shared by every routine ([`Parallelism`]),
//! - triangular matrix inversion,
//! - triangular solve routines,
//! - matrix multiplication routines.

#![warn(rust_2018_idioms)]
#![allow(clippy::too_many_arguments)]

use assert2::assert as fancy_assert;
use core::{
    fmt::Debug,
    marker::PhantomData,
    ops::{Index, IndexMut},
    ptr::NonNull,
};
use num_traits::Float;
use reborrow::*;

pub mod inverse;
pub mod mul;
pub mod solve;

/// Parallelism strategy that can be passed to most of the routines in the library.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// No parallelism.
    ///
    /// The code is executed sequentially on the same thread that calls a function
    /// and passes this argument.
    None,
    /// Rayon parallelism.
    ///
    /// The code is possibly executed in parallel on the current thread, as well as the currently
    /// active rayon thread pool.
    ///
    /// The contained value represents a hint about the number of threads an implementation should
    /// use, but there is no way to guarantee how many or which threads will be used.
    ///
    /// A value of `0` treated as equivalent to `rayon::current_num_threads()`.
    Rayon(usize),
}

/// Storage order of a dense matrix buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Consecutive elements of a row are adjacent in memory, element `(i, j)` lives at
    /// `i * leading_dim + j`.
    RowMajor,
    /// Consecutive elements of a column are adjacent in memory, element `(i, j)` lives at
    /// `i + j * leading_dim`.
    ColMajor,
}

/// Which triangle of a square matrix holds the meaningful data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Uplo {
    Lower,
    Upper,
}

/// Whether a triangular matrix has an implicit unit diagonal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Diag {
    /// The diagonal is stored in the matrix.
    NonUnit,
    /// The diagonal is implicitly all ones, the stored diagonal is neither read nor written.
    Unit,
}

mod seal {
    pub trait Seal {}
    impl Seal for f32 {}
    impl Seal for f64 {}
}

/// Real floating point scalar usable by the routines of this library, implemented for `f32` and
/// `f64`.
pub trait RealField: Float + Send + Sync + Debug + seal::Seal + 'static {}

impl RealField for f32 {}
impl RealField for f64 {}

#[inline]
#[doc(hidden)]
pub fn join_raw(
    op_a: impl Send + FnOnce(Parallelism),
    op_b: impl Send + FnOnce(Parallelism),
    parallelism: Parallelism,
) {
    match parallelism {
        Parallelism::None => (op_a(parallelism), op_b(parallelism)),
        Parallelism::Rayon(n_threads) => {
            if n_threads == 1 {
                (op_a(Parallelism::None), op_b(Parallelism::None))
            } else {
                let n_threads = if n_threads > 0 {
                    n_threads
                } else {
                    rayon::current_num_threads()
                };
                let parallelism = Parallelism::Rayon(n_threads - n_threads / 2);
                rayon::join(|| op_a(parallelism), || op_b(parallelism))
            }
        }
    };
}

#[inline]
#[doc(hidden)]
pub fn parallelism_degree(parallelism: Parallelism) -> usize {
    match parallelism {
        Parallelism::None => 1,
        Parallelism::Rayon(0) => rayon::current_num_threads(),
        Parallelism::Rayon(n_threads) => n_threads,
    }
}

/// Returns the minimum number of elements a buffer must hold to store a matrix with the given
/// dimensions, layout and leading dimension.
#[inline]
pub fn required_len(nrows: usize, ncols: usize, layout: Layout, leading_dim: usize) -> usize {
    if nrows == 0 || ncols == 0 {
        return 0;
    }
    match layout {
        Layout::RowMajor => (nrows - 1) * leading_dim + ncols,
        Layout::ColMajor => (ncols - 1) * leading_dim + nrows,
    }
}

#[track_caller]
fn strides_for(nrows: usize, ncols: usize, layout: Layout, leading_dim: usize) -> (isize, isize) {
    match layout {
        Layout::RowMajor => {
            fancy_assert!(leading_dim >= ncols, "leading dimension is smaller than the row length");
            (leading_dim as isize, 1)
        }
        Layout::ColMajor => {
            fancy_assert!(
                leading_dim >= nrows,
                "leading dimension is smaller than the column length"
            );
            (1, leading_dim as isize)
        }
    }
}

struct MatrixSliceBase<T> {
    ptr: NonNull<T>,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
}

impl<T> Copy for MatrixSliceBase<T> {}
impl<T> Clone for MatrixSliceBase<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

/// Matrix view with general row and column strides.
pub struct MatRef<'a, T> {
    base: MatrixSliceBase<T>,
    _marker: PhantomData<&'a T>,
}

/// Mutable matrix view with general row and column strides.
///
/// For usage examples, see [`MatRef`].
pub struct MatMut<'a, T> {
    base: MatrixSliceBase<T>,
    _marker: PhantomData<&'a mut T>,
}

unsafe impl<'a, T: Sync> Sync for MatRef<'a, T> {}
unsafe impl<'a, T: Sync> Send for MatRef<'a, T> {}
unsafe impl<'a, T: Sync> Sync for MatMut<'a, T> {}
unsafe impl<'a, T: Send> Send for MatMut<'a, T> {}

impl<'a, T> Copy for MatRef<'a, T> {}
impl<'a, T> Clone for MatRef<'a, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'b, 'a, T> Reborrow<'b> for MatRef<'a, T> {
    type Target = MatRef<'b, T>;
    #[inline]
    fn rb(&'b self) -> Self::Target {
        *self
    }
}
impl<'b, 'a, T> ReborrowMut<'b> for MatRef<'a, T> {
    type Target = MatRef<'b, T>;
    #[inline]
    fn rb_mut(&'b mut self) -> Self::Target {
        *self
    }
}

impl<'b, 'a, T> Reborrow<'b> for MatMut<'a, T> {
    type Target = MatRef<'b, T>;
    #[inline]
    fn rb(&'b self) -> Self::Target {
        Self::Target {
            base: self.base,
            _marker: PhantomData,
        }
    }
}
impl<'b, 'a, T> ReborrowMut<'b> for MatMut<'a, T> {
    type Target = MatMut<'b, T>;
    #[inline]
    fn rb_mut(&'b mut self) -> Self::Target {
        Self::Target {
            base: self.base,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> IntoConst for MatRef<'a, T> {
    type Target = MatRef<'a, T>;
    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}
impl<'a, T> IntoConst for MatMut<'a, T> {
    type Target = MatRef<'a, T>;
    #[inline]
    fn into_const(self) -> Self::Target {
        MatRef {
            base: self.base,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> MatRef<'a, T> {
    /// Builds a view from a pointer to its top left element, its dimensions, and the distance in
    /// elements between consecutive rows and consecutive columns.
    ///
    /// # Safety
    ///
    /// `ptr` must be non null and aligned. Every position `(i, j)` with `i < nrows` and
    /// `j < ncols` that is read through the view must hold an initialized `T` at
    /// `ptr + i * row_stride + j * col_stride`, and that memory must not be written to while the
    /// view is alive.
    #[inline]
    pub unsafe fn from_raw_parts(
        ptr: *const T,
        nrows: usize,
        ncols: usize,
        row_stride: isize,
        col_stride: isize,
    ) -> Self {
        Self {
            base: MatrixSliceBase::<T> {
                ptr: NonNull::new_unchecked(ptr as *mut T),
                nrows,
                ncols,
                row_stride,
                col_stride,
            },
            _marker: PhantomData,
        }
    }

    /// Returns a view over a dense buffer with the given layout and leading dimension.
    ///
    /// # Panics
    ///
    /// Panics if the leading dimension is smaller than a row (row-major) or column (column-major),
    /// or if `data` is too short to hold the matrix.
    ///
    /// # Example
    ///
    /// ```
    /// use lltri_core::{Layout, MatRef};
    ///
    /// let data = [1.0, 2.0, -1.0, 3.0, 4.0, -1.0];
    /// let m = MatRef::from_slice(&data, 2, 2, Layout::RowMajor, 3);
    ///
    /// assert_eq!(m[(0, 1)], 2.0);
    /// assert_eq!(m[(1, 0)], 3.0);
    /// ```
    #[track_caller]
    #[inline]
    pub fn from_slice(
        data: &'a [T],
        nrows: usize,
        ncols: usize,
        layout: Layout,
        leading_dim: usize,
    ) -> Self {
        let (row_stride, col_stride) = strides_for(nrows, ncols, layout, leading_dim);
        fancy_assert!(data.len() >= required_len(nrows, ncols, layout, leading_dim));
        unsafe { Self::from_raw_parts(data.as_ptr(), nrows, ncols, row_stride, col_stride) }
    }

    #[inline]
    pub fn as_ptr(self) -> *const T {
        self.base.ptr.as_ptr()
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.base.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.base.ncols
    }

    /// Distance in elements between `(i, j)` and `(i + 1, j)`.
    #[inline]
    pub fn row_stride(&self) -> isize {
        self.base.row_stride
    }

    /// Distance in elements between `(i, j)` and `(i, j + 1)`.
    #[inline]
    pub fn col_stride(&self) -> isize {
        self.base.col_stride
    }

    // may point outside the view, never dereferenced unless in bounds
    #[inline]
    fn ptr_at(self, i: usize, j: usize) -> *const T {
        self.as_ptr()
            .wrapping_offset(i as isize * self.row_stride())
            .wrapping_offset(j as isize * self.col_stride())
    }

    /// Splits the view at row `i` and column `j`, and returns the top left, top right, bottom
    /// left and bottom right blocks.
    ///
    /// # Panics
    ///
    /// Panics if `i > self.nrows()` or `j > self.ncols()`.
    ///
    /// # Example
    ///
    /// ```
    /// use lltri_core::mat;
    ///
    /// let m = mat![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]];
    /// let (top_left, top_right, bot_left, bot_right) = m.as_ref().split_at(1, 1);
    ///
    /// assert_eq!(top_left[(0, 0)], 0.0);
    /// assert_eq!(top_right[(0, 1)], 2.0);
    /// assert_eq!(bot_left[(0, 0)], 3.0);
    /// assert_eq!(bot_right[(0, 1)], 5.0);
    /// ```
    #[track_caller]
    #[inline]
    pub fn split_at(self, i: usize, j: usize) -> (Self, Self, Self, Self) {
        fancy_assert!(i <= self.nrows());
        fancy_assert!(j <= self.ncols());
        let (m, n) = (self.nrows(), self.ncols());
        let (rs, cs) = (self.row_stride(), self.col_stride());
        // SAFETY: the four blocks lie inside `self`
        unsafe {
            (
                Self::from_raw_parts(self.as_ptr(), i, j, rs, cs),
                Self::from_raw_parts(self.ptr_at(0, j), i, n - j, rs, cs),
                Self::from_raw_parts(self.ptr_at(i, 0), m - i, j, rs, cs),
                Self::from_raw_parts(self.ptr_at(i, j), m - i, n - j, rs, cs),
            )
        }
    }

    /// Splits the view into its first `i` rows and the remaining ones.
    #[track_caller]
    #[inline]
    pub fn split_at_row(self, i: usize) -> (Self, Self) {
        let (_, top, _, bottom) = self.split_at(i, 0);
        (top, bottom)
    }

    /// Splits the view into its first `j` columns and the remaining ones.
    #[track_caller]
    #[inline]
    pub fn split_at_col(self, j: usize) -> (Self, Self) {
        let (_, _, left, right) = self.split_at(0, j);
        (left, right)
    }

    /// Returns a reference to the element at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    #[track_caller]
    #[inline]
    pub fn get(self, i: usize, j: usize) -> &'a T {
        fancy_assert!(i < self.nrows());
        fancy_assert!(j < self.ncols());
        // SAFETY: bounds have been checked
        unsafe { &*self.ptr_at(i, j) }
    }

    #[track_caller]
    #[inline]
    pub fn read(&self, i: usize, j: usize) -> T
    where
        T: Copy,
    {
        *self.get(i, j)
    }

    /// Returns the `nrows×ncols` block whose top left element is at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if the block does not fit in `self`.
    #[track_caller]
    #[inline]
    pub fn submatrix(self, i: usize, j: usize, nrows: usize, ncols: usize) -> Self {
        fancy_assert!(i <= self.nrows());
        fancy_assert!(j <= self.ncols());
        fancy_assert!(nrows <= self.nrows() - i);
        fancy_assert!(ncols <= self.ncols() - j);
        let (rs, cs) = (self.row_stride(), self.col_stride());
        unsafe { Self::from_raw_parts(self.ptr_at(i, j), nrows, ncols, rs, cs) }
    }

    /// Returns the transposed view, without moving any element.
    ///
    /// # Example
    ///
    /// ```
    /// use lltri_core::mat;
    ///
    /// let m = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
    /// let t = m.as_ref().transpose();
    ///
    /// assert_eq!(t.nrows(), 3);
    /// assert_eq!(t[(2, 0)], 3.0);
    /// assert_eq!(t[(0, 1)], 4.0);
    /// ```
    #[inline]
    pub fn transpose(self) -> Self {
        let (rs, cs) = (self.row_stride(), self.col_stride());
        unsafe { Self::from_raw_parts(self.as_ptr(), self.ncols(), self.nrows(), cs, rs) }
    }

    /// Returns the view with its last row first.
    #[inline]
    pub fn reverse_rows(self) -> Self {
        let (m, n) = (self.nrows(), self.ncols());
        let ptr = self.ptr_at(m.saturating_sub(1), 0);
        unsafe { Self::from_raw_parts(ptr, m, n, -self.row_stride(), self.col_stride()) }
    }

    /// Returns the view with its last row first and its last column first.
    #[inline]
    pub fn reverse_rows_and_cols(self) -> Self {
        let (m, n) = (self.nrows(), self.ncols());
        let ptr = self.ptr_at(m.saturating_sub(1), n.saturating_sub(1));
        unsafe { Self::from_raw_parts(ptr, m, n, -self.row_stride(), -self.col_stride()) }
    }

    #[inline]
    pub fn is_row_major(&self) -> bool {
        self.col_stride() == 1 || self.ncols() <= 1
    }

    #[inline]
    pub fn is_col_major(&self) -> bool {
        self.row_stride() == 1 || self.nrows() <= 1
    }

    /// Copies the view into a new row-major [`Mat`].
    #[inline]
    pub fn to_owned(&self) -> Mat<T>
    where
        T: Copy,
    {
        Mat::from_fn(self.nrows(), self.ncols(), |i, j| self.read(i, j))
    }

    // SAFETY: the caller must hold exclusive access to the viewed elements for `'a`
    #[inline]
    unsafe fn const_cast(self) -> MatMut<'a, T> {
        MatMut {
            base: self.base,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> MatMut<'a, T> {
    /// Builds a mutable view from a pointer to its top left element, its dimensions, and its
    /// strides.
    ///
    /// # Safety
    ///
    /// Same as [`MatRef::from_raw_parts`]. Additionally, the viewed elements must not be accessed
    /// through anything else while the view is alive, and two distinct in-bounds positions must
    /// never refer to the same element.
    #[inline]
    pub unsafe fn from_raw_parts(
        ptr: *mut T,
        nrows: usize,
        ncols: usize,
        row_stride: isize,
        col_stride: isize,
    ) -> Self {
        MatRef::from_raw_parts(ptr, nrows, ncols, row_stride, col_stride).const_cast()
    }

    /// Returns a mutable view over a dense buffer with the given layout and leading dimension.
    ///
    /// # Panics
    ///
    /// Panics if the leading dimension is smaller than a row (row-major) or column (column-major),
    /// or if `data` is too short to hold the matrix.
    #[track_caller]
    #[inline]
    pub fn from_slice_mut(
        data: &'a mut [T],
        nrows: usize,
        ncols: usize,
        layout: Layout,
        leading_dim: usize,
    ) -> Self {
        let (row_stride, col_stride) = strides_for(nrows, ncols, layout, leading_dim);
        fancy_assert!(data.len() >= required_len(nrows, ncols, layout, leading_dim));
        unsafe { Self::from_raw_parts(data.as_mut_ptr(), nrows, ncols, row_stride, col_stride) }
    }

    /// Returns a mutable view over a packed row-major buffer of exactly `nrows * ncols` elements.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != nrows * ncols`.
    #[track_caller]
    #[inline]
    pub fn from_row_major_slice_mut(data: &'a mut [T], nrows: usize, ncols: usize) -> Self {
        fancy_assert!(Some(data.len()) == nrows.checked_mul(ncols));
        Self::from_slice_mut(data, nrows, ncols, Layout::RowMajor, ncols)
    }

    #[inline]
    pub fn as_ptr(self) -> *mut T {
        self.base.ptr.as_ptr()
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.base.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.base.ncols
    }

    #[inline]
    pub fn row_stride(&self) -> isize {
        self.base.row_stride
    }

    #[inline]
    pub fn col_stride(&self) -> isize {
        self.base.col_stride
    }

    /// Mutable counterpart of [`MatRef::split_at`].
    #[track_caller]
    #[inline]
    pub fn split_at(self, i: usize, j: usize) -> (Self, Self, Self, Self) {
        let (top_left, top_right, bot_left, bot_right) = self.into_const().split_at(i, j);
        // SAFETY: the four blocks are disjoint
        unsafe {
            (
                top_left.const_cast(),
                top_right.const_cast(),
                bot_left.const_cast(),
                bot_right.const_cast(),
            )
        }
    }

    #[track_caller]
    #[inline]
    pub fn split_at_row(self, i: usize) -> (Self, Self) {
        let (_, top, _, bottom) = self.split_at(i, 0);
        (top, bottom)
    }

    #[track_caller]
    #[inline]
    pub fn split_at_col(self, j: usize) -> (Self, Self) {
        let (_, _, left, right) = self.split_at(0, j);
        (left, right)
    }

    /// Returns a mutable reference to the element at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    #[track_caller]
    #[inline]
    pub fn get(self, i: usize, j: usize) -> &'a mut T {
        fancy_assert!(i < self.nrows());
        fancy_assert!(j < self.ncols());
        let offset = i as isize * self.row_stride() + j as isize * self.col_stride();
        // SAFETY: bounds have been checked, and the view is the only access to its elements
        unsafe { &mut *self.as_ptr().offset(offset) }
    }

    #[track_caller]
    #[inline]
    pub fn read(&self, i: usize, j: usize) -> T
    where
        T: Copy,
    {
        self.rb().read(i, j)
    }

    #[track_caller]
    #[inline]
    pub fn write(&mut self, i: usize, j: usize, value: T) {
        *self.rb_mut().get(i, j) = value;
    }

    #[inline]
    pub fn transpose(self) -> Self {
        unsafe { self.into_const().transpose().const_cast() }
    }

    #[inline]
    pub fn reverse_rows(self) -> Self {
        unsafe { self.into_const().reverse_rows().const_cast() }
    }

    #[inline]
    pub fn reverse_rows_and_cols(self) -> Self {
        unsafe { self.into_const().reverse_rows_and_cols().const_cast() }
    }

    /// Copies `src` into `self`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions do not match.
    #[track_caller]
    pub fn copy_from(&mut self, src: MatRef<'_, T>)
    where
        T: Copy,
    {
        fancy_assert!((self.nrows(), self.ncols()) == (src.nrows(), src.ncols()));
        for i in 0..self.nrows() {
            for j in 0..self.ncols() {
                self.write(i, j, src.read(i, j));
            }
        }
    }

    /// Copies the lower triangle of `src` into `self`, skipping the diagonal when `diag` is
    /// [`Diag::Unit`]. The strictly upper triangle of `self` is left as is.
    #[track_caller]
    pub fn copy_lower_from(&mut self, src: MatRef<'_, T>, diag: Diag)
    where
        T: Copy,
    {
        fancy_assert!((self.nrows(), self.ncols()) == (src.nrows(), src.ncols()));
        let skip = match diag {
            Diag::NonUnit => 0,
            Diag::Unit => 1,
        };
        for i in 0..self.nrows() {
            for j in 0..(i + 1 - skip).min(self.ncols()) {
                self.write(i, j, src.read(i, j));
            }
        }
    }
}

/// Owning row-major matrix.
#[derive(Clone, PartialEq)]
pub struct Mat<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
}

impl<T> Default for Mat<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mat<T> {
    /// Returns a new matrix with dimensions `(0, 0)`. This does not allocate.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            nrows: 0,
            ncols: 0,
        }
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with the provided function.
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for i in 0..nrows {
            for j in 0..ncols {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }

    /// Returns a new matrix with dimensions `(nrows, ncols)`, filled with zeros.
    #[inline]
    pub fn zeros(nrows: usize, ncols: usize) -> Self
    where
        T: RealField,
    {
        Self::from_fn(nrows, ncols, |_, _| T::zero())
    }

    /// Returns the `n×n` identity matrix.
    #[inline]
    pub fn identity(n: usize) -> Self
    where
        T: RealField,
    {
        Self::from_fn(n, n, |i, j| if i == j { T::one() } else { T::zero() })
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Returns the underlying row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns a view over the matrix.
    #[inline]
    pub fn as_ref(&self) -> MatRef<'_, T> {
        unsafe {
            MatRef::from_raw_parts(
                self.data.as_ptr(),
                self.nrows,
                self.ncols,
                self.ncols as isize,
                1,
            )
        }
    }

    /// Returns a mutable view over the matrix.
    #[inline]
    pub fn as_mut(&mut self) -> MatMut<'_, T> {
        unsafe {
            MatMut::from_raw_parts(
                self.data.as_mut_ptr(),
                self.nrows,
                self.ncols,
                self.ncols as isize,
                1,
            )
        }
    }

    #[track_caller]
    #[inline]
    pub fn read(&self, i: usize, j: usize) -> T
    where
        T: Copy,
    {
        self.as_ref().read(i, j)
    }

    #[track_caller]
    #[inline]
    pub fn write(&mut self, i: usize, j: usize, value: T) {
        self.as_mut().write(i, j, value)
    }
}

/// Creates a [`Mat`] containing the arguments, given row by row.
///
/// ```
/// use lltri_core::mat;
///
/// let m = mat![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
///
/// assert_eq!(m.nrows(), 3);
/// assert_eq!(m.ncols(), 2);
/// assert_eq!(m[(2, 1)], 6.0);
/// ```
#[macro_export]
macro_rules! mat {
    () => {
        $crate::Mat::new()
    };

    ($([$($v:expr),* $(,)?]),+ $(,)?) => {{
        let data = [$([$($v),*]),+];
        let nrows = data.len();
        let ncols = data[0].len();
        $crate::Mat::from_fn(nrows, ncols, |i, j| data[i][j])
    }};
}

impl<'a, T> Index<(usize, usize)> for MatRef<'a, T> {
    type Output = T;

    #[track_caller]
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        self.get(i, j)
    }
}
impl<'a, T> Index<(usize, usize)> for MatMut<'a, T> {
    type Output = T;

    #[track_caller]
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        self.rb().get(i, j)
    }
}
impl<'a, T> IndexMut<(usize, usize)> for MatMut<'a, T> {
    #[track_caller]
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        self.rb_mut().get(i, j)
    }
}
impl<T> Index<(usize, usize)> for Mat<T> {
    type Output = T;

    #[track_caller]
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        fancy_assert!(i < self.nrows);
        fancy_assert!(j < self.ncols);
        &self.data[i * self.ncols + j]
    }
}
impl<T> IndexMut<(usize, usize)> for Mat<T> {
    #[track_caller]
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        fancy_assert!(i < self.nrows);
        fancy_assert!(j < self.ncols);
        &mut self.data[i * self.ncols + j]
    }
}

impl<'a, T: Debug> Debug for MatRef<'a, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut rows = f.debug_list();
        for i in 0..self.nrows() {
            let row: Vec<&T> = (0..self.ncols()).map(|j| self.get(i, j)).collect();
            rows.entry(&row);
        }
        rows.finish()
    }
}
impl<'a, T: Debug> Debug for MatMut<'a, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.rb().fmt(f)
    }
}
impl<T: Debug> Debug for Mat<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.as_ref().fmt(f)
    }
}
