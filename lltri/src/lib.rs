//! `lltri` computes the Cholesky factorization of dense symmetric positive definite matrices and
//! the inverse of dense triangular matrices, without relying on an external LAPACK.
//!
//! The crate exposes two levels of API:
//! - LAPACK-shaped entry points over flat buffers ([`cholesky`], [`triinv`], [`potrf`],
//!   [`trtri`]) that validate their arguments and report failures through [`Error`], which maps to
//!   the usual integer `info` convention with [`Error::status`],
//! - the strided matrix views and generic routines they are built on, re-exported from
//!   [`lltri_core`] and [`lltri_cholesky`].
//!
//! # Example
//!
//! ```
//! let n = 3;
//! let mut a = vec![
//!     4.0, 0.0, 0.0, //
//!     2.0, 10.0, 0.0,
//!     -2.0, 5.0, 6.0,
//! ];
//!
//! lltri::cholesky(n, &mut a).unwrap();
//! assert_eq!(a[0], 2.0);
//! assert_eq!((a[3], a[4]), (1.0, 3.0));
//!
//! // the lower triangle now holds L, invert it
//! lltri::triinv(n, &mut a).unwrap();
//! assert_eq!(a[0], 0.5);
//!
//! let mut not_spd = vec![1.0, 2.0, 2.0, 1.0];
//! let result = lltri::cholesky(2, &mut not_spd);
//! assert_eq!(lltri::status(&result), 2);
//! ```

#![warn(rust_2018_idioms)]
#![allow(clippy::too_many_arguments)]

mod error;
mod lapack;

pub use error::Error;
pub use lapack::{cholesky, potrf, status, triinv, trtri};

pub use lltri_cholesky::llt::{
    compute::{LltInfo, LltParams, LltRegularization},
    CholeskyError,
};
pub use lltri_core::inverse::SingularMatrixError;
pub use lltri_core::{mat, Diag, Layout, Mat, MatMut, MatRef, Parallelism, RealField, Uplo};

pub use lltri_cholesky;
pub use lltri_core;
