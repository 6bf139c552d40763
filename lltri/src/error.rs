use lltri_cholesky::llt::CholeskyError;
use lltri_core::inverse::SingularMatrixError;
use thiserror::Error;

/// Failure of one of the flat buffer routines.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An argument was rejected before any computation took place.
    #[error("argument {position} is invalid: {reason}")]
    InvalidArgument {
        /// 1-based position of the argument in the call.
        position: usize,
        /// Short description of the violated requirement.
        reason: &'static str,
    },

    /// The leading minor of order `minor` is not positive definite.
    #[error("the leading minor of order {minor} is not positive definite")]
    NotPositiveDefinite {
        /// 1-based order of the first failing leading minor.
        minor: usize,
    },

    /// Diagonal entry `index` of a triangular matrix is exactly zero.
    #[error("the triangular matrix is singular, diagonal entry {index} is zero")]
    SingularMatrix {
        /// 1-based index of the first zero diagonal entry.
        index: usize,
    },
}

impl Error {
    /// Returns the LAPACK `info` value for this error: `-i` when argument `i` is invalid, and
    /// the positive 1-based index otherwise.
    pub fn status(&self) -> i32 {
        match *self {
            Error::InvalidArgument { position, .. } => -to_i32(position),
            Error::NotPositiveDefinite { minor } => to_i32(minor),
            Error::SingularMatrix { index } => to_i32(index),
        }
    }
}

// indices above `i32::MAX` can only come from matrices that do not fit in a LAPACK call anyway
#[inline]
fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl From<CholeskyError> for Error {
    #[inline]
    fn from(err: CholeskyError) -> Self {
        Error::NotPositiveDefinite {
            minor: err.non_positive_definite_minor,
        }
    }
}

impl From<SingularMatrixError> for Error {
    #[inline]
    fn from(err: SingularMatrixError) -> Self {
        Error::SingularMatrix {
            index: err.zero_diagonal,
        }
    }
}
