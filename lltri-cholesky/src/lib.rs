//! Dense Cholesky decomposition of symmetric positive definite matrices.

#![warn(rust_2018_idioms)]
#![allow(clippy::too_many_arguments)]

pub mod llt;
