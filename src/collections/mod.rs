//! Packed integer-indexed containers shared by the graph and the three solve engines.
//!
//! [`DenseVec`] is a plain `[0, n)`-indexed vector with bounds checks in debug
//! builds only. [`SignedVec`] extends that idea to `[-n, n)`, which is how the
//! star graph keeps forward arc `a` and its reverse `~a` in one contiguous
//! allocation instead of two.

mod dense;
mod signed;

pub use dense::DenseVec;
pub use signed::SignedVec;
