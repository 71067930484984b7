//! Fix application support.
//!
//! Rules describe fixes as byte-range [`Edit`]s against the original
//! source; [`SourceRewriter`] applies a batch of them safely.

mod rewriter;

pub use rewriter::{Edit, RewriteError, SourceRewriter};
