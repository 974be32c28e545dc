//! # Token Counting
//!
//! The [`TokenCounter`] seam, and per-batch accumulation.

use std::ops::AddAssign;

use crate::readers::FieldValue;

/// Maps text to a count of tokens.
///
/// Implementations must be pure and deterministic: the same text always
/// yields the same count. They are shared, read-only, across workers.
pub trait TokenCounter: Send + Sync {
    /// Count the tokens of `text`.
    fn count_tokens(
        &self,
        text: &str,
    ) -> usize;
}

impl<C: TokenCounter + ?Sized> TokenCounter for &C {
    fn count_tokens(
        &self,
        text: &str,
    ) -> usize {
        (**self).count_tokens(text)
    }
}

impl<C: TokenCounter + ?Sized> TokenCounter for std::sync::Arc<C> {
    fn count_tokens(
        &self,
        text: &str,
    ) -> usize {
        (**self).count_tokens(text)
    }
}

/// Deterministic whitespace-split counter.
///
/// Useful as a stand-in where a real vocabulary is not needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenCounter;

impl TokenCounter for WhitespaceTokenCounter {
    fn count_tokens(
        &self,
        text: &str,
    ) -> usize {
        text.split_whitespace().count()
    }
}

/// Token and item counts of a batch (or of many batches).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchCount {
    /// Tokens counted.
    pub tokens: u64,

    /// Rows whose field held non-empty text.
    pub items: u64,
}

impl AddAssign for BatchCount {
    fn add_assign(
        &mut self,
        rhs: Self,
    ) {
        self.tokens += rhs.tokens;
        self.items += rhs.items;
    }
}

/// Count the tokens of a batch of field values.
///
/// Rows which are null, empty, or non-text contribute nothing: neither
/// tokens, nor an item.
pub fn count_batch<C: TokenCounter + ?Sized>(
    values: &[FieldValue],
    counter: &C,
) -> BatchCount {
    let mut count = BatchCount::default();
    for text in values.iter().filter_map(FieldValue::tokenizable) {
        count.tokens += counter.count_tokens(text) as u64;
        count.items += 1;
    }
    count
}
