// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

//! Fast token estimation.
//!
//! No real tokenizer is involved: [`HeuristicEstimator`] averages a
//! word-based and a character-based guess. Treat the numbers as a budget
//! signal, not as what a model will actually count.
//!
//! # Example
//!
//! ```
//! use ctxpack::packer::tokenizer::{HeuristicEstimator, TokenEstimator, format_tokens};
//!
//! let estimator = HeuristicEstimator::default();
//! let tokens = estimator.estimate("fn main() {}");
//! assert_eq!(format_tokens(tokens), tokens.to_string());
//! ```

use super::config::PackerConfig;

/// Estimates how many tokens a text will cost.
pub trait TokenEstimator: Send + Sync {
    /// Estimate the token count of `text`. Must be deterministic.
    fn estimate(&self, text: &str) -> usize;
}

/// Average of `words * tokens_per_word` and `chars * tokens_per_char`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicEstimator {
    tokens_per_word: f64,
    tokens_per_char: f64,
}

impl HeuristicEstimator {
    pub fn new(tokens_per_word: f64, tokens_per_char: f64) -> Self {
        Self {
            tokens_per_word,
            tokens_per_char,
        }
    }

    pub fn from_config(config: &PackerConfig) -> Self {
        Self::new(config.tokens_per_word(), config.tokens_per_char())
    }
}

impl Default for HeuristicEstimator {
    fn default() -> Self {
        Self::new(1.3, 0.25)
    }
}

impl TokenEstimator for HeuristicEstimator {
    fn estimate(&self, text: &str) -> usize {
        let words = text.split_whitespace().count();
        let chars = text.chars().count();

        // Each side is floored before averaging.
        let word_tokens = (words as f64 * self.tokens_per_word) as usize;
        let char_tokens = (chars as f64 * self.tokens_per_char) as usize;

        (word_tokens + char_tokens) / 2
    }
}

/// Render a token count compactly: `1.5M`, `12.3K`, or the bare number.
pub fn format_tokens(tokens: usize) -> String {
    if tokens >= 1_000_000 {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    } else if tokens >= 1_000 {
        format!("{:.1}K", tokens as f64 / 1_000.0)
    } else {
        tokens.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_zero() {
        assert_eq!(HeuristicEstimator::default().estimate(""), 0);
        assert_eq!(HeuristicEstimator::default().estimate("   \n\t"), 0);
    }

    #[test]
    fn test_documented_formula() {
        let estimator = HeuristicEstimator::default();
        // 2 words -> floor(2.6) = 2; 11 chars -> floor(2.75) = 2; (2 + 2) / 2 = 2
        assert_eq!(estimator.estimate("hello world"), 2);

        // 100 words of "abcd" separated by spaces: 499 chars.
        // words: floor(130.0) = 130; chars: floor(124.75) = 124; (130 + 124) / 2 = 127
        let text = vec!["abcd"; 100].join(" ");
        assert_eq!(estimator.estimate(&text), 127);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let estimator = HeuristicEstimator::new(1.0, 1.0);
        // One word, four characters (twelve bytes).
        assert_eq!(estimator.estimate("\u{d55c}\u{ae00}\u{d14c}\u{c2a4}"), 2);
    }

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(0), "0");
        assert_eq!(format_tokens(999), "999");
        assert_eq!(format_tokens(1_000), "1.0K");
        assert_eq!(format_tokens(12_345), "12.3K");
        assert_eq!(format_tokens(1_000_000), "1.0M");
        assert_eq!(format_tokens(2_560_000), "2.6M");
    }
}
