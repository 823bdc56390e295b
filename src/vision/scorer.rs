//! Receipt confidence scoring
//!
//! Classifies recognized text as receipt-like or not using weighted keyword
//! evidence. A single strong indicator is high-precision on its own; weak
//! indicators are individually ambiguous and need corroboration.

/// High-precision receipt vocabulary; one hit is enough
const STRONG_INDICATORS: &[&str] = &["total", "subtotal", "receipt", "invoice"];
/// Ambiguous vocabulary; two or more hits are required
const WEAK_INDICATORS: &[&str] = &["price", "tax", "amount", "date", "$", "€", "£"];

/// Outcome of scoring one block of recognized text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreVerdict {
    /// Whether the text looks like it came from a receipt
    pub is_receipt: bool,
    /// Number of distinct strong indicators present
    pub strong_matches: usize,
    /// Number of distinct weak indicators present
    pub weak_matches: usize,
}

/// Count indicator hits in the text, case-insensitively.
///
/// Stateless; recomputed for every recognition result.
pub fn score(text: &str) -> ScoreVerdict {
    let haystack = text.to_lowercase();

    let strong_matches = STRONG_INDICATORS
        .iter()
        .filter(|kw| haystack.contains(**kw))
        .count();
    let weak_matches = WEAK_INDICATORS
        .iter()
        .filter(|kw| haystack.contains(**kw))
        .count();

    ScoreVerdict {
        is_receipt: strong_matches >= 1 || weak_matches >= 2,
        strong_matches,
        weak_matches,
    }
}
