//! Line extraction from recognized text
//!
//! Normalizes raw OCR output into an ordered list of candidate item strings.
//! Heuristic only: no column parsing, no price/quantity separation.

use std::collections::HashSet;

/// A normalized candidate item string derived from recognized text
pub type LineItem = String;

/// Trimmed lines must be longer than this to count as an item
const MIN_LINE_LEN: usize = 2;

/// Split recognized text into candidate line items.
///
/// Keeps a line iff its trimmed length exceeds `MIN_LINE_LEN` and it contains
/// at least one alphanumeric character, which drops separator rows and
/// whitespace-only OCR artifacts. Order is preserved; duplicate lines
/// collapse to their first occurrence.
pub fn extract(raw_text: &str) -> Vec<LineItem> {
    let mut items = Vec::new();
    let mut seen = HashSet::new();

    for line in raw_text.lines() {
        let line = line.trim();
        if line.chars().count() <= MIN_LINE_LEN {
            continue;
        }
        if !line.chars().any(|c| c.is_ascii_alphanumeric()) {
            continue;
        }
        if seen.insert(line.to_string()) {
            items.push(line.to_string());
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_drops_short_and_blank_lines() {
        let items = extract("Milk\n\nBread 2.50\nx\nEGGS");
        assert_eq!(items, vec!["Milk", "Bread 2.50", "EGGS"]);
    }

    #[test]
    fn test_extract_drops_separator_rows() {
        let items = extract("-----\nOlive Oil\n=====\n***");
        assert_eq!(items, vec!["Olive Oil"]);
    }

    #[test]
    fn test_extract_trims_whitespace() {
        let items = extract("  Rye Bread  \n\t Butter 1.80 ");
        assert_eq!(items, vec!["Rye Bread", "Butter 1.80"]);
    }

    #[test]
    fn test_extract_handles_crlf_line_breaks() {
        let items = extract("Milk\r\nBread\r\n");
        assert_eq!(items, vec!["Milk", "Bread"]);
    }

    #[test]
    fn test_extract_collapses_duplicates_keeping_first() {
        let items = extract("Coffee\nMilk\nCoffee\nSugar\nMilk");
        assert_eq!(items, vec!["Coffee", "Milk", "Sugar"]);
    }

    #[test]
    fn test_extract_empty_input() {
        assert!(extract("").is_empty());
        assert!(extract("\n\n  \n").is_empty());
    }

    #[test]
    fn test_extract_keeps_barcode_lines() {
        let items = extract("0123456789012\nOlive Oil");
        assert_eq!(items, vec!["0123456789012", "Olive Oil"]);
    }
}
