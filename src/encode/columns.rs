//! Fixed-width column helpers.
//!
//! Widths are counted in characters. On the text path every character is
//! ASCII and occupies one printer column; the raster path only uses these
//! to build separator strings.

/// Cut `s` to at most `width` characters. Never wraps.
pub fn truncate(s: &str, width: usize) -> &str {
    match s.char_indices().nth(width) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// A full-width rule made of `ch`.
pub fn separator(ch: char, width: usize) -> String {
    std::iter::repeat_n(ch, width).collect()
}

/// Left-justified label, right-justified amount.
///
/// The amount is never cut. The label is truncated to
/// `width - len(amount) - 1` so there is always at least one space between
/// the two; the row is exactly `width` long whenever
/// `width >= len(amount) + 2`.
///
/// ```
/// use escpos_receipt::encode::columns::two_column;
///
/// let row = two_column("Sub Total:", "Rs100.00", 24);
/// assert_eq!(row, "Sub Total:      Rs100.00");
/// assert_eq!(row.len(), 24);
/// ```
pub fn two_column(label: &str, amount: &str, width: usize) -> String {
    let amount_len = amount.chars().count();
    let label_room = width.saturating_sub(amount_len + 1);
    let label = truncate(label, label_room);
    let gap = width
        .saturating_sub(label.chars().count() + amount_len)
        .max(1);

    let mut row = String::with_capacity(width.max(label.len() + gap + amount.len()));
    row.push_str(label);
    row.extend(std::iter::repeat_n(' ', gap));
    row.push_str(amount);
    row
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_untouched() {
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(truncate("abc", 3), "abc");
    }

    #[test]
    fn test_truncate_cuts() {
        assert_eq!(truncate("abcdef", 4), "abcd");
        assert_eq!(truncate("abcdef", 0), "");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("કખગ", 2), "કખ");
    }

    #[test]
    fn test_separator() {
        assert_eq!(separator('-', 5), "-----");
        assert_eq!(separator('=', 42).len(), 42);
    }

    #[test]
    fn test_two_column_exact_width() {
        for width in [32usize, 42] {
            let row = two_column("Total Pending:", "Rs100.00", width);
            assert_eq!(row.len(), width);
            assert!(row.starts_with("Total Pending:"));
            assert!(row.ends_with("Rs100.00"));
        }
    }

    #[test]
    fn test_two_column_truncates_label_not_amount() {
        let row = two_column("A very long label that never fits", "Rs123456.78", 20);
        assert_eq!(row.len(), 20);
        assert!(row.ends_with(" Rs123456.78"));
        assert_eq!(row, "A very l Rs123456.78");
    }

    #[test]
    fn test_two_column_minimum_width() {
        // width == len(amount) + 2 leaves one label char and one space
        let row = two_column("Label", "Rs1.00", 8);
        assert_eq!(row, "L Rs1.00");
    }

    #[test]
    fn test_two_column_width_law_for_all_widths() {
        let amount = "Rs50.00";
        for width in amount.len() + 2..=64 {
            let row = two_column("Sub Total:", amount, width);
            assert_eq!(row.len(), width, "width {}", width);
            assert!(row.ends_with(amount));
        }
    }

    #[test]
    fn test_two_column_never_cuts_amount_when_too_narrow() {
        let row = two_column("Label", "Rs100.00", 4);
        assert_eq!(row, " Rs100.00");
    }
}
