//! Quote-aware CSV tokenizer for published-spreadsheet exports.
//!
//! Google Sheets quotes any cell containing a comma, a double quote, or a
//! newline, and doubles embedded quotes. Commas and newlines are only
//! separators outside quoted fields.

/// Split raw CSV text into rows of trimmed, unquoted fields.
///
/// Never fails: degenerate input produces fewer (or zero) rows, and a
/// malformed final field is flushed as-is.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field decodes to a literal quote.
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                row.push(finish_field(&mut field));
            }
            '\n' if !in_quotes => {
                row.push(finish_field(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(finish_field(&mut field));
        rows.push(row);
    }

    rows
}

/// Tokenize and split off the header row.
///
/// Header-only or empty input yields an empty record set, not an error.
/// Rows consisting solely of empty fields are dropped.
#[must_use]
pub fn header_and_rows(text: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rows = tokenize(text);
    if rows.len() < 2 {
        return (Vec::new(), Vec::new());
    }

    let header = rows.remove(0);
    rows.retain(|row| row.iter().any(|f| !f.is_empty()));
    (header, rows)
}

fn finish_field(field: &mut String) -> String {
    // Carriage returns arrive with \r\n exports; whitespace is trimmed
    // after unquoting.
    let done = std::mem::take(field);
    done.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_rows() {
        let rows = tokenize("a,b,c\n1,2,3");
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_quoted_comma_round_trips() {
        let rows = tokenize("Location\n\"Siem Reap, Cambodia\"");
        assert_eq!(rows[1], vec!["Siem Reap, Cambodia"]);
    }

    #[test]
    fn test_doubled_quote_decodes_to_literal() {
        let rows = tokenize("a\n\"say \"\"hi\"\"\"");
        assert_eq!(rows[1], vec!["say \"hi\""]);
    }

    #[test]
    fn test_newline_inside_quotes_stays_in_field() {
        let rows = tokenize("a,b\n\"line one\nline two\",x");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["line one\nline two", "x"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let rows = tokenize("a,b\r\n1,2\r\n");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let rows = tokenize("  a  , b \n 1,2  ");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_trailing_empty_field() {
        let rows = tokenize("a,b,\n1,,");
        assert_eq!(rows, vec![vec!["a", "b", ""], vec!["1", "", ""]]);
    }

    #[test]
    fn test_header_only_yields_empty() {
        let (header, rows) = header_and_rows("Day,Location,Start");
        assert!(header.is_empty());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty() {
        let (header, rows) = header_and_rows("");
        assert!(header.is_empty());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_blank_rows_are_dropped() {
        let (header, rows) = header_and_rows("a,b\n,\n1,2\n , ");
        assert_eq!(header, vec!["a", "b"]);
        assert_eq!(rows, vec![vec!["1", "2"]]);
    }

    proptest! {
        /// Any cell content survives a quote-escaped encoding.
        #[test]
        fn prop_quoted_cell_round_trips(cell in "[ -~]{0,40}") {
            let encoded = format!("h\n\"{}\"", cell.replace('"', "\"\""));
            let rows = tokenize(&encoded);
            prop_assert_eq!(rows[1][0].as_str(), cell.trim());
        }

        /// Row and field counts are stable for unquoted alphanumeric grids.
        #[test]
        fn prop_grid_shape(rows in 1usize..6, cols in 1usize..6) {
            let text = (0..rows)
                .map(|r| {
                    (0..cols).map(|c| format!("c{r}x{c}")).collect::<Vec<_>>().join(",")
                })
                .collect::<Vec<_>>()
                .join("\n");
            let parsed = tokenize(&text);
            prop_assert_eq!(parsed.len(), rows);
            prop_assert!(parsed.iter().all(|r| r.len() == cols));
        }
    }
}
