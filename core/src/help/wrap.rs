//! Greedy word wrapping.

/// Wraps text to `width` columns, breaking only between words.
///
/// Explicit line breaks are kept, so blank lines separate paragraphs in the
/// output as they did in the input. A line's leading indentation is kept and
/// repeated on its continuation lines; other runs of whitespace collapse to
/// one space. A word longer than the remaining width gets a line of its own.
///
/// # Examples
///
/// ```
/// use console_grammar_core::help::wrap;
///
/// let lines = wrap("the quick brown fox\n\njumps over", 10);
/// assert_eq!(lines, vec!["the quick", "brown fox", "", "jumps over"]);
/// ```
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let body = paragraph.trim_start();
        if body.is_empty() {
            lines.push(String::new());
            continue;
        }
        let indent = &paragraph[..paragraph.len() - body.len()];

        let mut current = indent.to_string();
        let mut started = false;
        for word in body.split_whitespace() {
            if !started {
                current.push_str(word);
                started = true;
            } else if current.chars().count() + 1 + word.chars().count() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::replace(&mut current, indent.to_string()));
                current.push_str(word);
            }
        }
        lines.push(current);
    }

    lines
}

/// Lays out one table row: `label` padded to `column`, then `text` wrapped
/// into the remaining width with continuation lines aligned under it.
pub(crate) fn table_row(label: &str, text: &str, column: usize, width: usize) -> String {
    if text.trim().is_empty() {
        return label.to_string();
    }

    let available = width.saturating_sub(column).max(MIN_HELP_COLUMN);
    let indent = " ".repeat(column);
    let mut out = format!("{label:<column$}");
    for (i, line) in wrap(text, available).iter().enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(&indent);
        }
        out.push_str(line);
    }
    out
}

/// Narrowest help column used when labels eat most of the width.
const MIN_HELP_COLUMN: usize = 20;
