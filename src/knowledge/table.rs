//! The markdown-table layout shared by the prompt, the response parser and
//! any output sink.
//!
//! ```text
//! # Current RN Project Facts
//!
//! | **#** | **Fact** | **Time Last Validated** |
//! | ----- | -------- | ----------------------- |
//! | **1** | ARR is $8.5M | 2025-06-04 |
//! ```

use super::types::{Fact, KnowledgeBase};

/// Column labels, in order.
pub const COLUMNS: [&str; 3] = ["#", "Fact", "Time Last Validated"];

pub const HEADER_ROW: &str = "| **#** | **Fact** | **Time Last Validated** |";
pub const SEPARATOR_ROW: &str = "| ----- | -------- | ----------------------- |";

/// Format used for `last_validated` in every rendering.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const LINE_BREAK: &str = "<br>";

/// Render a single fact as a table row.
pub fn render_row(fact: &Fact) -> String {
    format!(
        "| **{}** | {} | {} |",
        fact.number,
        escape_cell(&fact.description),
        fact.last_validated.format(DATE_FORMAT)
    )
}

/// Render the header and one row per fact, without the title heading.
pub fn render_table(kb: &KnowledgeBase) -> String {
    let mut out = String::with_capacity(64 * (kb.facts.len() + 2));
    out.push_str(HEADER_ROW);
    out.push('\n');
    out.push_str(SEPARATOR_ROW);
    for fact in &kb.facts {
        out.push('\n');
        out.push_str(&render_row(fact));
    }
    out
}

/// Render the full document: title heading, blank line, table.
pub fn render_markdown(kb: &KnowledgeBase) -> String {
    format!("# {}\n\n{}", kb.title, render_table(kb))
}

/// Escape a description so it survives as one cell on one line and comes back
/// unchanged through [`unescape_cell`].
///
/// Backslashes and pipes are backslash-escaped, newlines become `<br>`, a
/// literal `<br>` becomes `\<br>`, and emphasis markers (`*`, `_`, `` ` ``) at
/// either end are backslash-escaped so they are not read back as formatting.
pub fn escape_cell(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let last = chars.len().saturating_sub(1);
    let mut out = String::with_capacity(text.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\\' | '|' => {
                out.push('\\');
                out.push(c);
            }
            '\r' if chars.get(i + 1) == Some(&'\n') => {}
            '\n' => out.push_str(LINE_BREAK),
            '<' if starts_with_line_break(&chars[i..]) => out.push_str("\\<"),
            '*' | '_' | '`' if i == 0 || i == last => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_cell`]. A backslash before any other character is kept.
pub fn unescape_cell(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => match chars.get(i + 1).copied() {
                Some(next) if matches!(next, '\\' | '|' | '<' | '*' | '_' | '`') => {
                    out.push(next);
                    i += 2;
                }
                _ => {
                    out.push('\\');
                    i += 1;
                }
            },
            '<' if starts_with_line_break(&chars[i..]) => {
                out.push('\n');
                i += LINE_BREAK.len();
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

fn starts_with_line_break(chars: &[char]) -> bool {
    chars.iter().copied().take(LINE_BREAK.len()).eq(LINE_BREAK.chars())
}

/// Split a table row into trimmed cells.
///
/// Splits on unescaped `|` only and drops the empty cells produced by the
/// leading and trailing delimiters. A line without a leading `|` is a row only
/// when it splits into exactly three cells (`1 | text | 2025-06-18`). Returns
/// `None` for anything else.
pub fn split_row(line: &str) -> Option<Vec<String>> {
    let line = line.trim();
    let Some(inner) = line.strip_prefix('|') else {
        let cells = split_cells(line);
        return (cells.len() == COLUMNS.len()).then_some(cells);
    };
    // A trailing `\|` is escaped content, not a closing delimiter.
    let inner = match inner.strip_suffix('|') {
        Some(rest) if !ends_with_escape(rest) => rest,
        _ => inner,
    };
    Some(split_cells(inner))
}

fn split_cells(inner: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            // Escapes stay in the cell; `unescape_cell` resolves them.
            '\\' => {
                current.push('\\');
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// True when `text` ends in an odd run of backslashes.
fn ends_with_escape(text: &str) -> bool {
    text.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// True when every cell is a markdown alignment rule such as `-----` or `:---:`.
pub fn is_separator(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|cell| {
            let cell = cell.trim();
            !cell.is_empty()
                && cell.contains('-')
                && cell.chars().all(|c| c == '-' || c == ':' || c == ' ')
        })
}

/// Remove all emphasis markers from a short token such as a number or a date.
pub fn strip_all_emphasis(cell: &str) -> String {
    cell.chars()
        .filter(|c| *c != '*' && *c != '_' && *c != '`')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Remove emphasis markers wrapping a whole cell (`**text**`, `_text_`, ...)
/// while leaving markers inside the text alone.
pub fn strip_wrapping_emphasis(cell: &str) -> String {
    let mut text = cell.trim();
    loop {
        let stripped = ["**", "__", "*", "_", "`"].iter().find_map(|marker| {
            text.strip_prefix(marker)
                .and_then(|rest| rest.strip_suffix(marker))
                .filter(|inner| !inner.trim().is_empty())
        });
        match stripped {
            Some(inner) => text = inner.trim(),
            None => return text.to_string(),
        }
    }
}
