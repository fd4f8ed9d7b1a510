//! Response parser: turns an LLM's markdown-table reply into a validated
//! [`KnowledgeBase`].
//!
//! The reply is not trusted to be well-formed. The fact table is located by
//! its first numbered row, so prose, headers and any other table before it are
//! ignored. Each malformed row inside the table is dropped with a
//! [`ParseWarning`] instead of failing the whole reply. Only a
//! reply with no usable rows at all is an error, so an accidental empty
//! result can never replace real data.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::table::{
    is_separator, split_row, strip_all_emphasis, strip_wrapping_emphasis, unescape_cell,
    COLUMNS, DATE_FORMAT,
};
use super::types::{Fact, KnowledgeBase};

/// Returned when a reply contains no parseable fact rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("response contained no valid fact rows ({rejected_rows} rows rejected)")]
pub struct EmptyKnowledgeBase {
    pub rejected_rows: usize,
    /// Warnings gathered before giving up, kept for the processing log.
    pub warnings: Vec<ParseWarning>,
}

/// A non-fatal defect found while reading the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A table row that could not be turned into a fact; the row was dropped.
    MalformedRow {
        line: usize,
        row: String,
        reason: String,
    },
    /// A second row reused a fact number; the first occurrence was kept.
    DuplicateNumber { line: usize, number: u32 },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedRow { row, reason, .. } => {
                write!(f, "Failed to parse table row: {row} ({reason})")
            }
            Self::DuplicateNumber { line, number } => write!(
                f,
                "Duplicate fact number {number} on line {line}; keeping the first occurrence"
            ),
        }
    }
}

/// Successful parse: the new knowledge base plus every row-level warning.
#[derive(Debug, Clone)]
pub struct ParsedKnowledgeBase {
    pub knowledge_base: KnowledgeBase,
    pub warnings: Vec<ParseWarning>,
}

/// Parse a reply into a knowledge base.
///
/// The table starts at the first row with exactly three cells whose first cell
/// is an integer. Everything before it is preamble, including header rows and
/// any other table the reply opens with. The title is the last `# ` heading in
/// the preamble, or `fallback_title` when there is none. The table ends at the
/// first non-blank line that is not a row.
pub fn parse_knowledge_base(
    raw: &str,
    fallback_title: &str,
) -> Result<ParsedKnowledgeBase, EmptyKnowledgeBase> {
    let mut warnings = Vec::new();
    let mut rejected_rows = 0usize;
    let mut title: Option<String> = None;
    let mut facts: BTreeMap<u32, Fact> = BTreeMap::new();
    let mut in_table = false;

    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        let cells = split_row(trimmed);

        if !in_table {
            match &cells {
                Some(cells) if starts_table(cells) => in_table = true,
                Some(_) => continue,
                None => {
                    if let Some(heading) = parse_heading(trimmed) {
                        title = Some(heading);
                    }
                    continue;
                }
            }
        }

        let Some(cells) = cells else {
            if trimmed.is_empty() {
                continue;
            }
            // Postamble: anything after the table is ignored.
            break;
        };

        if is_separator(&cells) || is_header(&cells) {
            continue;
        }

        match parse_row(&cells) {
            Ok(fact) => {
                if facts.contains_key(&fact.number) {
                    tracing::warn!(number = fact.number, line = line_no, "duplicate fact number");
                    warnings.push(ParseWarning::DuplicateNumber {
                        line: line_no,
                        number: fact.number,
                    });
                } else {
                    facts.insert(fact.number, fact);
                }
            }
            Err(reason) => {
                tracing::warn!(line = line_no, %reason, "failed to parse table row");
                rejected_rows += 1;
                warnings.push(ParseWarning::MalformedRow {
                    line: line_no,
                    row: trimmed.to_string(),
                    reason,
                });
            }
        }
    }

    if facts.is_empty() {
        return Err(EmptyKnowledgeBase {
            rejected_rows,
            warnings,
        });
    }

    let title = title.unwrap_or_else(|| fallback_title.to_string());
    Ok(ParsedKnowledgeBase {
        knowledge_base: KnowledgeBase::new(title, facts.into_values().collect()),
        warnings,
    })
}

/// First row of the fact table: three cells, the first an integer.
fn starts_table(cells: &[String]) -> bool {
    cells.len() == COLUMNS.len() && strip_all_emphasis(&cells[0]).parse::<u32>().is_ok()
}

/// A row whose first cell is the `#` column label.
fn is_header(cells: &[String]) -> bool {
    cells
        .first()
        .map(|c| strip_all_emphasis(c) == "#")
        .unwrap_or(false)
}

fn parse_row(cells: &[String]) -> Result<Fact, String> {
    if cells.len() != COLUMNS.len() {
        return Err(format!("expected 3 cells, found {}", cells.len()));
    }

    let number_text = strip_all_emphasis(&cells[0]);
    let number: u32 = number_text
        .parse()
        .map_err(|_| format!("fact number {number_text:?} is not a positive integer"))?;
    if number == 0 {
        return Err("fact number must be at least 1".into());
    }

    let description = unescape_cell(&strip_wrapping_emphasis(&cells[1]));
    let description = description.trim();
    if description.is_empty() {
        return Err("description is empty".into());
    }

    let date_text = strip_all_emphasis(&cells[2]);
    let last_validated = NaiveDate::parse_from_str(&date_text, DATE_FORMAT)
        .map_err(|_| format!("{date_text:?} is not a YYYY-MM-DD date"))?;

    Ok(Fact::new(number, description, last_validated))
}

/// A level-one `# Title` heading, emphasis removed. Deeper headings are
/// section labels, not titles.
fn parse_heading(line: &str) -> Option<String> {
    let rest = line.strip_prefix('#')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = strip_wrapping_emphasis(rest.trim().trim_end_matches('#').trim());
    (!text.is_empty()).then_some(text)
}
