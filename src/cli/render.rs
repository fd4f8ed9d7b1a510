use anyhow::Result;
use std::path::Path;

use crate::knowledge::table::render_markdown;
use crate::source::files::load_knowledge_base;

/// Parse a knowledge base file (JSON or markdown table) and print it in the
/// canonical layout. Rejected rows are reported through the log on stderr.
pub fn render(file: &Path, json: bool) -> Result<()> {
    let kb = load_knowledge_base(file)?;

    for issue in kb.validate() {
        eprintln!("warning: {issue}");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&kb)?);
    } else {
        println!("{}", render_markdown(&kb));
    }
    eprintln!("{} facts.", kb.len());
    Ok(())
}
