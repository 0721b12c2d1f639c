use std::path::Path;

use comfy_table::{ContentArrangement, Table};

pub fn run(file: &Path, json: bool) -> Result<(), String> {
    let themes = super::load_topics(file)?;

    if json {
        let out = serde_json::to_string_pretty(themes.topics())
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        println!("{out}");
        return Ok(());
    }

    if themes.is_empty() {
        println!("  No topics found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Topic", "Words", "Count"]);

    for topic in themes.topics() {
        table.add_row(vec![
            topic.name().to_string(),
            topic.words().join(", "),
            topic.words().len().to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} topics", themes.len());

    Ok(())
}
