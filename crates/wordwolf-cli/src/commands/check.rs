use std::path::Path;

pub fn run(file: &Path) -> Result<(), String> {
    let themes = super::load_topics(file)?;

    if themes.is_empty() {
        return Err(format!("{} contains no topics", file.display()));
    }

    let words: usize = themes.topics().iter().map(|t| t.words().len()).sum();
    println!("  All checks passed for '{}'.", file.display());
    println!("  {} topics, {} words", themes.len(), words);

    Ok(())
}
