use std::fs;
use std::path::Path;

const STARTER_TOPICS: &str = "\
# One topic per line: name|word,word,...
# Every topic needs at least two different words.
animals|dog,cat,rabbit,hamster
fruit|apple,pear,peach,plum
drinks|coffee,tea,cocoa
seasons|spring,summer,autumn,winter
";

pub fn run(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Err(format!("'{}' already exists", path.display()));
    }

    fs::write(path, STARTER_TOPICS)
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;

    println!("Created topic file '{}'", path.display());
    println!();
    println!("Get started:");
    println!("  wordwolf topics -f {}", path.display());
    println!("  wordwolf play -f {}", path.display());

    Ok(())
}
