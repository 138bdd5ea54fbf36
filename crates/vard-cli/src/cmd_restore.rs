use std::io::Write;
use std::path::Path;

pub fn execute(root: &Path, id: &str, force: bool) -> anyhow::Result<()> {
    if !force && !confirm(id)? {
        println!("Aborted.");
        return Ok(());
    }
    let engine = crate::open_engine(root)?;
    engine.restore_snapshot(id)?;
    println!("Restored working tree to checkpoint {id}.");
    Ok(())
}

/// Restore discards all uncommitted work; require an explicit yes.
fn confirm(id: &str) -> anyhow::Result<bool> {
    eprint!("Restoring {id} discards all uncommitted changes in this project. Continue? [y/N] ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
