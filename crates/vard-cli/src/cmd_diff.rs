use std::path::Path;

pub fn execute(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let engine = crate::open_engine(root)?;
    let diff = engine.snapshot_diff_files(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
        return Ok(());
    }
    if diff.is_empty() {
        println!("Working tree matches checkpoint {id}.");
        return Ok(());
    }
    for file in &diff {
        println!(
            "{:<9} +{:<5} -{:<5} {}",
            file.status.to_string(),
            file.insertions,
            file.deletions,
            file.path
        );
    }
    println!("{} file(s) differ from checkpoint {id}", diff.len());
    Ok(())
}
