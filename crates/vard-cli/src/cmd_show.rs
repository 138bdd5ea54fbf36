use std::path::Path;

pub fn execute(root: &Path, id: &str, path: &str) -> anyhow::Result<()> {
    let engine = crate::open_engine(root)?;
    print!("{}", engine.snapshot_file_content(id, path)?);
    Ok(())
}
