use std::path::Path;

pub fn execute(root: &Path, id: &str) -> anyhow::Result<()> {
    let engine = crate::open_engine(root)?;
    for path in engine.snapshot_file_names(id)? {
        println!("{path}");
    }
    Ok(())
}
