use std::path::Path;

pub fn execute(root: &Path, id: &str, name: &str) -> anyhow::Result<()> {
    let engine = crate::open_engine(root)?;
    engine.rename_snapshot(id, name)?;
    println!("Renamed checkpoint {id} to {name:?}.");
    Ok(())
}
