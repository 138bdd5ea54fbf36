use std::path::Path;

pub fn execute(root: &Path, id: &str) -> anyhow::Result<()> {
    let engine = crate::open_engine(root)?;
    engine.delete_snapshot(id)?;
    println!("Checkpoint {id} removed from listings.");
    Ok(())
}
