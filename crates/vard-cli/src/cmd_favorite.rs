use std::path::Path;

pub fn execute(root: &Path, id: &str) -> anyhow::Result<()> {
    let engine = crate::open_engine(root)?;
    if engine.toggle_favorite(id)? {
        println!("Checkpoint {id} marked as favorite.");
    } else {
        println!("Checkpoint {id} is no longer a favorite.");
    }
    Ok(())
}
