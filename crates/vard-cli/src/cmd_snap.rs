use std::path::Path;
use vard_shadow::SnapshotOutcome;

pub fn execute(root: &Path, message: Option<&str>) -> anyhow::Result<()> {
    let engine = crate::open_engine(root)?;
    let branch = engine.project_branch();
    match engine.create_snapshot(&branch, message)? {
        SnapshotOutcome::Created(cp) => {
            println!("Created checkpoint {}: {}", cp.id, cp.description);
        }
        SnapshotOutcome::NoChanges => {
            println!("Nothing to checkpoint: working tree unchanged.");
        }
    }
    Ok(())
}
