use std::path::Path;
use vard_shadow::{config, paths};

pub fn execute(root: &Path, keep_days_override: Option<i64>) -> anyhow::Result<()> {
    let cfg = config::load(&paths::config_path())?;
    let keep_days = keep_days_override.unwrap_or(cfg.keep_days);
    if keep_days <= 0 {
        println!("Retention cleanup is disabled (gc.keep_days <= 0).");
        return Ok(());
    }
    let engine = crate::open_engine(root)?;
    let count = engine.delete_old_snapshots(keep_days)?;
    println!("Tombstoned {count} checkpoint(s) older than {keep_days} day(s).");
    Ok(())
}
