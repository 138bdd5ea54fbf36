use std::path::Path;
use vard_core::datefmt::{format_date, DEFAULT_DATE_FORMAT};

pub fn execute(root: &Path, json: bool) -> anyhow::Result<()> {
    let engine = crate::open_engine(root)?;
    let list = engine.list_snapshots()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }
    if list.is_empty() {
        println!("No checkpoints yet.");
        return Ok(());
    }
    for cp in &list {
        let star = if cp.favorite { "*" } else { " " };
        let origin = if cp.agent_created { " [agent]" } else { "" };
        println!(
            "{star} {}  {}  {}{origin}",
            cp.id,
            format_date(cp.timestamp, DEFAULT_DATE_FORMAT),
            cp.description
        );
    }
    Ok(())
}
