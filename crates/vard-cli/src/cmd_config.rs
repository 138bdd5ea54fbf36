use clap::Subcommand;
use vard_shadow::{config, paths};

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a config value
    Set {
        /// Config key (e.g. gc.keep_days, snapshot.template)
        key: String,
        /// Config value (true/false/number/string, or a JSON array for
        /// list keys like snapshot.ignore)
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd) -> anyhow::Result<()> {
    let path = paths::config_path();
    match cmd {
        ConfigCmd::Set { key, value } => {
            let mut map = config::read_map(&path)?;
            map.insert(key.clone(), config::parse_value(&value));
            config::write_map(&path, &map)?;
            println!("{key} = {value}");
            Ok(())
        }
        ConfigCmd::Get { key } => {
            let map = config::read_map(&path)?;
            match map.get(&key) {
                Some(value) => println!("{value}"),
                None => println!("(not set)"),
            }
            Ok(())
        }
        ConfigCmd::List => {
            let map = config::read_map(&path)?;
            if map.is_empty() {
                println!("No config values set.");
                return Ok(());
            }
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (key, value) in entries {
                println!("{key} = {value}");
            }
            Ok(())
        }
    }
}
