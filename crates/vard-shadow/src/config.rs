use crate::paths::write_atomic;
use serde_json::{Map, Value};
use std::path::Path;

/// Default retention period for `gc`, in days.
pub const DEFAULT_KEEP_DAYS: i64 = 30;

/// Typed view of the recognized config keys.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Commit message template (`${branch}`, `${date}` placeholders).
    pub template: Option<String>,
    /// Display date format (`yyyy,MM,dd,HH,mm,ss` tokens).
    pub date_format: Option<String>,
    /// Extra ignore patterns, unioned with the built-in defaults.
    pub ignore_patterns: Vec<String>,
    /// Retention period in days; zero or negative disables cleanup.
    pub keep_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            template: None,
            date_format: None,
            ignore_patterns: Vec::new(),
            keep_days: DEFAULT_KEEP_DAYS,
        }
    }
}

impl EngineConfig {
    /// Build a typed config from a raw dotted-key map.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let string = |key: &str| {
            map.get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        let ignore_patterns = match map.get("snapshot.ignore") {
            Some(Value::Array(arr)) => arr
                .iter()
                .filter_map(|v| v.as_str())
                .map(String::from)
                .collect(),
            // A plain string is read as comma-separated patterns.
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        };
        let keep_days = map
            .get("gc.keep_days")
            .and_then(|v| v.as_i64())
            .unwrap_or(DEFAULT_KEEP_DAYS);
        Self {
            template: string("snapshot.template"),
            date_format: string("snapshot.date_format"),
            ignore_patterns,
            keep_days,
        }
    }
}

/// Load the typed config from `config.json`. Missing file means defaults.
pub fn load(path: &Path) -> anyhow::Result<EngineConfig> {
    Ok(EngineConfig::from_map(&read_map(path)?))
}

/// Read raw config as a flat map. Returns empty map if file doesn't exist.
pub fn read_map(path: &Path) -> anyhow::Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let content = std::fs::read_to_string(path)?;
    let val: Value = serde_json::from_str(&content)?;
    match val {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Write the raw config map back to disk.
pub fn write_map(path: &Path, map: &Map<String, Value>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(map)?;
    write_atomic(path, json.as_bytes())
}

/// Parse a string value into an appropriate JSON value
/// (bool/number/array/string). Arrays are given as JSON, for list-valued
/// keys like `snapshot.ignore`.
pub fn parse_value(s: &str) -> Value {
    match s {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(n) = s.parse::<i64>() {
                return Value::Number(n.into());
            }
            if s.trim_start().starts_with('[') {
                if let Ok(arr @ Value::Array(_)) = serde_json::from_str(s) {
                    return arr;
                }
            }
            Value::String(s.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = load(Path::new("/nonexistent/config.json")).unwrap();
        assert!(cfg.template.is_none());
        assert!(cfg.ignore_patterns.is_empty());
        assert_eq!(cfg.keep_days, DEFAULT_KEEP_DAYS);
    }

    #[test]
    fn typed_view_reads_dotted_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "snapshot.template": "${branch} :: ${date}",
                "snapshot.date_format": "dd.MM.yyyy",
                "snapshot.ignore": ["*.iso", "scratch/"],
                "gc.keep_days": 7
            }"#,
        )
        .unwrap();
        let cfg = load(&path).unwrap();
        assert_eq!(cfg.template.as_deref(), Some("${branch} :: ${date}"));
        assert_eq!(cfg.date_format.as_deref(), Some("dd.MM.yyyy"));
        assert_eq!(cfg.ignore_patterns, vec!["*.iso", "scratch/"]);
        assert_eq!(cfg.keep_days, 7);
    }

    #[test]
    fn parse_value_types() {
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("14"), Value::Number(14.into()));
        assert_eq!(parse_value("main"), Value::String("main".into()));
        assert_eq!(
            parse_value(r#"["*.iso", "scratch/"]"#),
            serde_json::json!(["*.iso", "scratch/"])
        );
        // Malformed array input stays a string rather than erroring.
        assert_eq!(parse_value("[broken"), Value::String("[broken".into()));
    }

    #[test]
    fn set_value_for_ignore_key_reaches_the_typed_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let mut map = read_map(&path).unwrap();
        map.insert("snapshot.ignore".into(), parse_value(r#"["*.iso"]"#));
        write_map(&path, &map).unwrap();
        let cfg = load(&path).unwrap();
        assert_eq!(cfg.ignore_patterns, vec!["*.iso"]);
    }

    #[test]
    fn comma_separated_ignore_string_is_accepted() {
        let mut map = Map::new();
        map.insert("snapshot.ignore".into(), Value::String("*.iso, scratch/".into()));
        let cfg = EngineConfig::from_map(&map);
        assert_eq!(cfg.ignore_patterns, vec!["*.iso", "scratch/"]);
    }

    #[test]
    fn write_then_read_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let mut map = Map::new();
        map.insert("gc.keep_days".into(), Value::Number(3.into()));
        write_map(&path, &map).unwrap();
        let back = read_map(&path).unwrap();
        assert_eq!(back.get("gc.keep_days"), Some(&Value::Number(3.into())));
    }
}
