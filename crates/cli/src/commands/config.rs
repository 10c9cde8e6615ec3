use crate::config::{FileConfig, CONFIG_FILE_NAME};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use toml::Value;

const TEMPLATE: &str = r#"# memsearch configuration
paths = []
# debounce_ms = 1500

[provider]
name = "openai"
# model = "text-embedding-3-small"

[milvus]
uri = "http://localhost:19530"
collection = "memsearch_chunks"
"#;

/// Write a starter config file. Refuses to overwrite an existing one.
pub fn config_init(explicit: Option<&Path>) -> Result<()> {
    let path = target_path(explicit);
    if path.exists() {
        bail!(
            "config file already exists: {} (use `memsearch config set` to modify it)",
            path.display()
        );
    }
    std::fs::write(&path, TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Print one value by dotted key, e.g. `provider.name` or `milvus.uri`.
pub fn config_get(explicit: Option<&Path>, key: &str) -> Result<()> {
    let path = target_path(explicit);
    if !path.exists() {
        bail!(
            "config file not found: {} (run `memsearch config init` first)",
            path.display()
        );
    }
    let root = read_value(&path)?;
    let value = lookup(&root, key).with_context(|| format!("key not found: {key}"))?;
    match value {
        Value::String(s) => println!("{s}"),
        other => println!("{other}"),
    }
    Ok(())
}

/// Set one value by dotted key, creating the file and any intermediate
/// tables as needed. Keys the config loader would reject are refused.
pub fn config_set(explicit: Option<&Path>, key: &str, value: &str) -> Result<()> {
    let path = target_path(explicit);
    let text = if path.exists() {
        Some(
            std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?,
        )
    } else {
        None
    };
    let updated = apply_set(text.as_deref(), key, value)?;
    std::fs::write(&path, updated)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Set {key} = {value}");
    Ok(())
}

/// Print the config file as stored.
pub fn config_list(explicit: Option<&Path>) -> Result<()> {
    let path = target_path(explicit);
    if !path.exists() {
        println!("No config file found. Run `memsearch config init` to create one.");
        return Ok(());
    }
    println!("# {}", path.display());
    print!(
        "{}",
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?
    );
    Ok(())
}

/// Edits always target an explicit `--config` path or the working-directory
/// file, never the home-directory fallback.
fn target_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), Path::to_path_buf)
}

fn read_value(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn apply_set(text: Option<&str>, key: &str, value: &str) -> Result<String> {
    let mut root: Value = match text {
        Some(text) => toml::from_str(text).context("existing config is not valid TOML")?,
        None => Value::Table(toml::map::Map::new()),
    };

    let mut parts: Vec<&str> = key.split('.').collect();
    let last = parts.pop().unwrap_or_default();
    if last.is_empty() || parts.iter().any(|p| p.is_empty()) {
        bail!("invalid key: {key:?}");
    }

    let mut current = &mut root;
    for part in parts {
        let table = current
            .as_table_mut()
            .with_context(|| format!("`{part}` in `{key}` is not a table"))?;
        current = table
            .entry(part)
            .or_insert_with(|| Value::Table(toml::map::Map::new()));
    }
    current
        .as_table_mut()
        .with_context(|| format!("`{key}` does not name a settable value"))?
        .insert(last.to_string(), parse_scalar(value));

    let updated = toml::to_string_pretty(&root)?;
    toml::from_str::<FileConfig>(&updated)
        .with_context(|| format!("`{key}` is not a recognized setting"))?;
    Ok(updated)
}

/// Bare integers and booleans keep their TOML type; everything else is a
/// string.
fn parse_scalar(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Integer(int);
    }
    if let Ok(boolean) = raw.parse::<bool>() {
        return Value::Boolean(boolean);
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn template_is_loadable() {
        assert!(toml::from_str::<FileConfig>(TEMPLATE).is_ok());
    }

    #[test]
    fn set_creates_nested_tables_from_scratch() {
        let text = apply_set(None, "provider.name", "ollama").unwrap();
        let root: Value = toml::from_str(&text).unwrap();
        assert_eq!(
            lookup(&root, "provider.name"),
            Some(&Value::String("ollama".to_string()))
        );
    }

    #[test]
    fn set_preserves_unrelated_values_and_types() {
        let text = apply_set(Some("paths = [\"notes\"]\n"), "debounce_ms", "500").unwrap();
        let root: Value = toml::from_str(&text).unwrap();
        assert_eq!(lookup(&root, "debounce_ms"), Some(&Value::Integer(500)));
        assert_eq!(
            lookup(&root, "paths"),
            Some(&Value::Array(vec![Value::String("notes".to_string())]))
        );
    }

    #[test]
    fn set_rejects_unknown_keys() {
        assert!(apply_set(None, "provider.temperature", "0.2").is_err());
        assert!(apply_set(None, "debouce_ms", "100").is_err());
    }

    #[test]
    fn set_rejects_empty_key_segments() {
        assert!(apply_set(None, "", "x").is_err());
        assert!(apply_set(None, "provider.", "x").is_err());
    }

    #[test]
    fn lookup_follows_dotted_paths() {
        let root: Value = toml::from_str("[milvus]\nuri = \"http://m:19530\"\n").unwrap();
        assert_eq!(
            lookup(&root, "milvus.uri"),
            Some(&Value::String("http://m:19530".to_string()))
        );
        assert_eq!(lookup(&root, "milvus.token"), None);
    }
}
