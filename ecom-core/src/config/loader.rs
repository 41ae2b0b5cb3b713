use std::collections::HashMap;
use std::path::Path;

use serde_yaml::Value as Yaml;

use super::value::ConfigValue;
use super::ConfigError;

pub(crate) type Values = HashMap<String, ConfigValue>;

/// Merge a YAML file into `values`. Absent files are skipped.
pub(crate) fn load_yaml_file(path: &Path, values: &mut Values) -> Result<(), ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(ConfigError::Load(format!("cannot read {}: {err}", path.display()))),
    };
    load_yaml_str(&content, values)
        .map_err(|err| ConfigError::Load(format!("{}: {err}", path.display())))
}

pub(crate) fn load_yaml_str(content: &str, values: &mut Values) -> Result<(), ConfigError> {
    let root: Yaml =
        serde_yaml::from_str(content).map_err(|err| ConfigError::Load(err.to_string()))?;
    flatten(&mut Vec::new(), &root, values);
    Ok(())
}

/// Walk the tree, writing each leaf under its dotted path.
///
/// A sequence is written both as a whole `List` and per element
/// (`hosts.0`, `hosts.1`), so `APP_HOSTS_0` can replace one entry.
fn flatten(path: &mut Vec<String>, node: &Yaml, out: &mut Values) {
    match node {
        Yaml::Mapping(map) => {
            for (name, child) in map {
                path.push(segment(name));
                flatten(path, child, out);
                path.pop();
            }
        }
        _ if path.is_empty() => {}
        Yaml::Sequence(items) => {
            out.insert(path.join("."), ConfigValue::from(node));
            for (idx, item) in items.iter().enumerate() {
                path.push(idx.to_string());
                flatten(path, item, out);
                path.pop();
            }
        }
        leaf => {
            out.insert(path.join("."), ConfigValue::from(leaf));
        }
    }
}

fn segment(name: &Yaml) -> String {
    ConfigValue::from(name)
        .as_text()
        .unwrap_or_else(|| format!("{name:?}"))
}
