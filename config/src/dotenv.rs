//! Parse `.env` file into a key-value map (no overwrite of existing env here; applied in lib).

use std::collections::HashMap;
use std::path::Path;

/// Path to `.env`: `override_dir` if given, else current directory. `None` when absent.
fn dotenv_path(override_dir: Option<&Path>) -> Option<std::path::PathBuf> {
    let dir = override_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())?;
    let path = dir.join(".env");
    (path.is_file()).then_some(path)
}

/// Minimal .env parser: lines as KEY=VALUE, skip empty and # comments, trim key and value.
///
/// * Empty value: `KEY=` or `KEY=""` yields key with value `""`.
/// * Comments: only lines starting with `#` (after trim) are skipped; `#` inside value is kept.
/// * Quotes: double-quoted values support `\"` escape; single-quoted values are stripped, no escape.
/// * No multiline or line continuation.
fn parse_dotenv(content: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        let raw = v.trim();
        let value = if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            raw[1..raw.len() - 1].replace("\\\"", "\"")
        } else if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
            raw[1..raw.len() - 1].to_string()
        } else {
            raw.to_string()
        };
        out.insert(key.to_string(), value);
    }
    out
}

/// Load `.env` from override_dir or current directory into a map. Missing file returns empty map.
pub fn load_env_map(override_dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    let path = match dotenv_path(override_dir) {
        Some(p) => p,
        None => return Ok(HashMap::new()),
    };
    let content = std::fs::read_to_string(&path)?;
    Ok(parse_dotenv(&content))
}
