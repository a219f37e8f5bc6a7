//! Config module.
//! Manages I/O for config.json (organizer block, fonts, colors, asset paths, output dir).
//! Uses serde_json for serialization, 2-space pretty output.
//! Missing file triggers interactive setup; missing keys are prompted with their defaults.
//! Existing values are never overwritten.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::prompt::Prompter;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

const ORGANIZER_NAME_PROMPT: &str = "Event Organizer name";
const ORGANIZER_DESIGNATION_PROMPT: &str = "Event Organizer Designation";

/// Settings every run needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Organizer name printed above the signature line.
    pub name: String,
    /// Organizer title printed under the name.
    pub designation: String,
    /// Title font em size in pixels; body and date sizes derive from it.
    pub size: u32,
    pub color: String,
    pub signature: PathBuf,
    pub template: PathBuf,
    pub title_font: PathBuf,
    pub font: PathBuf,
    pub out: PathBuf,
}

/// Default options, in the order they are prompted and written.
pub fn default_options() -> Map<String, Value> {
    let mut defaults = Map::new();
    defaults.insert("size".into(), json!(120));
    defaults.insert("color".into(), json!("#000000"));
    defaults.insert("signature".into(), json!("assets/signature.png"));
    defaults.insert("template".into(), json!("assets/template.jpg"));
    defaults.insert(
        "title_font".into(),
        json!("assets/fonts/GlacialIndifference-Bold.otf"),
    );
    defaults.insert(
        "font".into(),
        json!("assets/fonts/GlacialIndifference-Regular.otf"),
    );
    defaults.insert("out".into(), json!("out/"));
    defaults
}

/// Loads the config at `path`, prompting for whatever is missing, and writes the
/// merged result back before returning it.
pub fn load_or_initialize(
    path: &Path,
    defaults: &Map<String, Value>,
    prompter: &mut dyn Prompter,
) -> Result<Config> {
    let merged = if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let loaded: Map<String, Value> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        complete_existing(loaded, defaults, prompter)?
    } else {
        println!("{} not found. Running setup.", path.display());
        initialize_fresh(defaults, prompter)?
    };

    save(path, &merged)?;

    serde_json::from_value(Value::Object(merged))
        .with_context(|| format!("Config file {} has invalid values", path.display()))
}

// *************** Merge Paths ***************

fn complete_existing(
    loaded: Map<String, Value>,
    defaults: &Map<String, Value>,
    prompter: &mut dyn Prompter,
) -> Result<Map<String, Value>> {
    let organizer = prompt_organizer(&loaded, prompter)?;

    let missing: Vec<&String> = defaults.keys().filter(|k| !loaded.contains_key(*k)).collect();
    let mut new_data = Map::new();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|k| k.as_str()).collect();
        println!("Missing keys: {}", names.join(", "));
        for key in missing {
            new_data.insert(key.clone(), prompt_key(prompter, key, &defaults[key])?);
        }
    }

    let mut merged = organizer.clone();
    for (key, value) in loaded {
        // An empty organizer field was re-prompted above; keep the answer.
        if organizer.contains_key(&key) {
            continue;
        }
        merged.insert(key, value);
    }
    merged.extend(new_data);
    debug!(keys = merged.len(), "merged existing config");
    Ok(merged)
}

fn initialize_fresh(
    defaults: &Map<String, Value>,
    prompter: &mut dyn Prompter,
) -> Result<Map<String, Value>> {
    let mut merged = prompt_organizer(&Map::new(), prompter)?;
    merged.extend(defaults.clone());
    for (key, default) in defaults {
        merged.insert(key.clone(), prompt_key(prompter, key, default)?);
    }
    info!("created new configuration");
    Ok(merged)
}

/// Prompts for organizer fields that are absent or blank in `loaded`.
fn prompt_organizer(
    loaded: &Map<String, Value>,
    prompter: &mut dyn Prompter,
) -> Result<Map<String, Value>> {
    let mut overlay = Map::new();
    for (key, prompt) in [
        ("name", ORGANIZER_NAME_PROMPT),
        ("designation", ORGANIZER_DESIGNATION_PROMPT),
    ] {
        if is_blank(loaded.get(key)) {
            let answer = prompter.ask(prompt)?;
            overlay.insert(key.to_string(), Value::String(answer.trim().to_string()));
        }
    }
    Ok(overlay)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Prompts for one key; the answer keeps the JSON type of its default.
fn prompt_key(prompter: &mut dyn Prompter, key: &str, default: &Value) -> Result<Value> {
    let prompt = format!("Enter {key}");
    match default {
        Value::Number(n) => {
            let shown = n.to_string();
            let validate = |line: &str| {
                let line = line.trim();
                if line.is_empty() || line.parse::<u32>().is_ok() {
                    Ok(())
                } else {
                    Err(format!("{key} must be a whole number"))
                }
            };
            let answer = prompter.ask_validated(&format!("{prompt} (default: {shown})"), &validate)?;
            let answer = answer.trim();
            if answer.is_empty() {
                Ok(default.clone())
            } else {
                let parsed: u32 = answer
                    .parse()
                    .with_context(|| format!("Invalid number for {key}: '{answer}'"))?;
                Ok(json!(parsed))
            }
        }
        Value::String(s) => Ok(Value::String(prompter.ask_with_default(&prompt, s)?)),
        other => Ok(Value::String(
            prompter.ask_with_default(&prompt, &other.to_string())?,
        )),
    }
}

fn save(path: &Path, data: &Map<String, Value>) -> Result<()> {
    let body = serde_json::to_string_pretty(data).context("Failed to serialize config")?;
    fs::write(path, body).with_context(|| format!("Failed to write config file {}", path.display()))
}
