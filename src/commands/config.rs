//! Configuration file editor command.
//!
//! Opens the melodyq configuration file in the user's preferred editor.

use std::process::Command;

use crate::config::{self, MelodyqConfig};

/// Opens the melodyq configuration file in the user's preferred editor, writing the
/// defaults first if the file does not exist yet.
///
/// Editor lookup order is $EDITOR, $VISUAL, nano, then vi.
///
/// # Errors
/// - If the config file cannot be created
/// - If no editor can be found or executed
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = config::get_config_path()?;
    if !config_path.exists() {
        MelodyqConfig::default().save_to(&config_path)?;
    }

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor()?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Finds the best available editor to use.
///
/// Tries in order: $EDITOR, $VISUAL, nano, vi
fn find_editor() -> anyhow::Result<String> {
    if let Some(editor) = editor_from_env(std::env::var("EDITOR").ok(), std::env::var("VISUAL").ok()) {
        return Ok(editor);
    }

    for editor in &["nano", "vi"] {
        if is_editor_available(editor) {
            return Ok(editor.to_string());
        }
    }

    Err(anyhow::anyhow!(
        "No editor found. Please set the $EDITOR environment variable."
    ))
}

/// Picks the first non-blank editor variable.
fn editor_from_env(editor: Option<String>, visual: Option<String>) -> Option<String> {
    [editor, visual]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Checks if an editor is available in the system PATH.
fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
