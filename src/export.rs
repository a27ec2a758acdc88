//! Prompt and input exports
//!
//! A generated prompt is written as `<id>_prompt.md` and the form state that
//! produced it as `<id>_input.json`, side by side, so the input can be
//! loaded back later to regenerate or tweak the prompt.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::form::FormState;

pub fn prompt_file_name(id: &str) -> String {
    format!("{}_prompt.md", id)
}

pub fn input_file_name(id: &str) -> String {
    format!("{}_input.json", id)
}

/// Write generated text to `<dir>/<id>_prompt.md`, creating `dir` if needed
pub async fn write_prompt(dir: &Path, id: &str, text: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(prompt_file_name(id));
    tokio::fs::write(&path, text).await?;
    tracing::debug!(path = %path.display(), "wrote prompt");
    Ok(path)
}

/// Write the form state, pretty-printed, to `<dir>/<id>_input.json`
pub async fn write_input(dir: &Path, id: &str, form: &FormState) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(input_file_name(id));
    tokio::fs::write(&path, form.to_json_pretty()?).await?;
    tracing::debug!(path = %path.display(), entries = form.len(), "wrote input");
    Ok(path)
}

/// Load a form state previously exported (or hand-written) as a JSON object
pub async fn read_input(path: &Path) -> Result<FormState> {
    let json = tokio::fs::read_to_string(path).await?;
    FormState::from_json(&json)
}
