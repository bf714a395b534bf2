//! Line input with persistent history.

use anyhow::{Context, Result};
use console::style;
use rustyline::error::ReadlineError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One read from the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl-C at the prompt.
    Interrupted,
    /// Ctrl-D or closed stdin.
    Eof,
}

pub trait LineSource {
    fn read_line(&mut self) -> Result<Input>;

    fn add_history(&mut self, _line: &str) {}

    fn save_history(&mut self) {}
}

pub struct Editor {
    editor: rustyline::DefaultEditor,
    prompt: String,
    history_path: Option<PathBuf>,
}

impl Editor {
    pub fn new(history_path: Option<PathBuf>, styled: bool) -> Result<Self> {
        let mut editor = rustyline::DefaultEditor::new()?;
        if let Some(ref path) = history_path
            && let Err(e) = editor.load_history(path)
        {
            debug!("No history loaded from {}: {}", path.display(), e);
        }
        let prompt = format!("{}: ", style("💬 You").cyan().bold().force_styling(styled));
        Ok(Self {
            editor,
            prompt,
            history_path,
        })
    }
}

impl LineSource for Editor {
    fn read_line(&mut self) -> Result<Input> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => Ok(Input::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(e) => Err(e.into()),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            debug!("Failed to add history entry: {}", e);
        }
    }

    fn save_history(&mut self) {
        if let Some(ref path) = self.history_path
            && let Err(e) = persist_history(&mut self.editor, path)
        {
            warn!("{:#}", e);
        }
    }
}

fn persist_history(editor: &mut rustyline::DefaultEditor, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    editor
        .save_history(path)
        .with_context(|| format!("Failed to save history to {}", path.display()))
}
