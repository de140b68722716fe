use crate::commands::CommandDispatcher;
use crate::config::Config;
use crate::core::error::InvoiceChatError;

use console::style;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config as EditorConfig, Context, EditMode, Editor, Helper};
use std::borrow::Cow;

/// Completes `/command` names; plain chat text gets history hints only.
pub struct ChatHelper {
    command_names: Vec<String>,
    history_hinter: HistoryHinter,
}

impl ChatHelper {
    pub fn new(commands: &CommandDispatcher) -> Self {
        Self {
            command_names: commands.get_command_names(),
            history_hinter: HistoryHinter {},
        }
    }

    fn complete_command(&self, line: &str, pos: usize) -> Vec<Pair> {
        let Some(typed) = line.get(1..pos) else {
            return Vec::new();
        };
        self.command_names
            .iter()
            .filter(|name| name.starts_with(typed))
            .map(|name| Pair {
                display: format!("/{}", name),
                replacement: name.clone(),
            })
            .collect()
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if line.starts_with('/') && !line[..pos].contains(' ') {
            return Ok((1, self.complete_command(line, pos)));
        }
        Ok((pos, Vec::new()))
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.history_hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ChatHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(style(hint).dim().to_string())
    }
}

impl Validator for ChatHelper {}

pub type ChatEditor = Editor<ChatHelper, FileHistory>;

/// Creates a configured rustyline editor
pub fn create_editor(commands: &CommandDispatcher) -> Result<ChatEditor, InvoiceChatError> {
    let config = EditorConfig::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| InvoiceChatError::Input(format!("Failed to create line editor: {}", e)))?;
    editor.set_helper(Some(ChatHelper::new(commands)));

    // No history yet on first run.
    let _ = editor.load_history(&Config::input_history_path());

    Ok(editor)
}

/// Reads a line of input; `None` on Ctrl-C or Ctrl-D.
pub fn read_input(editor: &mut ChatEditor) -> Result<Option<String>, InvoiceChatError> {
    let prompt = if cfg!(windows) && std::env::var("PSModulePath").is_ok() {
        "> ".to_string()
    } else {
        style("> ").bold().cyan().to_string()
    };
    match editor.readline(&prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                editor.add_history_entry(line.as_str()).map_err(|e| {
                    InvoiceChatError::Input(format!("Failed to add history entry: {}", e))
                })?;
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!("Exiting...");
            Ok(None)
        }
        Err(err) => Err(InvoiceChatError::Input(format!("Input error: {}", err))),
    }
}

/// Saves the editor history
pub fn save_history(editor: &mut ChatEditor) -> Result<(), InvoiceChatError> {
    let history_path = Config::input_history_path();

    if let Some(parent) = history_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                InvoiceChatError::Input(format!("Failed to create history directory: {}", e))
            })?;
        }
    }

    editor
        .save_history(&history_path)
        .map_err(|e| InvoiceChatError::Input(format!("Failed to save history: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_command_registry;

    #[test]
    fn completes_slash_commands_by_prefix() {
        let helper = ChatHelper::new(&create_command_registry());

        let names: Vec<String> = helper
            .complete_command("/in", 3)
            .into_iter()
            .map(|p| p.replacement)
            .collect();
        assert_eq!(names, vec!["invoices".to_string()]);

        assert_eq!(helper.complete_command("/", 1).len(), 6);
        assert!(helper.complete_command("/zzz", 4).is_empty());
    }
}
