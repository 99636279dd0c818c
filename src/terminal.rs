use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::ai::Translator;
use crate::commands::{CommandResult, CommandSystem};
use crate::shell;
use crate::vfs::HOME_PATH;

pub const VERSION: &str = "1.0";

/// What one keystroke of Enter produces: the command line that was
/// actually dispatched (after translation), whether the raw input read
/// like English, and the dispatcher's result.
#[derive(Serialize)]
struct ExecOutcome<'a> {
    command: &'a str,
    natural_language: bool,
    result: &'a CommandResult,
}

/// One terminal session. Owns all mutable state; constructing a new
/// `Terminal` reseeds the filesystem, telemetry and history from scratch.
#[wasm_bindgen]
pub struct Terminal {
    commands: CommandSystem,
    translator: Translator,
    current_path: String,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Terminal {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Terminal {
        Terminal {
            commands: CommandSystem::new(),
            translator: Translator::new(),
            current_path: HOME_PATH.to_string(),
        }
    }

    pub fn banner(&self) -> String {
        format!(
            "CodeMate Terminal Emulator v{}\nType 'help' to see available commands.\nCurrent directory: {}",
            VERSION, self.current_path
        )
    }

    pub fn prompt(&self) -> String {
        shell::prompt(&self.current_path)
    }

    pub fn current_path(&self) -> String {
        self.current_path.clone()
    }

    /// Translates and dispatches one line of input, returning the outcome
    /// as a JSON envelope for the presentation layer.
    pub fn exec(&mut self, input: &str) -> String {
        let command = self.translator.translate(input);
        let natural_language = self.translator.looks_natural_language(input);
        let result = self.commands.execute(&command, &self.current_path);
        if let Some(path) = &result.new_path {
            self.current_path = path.clone();
        }

        #[cfg(target_arch = "wasm32")]
        web_sys::console::debug_1(
            &format!("codemate: {} -> {:?}", command, result.kind).into(),
        );

        serde_json::to_string(&ExecOutcome {
            command: &command,
            natural_language,
            result: &result,
        })
        .unwrap_or_else(|_| "{}".to_string())
    }

    pub fn history_up(&mut self) -> String {
        self.commands.history_mut().up()
    }

    pub fn history_down(&mut self) -> String {
        self.commands.history_mut().down()
    }

    /// Token autocomplete for the current input, as a JSON string array.
    pub fn suggest(&self, input: &str) -> String {
        let suggestions = self.commands.suggest(input, &self.current_path);
        serde_json::to_string(&suggestions).unwrap_or_else(|_| "[]".to_string())
    }

    /// Canned natural-language phrase suggestions, as a JSON string array.
    pub fn phrase_suggestions(&self, input: &str) -> String {
        let suggestions = self.translator.phrase_suggestions(input);
        serde_json::to_string(&suggestions).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn translate(&self, input: &str) -> String {
        self.translator.translate(input)
    }

    pub fn looks_natural_language(&self, input: &str) -> bool {
        self.translator.looks_natural_language(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_and_prompt() {
        let term = Terminal::new();
        assert_eq!(
            term.banner(),
            "CodeMate Terminal Emulator v1.0\nType 'help' to see available commands.\nCurrent directory: /home/user"
        );
        assert_eq!(term.prompt(), "user@codemate:~$ ");
    }

    #[test]
    fn test_exec_tracks_path_changes() {
        let mut term = Terminal::new();
        term.exec("cd Documents");
        assert_eq!(term.current_path(), "/home/user/Documents");
        assert_eq!(term.prompt(), "user@codemate:~/Documents$ ");

        term.exec("cd ..");
        assert_eq!(term.current_path(), "/home/user");
    }

    #[test]
    fn test_exec_envelope_shape() {
        let mut term = Terminal::new();
        let json = term.exec("create folder demo");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["command"], "mkdir demo");
        assert_eq!(value["natural_language"], true);
        assert_eq!(value["result"]["kind"], "success");

        // The translated command behaves exactly like the typed one.
        let json = term.exec("cd demo");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["natural_language"], false);
        assert_eq!(value["result"]["new_path"], "/home/user/demo");
    }

    #[test]
    fn test_exec_error_classification() {
        let mut term = Terminal::new();
        let json = term.exec("rm nosuchfile");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"]["kind"], "error");
        assert_eq!(
            value["result"]["output"],
            "rm: cannot remove 'nosuchfile': No such file or directory"
        );
    }

    #[test]
    fn test_history_navigation_through_facade() {
        let mut term = Terminal::new();
        term.exec("ls");
        term.exec("pwd");
        assert_eq!(term.history_up(), "pwd");
        assert_eq!(term.history_up(), "ls");
        assert_eq!(term.history_down(), "pwd");
    }

    #[test]
    fn test_suggest_is_json_array() {
        let term = Terminal::new();
        let json = term.suggest("cd D");
        let value: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(value, vec!["Documents", "Desktop", "Downloads"]);
    }
}
