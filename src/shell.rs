use crate::vfs::HOME_PATH;

pub const USER: &str = "user";
pub const HOST: &str = "codemate";
pub const HISTORY_LIMIT: usize = 100;

/// Bounded command history. The cursor used by arrow-key navigation is
/// detached (`None`) until the first `up`, and re-detaches whenever a new
/// command is pushed.
pub struct History {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        History {
            entries: Vec::new(),
            cursor: None,
        }
    }

    pub fn push(&mut self, command: &str) {
        self.entries.push(command.to_string());
        if self.entries.len() > HISTORY_LIMIT {
            self.entries.remove(0);
        }
        self.cursor = None;
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Moves toward older entries; the first `up` lands on the most
    /// recent command.
    pub fn up(&mut self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let next = match self.cursor {
            None => self.entries.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(next);
        self.entries[next].clone()
    }

    /// Moves toward newer entries; a detached cursor stays detached and
    /// yields the empty string.
    pub fn down(&mut self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        match self.cursor {
            None => String::new(),
            Some(i) => {
                let next = (i + 1).min(self.entries.len() - 1);
                self.cursor = Some(next);
                self.entries[next].clone()
            }
        }
    }
}

/// `user@codemate:~$ ` with the home directory displayed as `~`.
pub fn prompt(current_path: &str) -> String {
    let display = if current_path == HOME_PATH {
        "~".to_string()
    } else if let Some(rest) = current_path.strip_prefix("/home/user/") {
        format!("~/{}", rest)
    } else {
        current_path.to_string()
    };
    format!("{}@{}:{}$ ", USER, HOST, display)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_evicts_oldest_past_limit() {
        let mut history = History::new();
        for i in 0..150 {
            history.push(&format!("echo {}", i));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.entries()[0], "echo 50");
        assert_eq!(history.entries()[99], "echo 149");
    }

    #[test]
    fn test_navigation_walks_backwards_then_forwards() {
        let mut history = History::new();
        for cmd in ["ls", "pwd", "cd Documents"] {
            history.push(cmd);
        }

        assert_eq!(history.up(), "cd Documents");
        assert_eq!(history.up(), "pwd");
        assert_eq!(history.up(), "ls");
        // Clamped at the oldest entry.
        assert_eq!(history.up(), "ls");

        assert_eq!(history.down(), "pwd");
        assert_eq!(history.down(), "cd Documents");
        // Clamped at the newest entry.
        assert_eq!(history.down(), "cd Documents");
    }

    #[test]
    fn test_navigation_detached_cursor() {
        let mut history = History::new();
        assert_eq!(history.up(), "");
        assert_eq!(history.down(), "");

        history.push("ls");
        // Down with a detached cursor yields nothing.
        assert_eq!(history.down(), "");
        assert_eq!(history.up(), "ls");

        // A new command re-detaches the cursor.
        history.push("pwd");
        assert_eq!(history.down(), "");
        assert_eq!(history.up(), "pwd");
    }

    #[test]
    fn test_prompt_home_substitution() {
        assert_eq!(prompt("/home/user"), "user@codemate:~$ ");
        assert_eq!(prompt("/home/user/Documents"), "user@codemate:~/Documents$ ");
        assert_eq!(prompt("/etc"), "user@codemate:/etc$ ");
    }
}
