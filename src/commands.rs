use serde::Serialize;
use thiserror::Error;

use crate::shell::History;
use crate::sysinfo::{SimClock, SysInfo, CPU_CORES, CPU_MODEL, PROCESSES, UPTIME_SECS};
use crate::vfs::{format_size, Vfs, VfsError, HOME_PATH};

/// Full command vocabulary: directly dispatched verbs first, then the
/// simulated read-only utilities.
pub const COMMANDS: &[&str] = &[
    "ls", "cd", "pwd", "mkdir", "rm", "ps", "cpu", "mem", "history", "help", "clear", "whoami",
    "date", "uptime", "echo", "cat", "touch", "tree", "grep", "find", "wc", "head", "tail", "ping",
];

/// Destructive command-line patterns, matched literally against the
/// whitespace-normalized command line.
pub const DENYLIST: &[&str] = &[
    "rm -rf /",
    "rm -fr /",
    "rm -r /",
    "dd if=",
    "of=/dev/",
    "> /dev/sd",
    "mkfs",
    "fdisk",
    "parted",
];

const GENERIC_FILE_CONTENT: &str =
    "This file is empty or cannot be displayed in the simulated terminal.";

const HELP_TEXT: &str = "\
Available Commands:

File System:
  ls [-l] [-a]     - list directory contents
  cd <directory>   - change directory
  pwd              - print working directory
  mkdir <name>     - create directory
  rm [-r] <name>   - remove file or directory
  touch <name>     - create file or update its timestamp
  cat <file>       - display file contents
  tree             - display directory tree

System Monitoring:
  ps               - list running processes
  cpu              - show CPU information
  mem              - show memory usage

Utilities:
  echo <text>      - display a line of text
  history          - show command history
  help             - show this help message
  clear            - clear terminal screen
  whoami           - display current user
  date             - show current date and time
  uptime           - show system uptime";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Success,
    Error,
    Info,
}

/// The sole channel between the core and the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommandResult {
    pub output: String,
    pub kind: OutputKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_path: Option<String>,
}

impl CommandResult {
    fn success(output: String) -> Self {
        CommandResult {
            output,
            kind: OutputKind::Success,
            new_path: None,
        }
    }

    fn info(output: String) -> Self {
        CommandResult {
            output,
            kind: OutputKind::Info,
            new_path: None,
        }
    }
}

/// Every failure a handler can produce, with its user-facing message.
/// Errors are returned as data and rendered into an error-classified
/// result; they never cross the core boundary as panics.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{command}: missing operand")]
    MissingOperand { command: &'static str },
    #[error("cd: {path}: No such file or directory")]
    NoSuchDirectory { path: String },
    #[error("mkdir: cannot create directory '{name}': File exists")]
    AlreadyExists { name: String },
    #[error("rm: cannot remove '{name}': No such file or directory")]
    RemoveNotFound { name: String },
    #[error("rm: cannot remove '{name}': Is a directory")]
    RemoveIsDirectory { name: String },
    #[error("cat: {name}: No such file or directory")]
    ReadNotFound { name: String },
    #[error("cat: {name}: Is a directory")]
    ReadIsDirectory { name: String },
    #[error("Operation not permitted")]
    Denied,
    #[error("Command not found: {command}. Available commands: {supported}. Type 'help' for details.")]
    UnknownCommand { command: String, supported: String },
}

/// One session's worth of mutable state: filesystem, telemetry, history
/// and the simulated clock. Constructed fresh per terminal instance;
/// nothing is shared across sessions.
pub struct CommandSystem {
    vfs: Vfs,
    sysinfo: SysInfo,
    clock: SimClock,
    history: History,
}

impl Default for CommandSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSystem {
    pub fn new() -> Self {
        let clock = SimClock::new();
        let vfs = Vfs::seeded(clock.now());
        CommandSystem {
            vfs,
            sysinfo: SysInfo::new(),
            clock,
            history: History::new(),
        }
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Parses and runs one command line against `current_path`. Never
    /// fails: every error comes back as an error-classified result.
    pub fn execute(&mut self, line: &str, current_path: &str) -> CommandResult {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return CommandResult::info(String::new());
        }

        self.clock.tick();
        self.history.push(trimmed);

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        let normalized = parts.join(" ");
        if DENYLIST.iter().any(|p| normalized.contains(p)) {
            return error_result(CommandError::Denied);
        }

        let verb = parts[0].to_lowercase();
        let args = &parts[1..];
        let result = match verb.as_str() {
            "ls" => self.ls(current_path, args),
            "cd" => self.cd(current_path, args),
            "pwd" => Ok(CommandResult::info(current_path.to_string())),
            "mkdir" => self.mkdir(current_path, args),
            "rm" => self.rm(current_path, args),
            "touch" => self.touch(current_path, args),
            "cat" => self.cat(current_path, args),
            "tree" => Ok(self.tree(current_path)),
            "ps" => Ok(ps()),
            "cpu" => Ok(self.cpu()),
            "mem" => Ok(self.mem()),
            "history" => Ok(self.history_listing()),
            "help" => Ok(CommandResult::info(HELP_TEXT.to_string())),
            "clear" => Ok(CommandResult::success(String::new())),
            "whoami" => Ok(CommandResult::info("user".to_string())),
            "date" => Ok(CommandResult::info(self.clock.now().long())),
            "uptime" => Ok(uptime()),
            "echo" => Ok(CommandResult::success(args.join(" "))),
            _ => simulate(&verb, args),
        };
        result.unwrap_or_else(error_result)
    }

    fn ls(&self, current_path: &str, args: &[&str]) -> Result<CommandResult, CommandError> {
        let long = args.contains(&"-l");
        let all = args.contains(&"-a");
        let items = self.vfs.list(current_path).unwrap_or(&[]);
        let visible: Vec<_> = items
            .iter()
            .filter(|e| all || !e.name.starts_with('.'))
            .collect();

        if visible.is_empty() {
            return Ok(CommandResult::info(String::new()));
        }

        let output = if long {
            visible
                .iter()
                .map(|e| {
                    let size = match e.size {
                        Some(bytes) if !e.is_dir() => format!("{:>8}", format_size(bytes)),
                        _ => "     dir".to_string(),
                    };
                    format!("{}  {}  {}  {}", e.permissions, size, e.modified.short(), e.name)
                })
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            visible
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join("  ")
        };
        Ok(CommandResult::success(output))
    }

    fn cd(&self, current_path: &str, args: &[&str]) -> Result<CommandResult, CommandError> {
        let target = args.first().copied().unwrap_or(HOME_PATH);
        let resolved = Vfs::resolve(current_path, target);
        if self.vfs.contains(&resolved) {
            Ok(CommandResult {
                output: String::new(),
                kind: OutputKind::Success,
                new_path: Some(resolved),
            })
        } else {
            Err(CommandError::NoSuchDirectory {
                path: target.to_string(),
            })
        }
    }

    fn mkdir(&mut self, current_path: &str, args: &[&str]) -> Result<CommandResult, CommandError> {
        let name = args
            .first()
            .copied()
            .ok_or(CommandError::MissingOperand { command: "mkdir" })?;
        let now = self.clock.now();
        self.vfs.mkdir(current_path, name, now).map_err(|e| match e {
            VfsError::Exists => CommandError::AlreadyExists { name: name.to_string() },
            _ => CommandError::NoSuchDirectory {
                path: current_path.to_string(),
            },
        })?;
        Ok(CommandResult::success(String::new()))
    }

    fn rm(&mut self, current_path: &str, args: &[&str]) -> Result<CommandResult, CommandError> {
        let recursive = args.iter().any(|a| matches!(*a, "-r" | "-rf" | "-fr"));
        let name = args
            .iter()
            .find(|a| !a.starts_with('-'))
            .copied()
            .ok_or(CommandError::MissingOperand { command: "rm" })?;
        self.vfs
            .remove(current_path, name, recursive)
            .map_err(|e| match e {
                VfsError::IsDirectory => CommandError::RemoveIsDirectory { name: name.to_string() },
                _ => CommandError::RemoveNotFound { name: name.to_string() },
            })?;
        Ok(CommandResult::success(String::new()))
    }

    fn touch(&mut self, current_path: &str, args: &[&str]) -> Result<CommandResult, CommandError> {
        let name = args
            .first()
            .copied()
            .ok_or(CommandError::MissingOperand { command: "touch" })?;
        let now = self.clock.now();
        self.vfs
            .touch(current_path, name, now)
            .map_err(|_| CommandError::NoSuchDirectory {
                path: current_path.to_string(),
            })?;
        Ok(CommandResult::success(String::new()))
    }

    fn cat(&self, current_path: &str, args: &[&str]) -> Result<CommandResult, CommandError> {
        let name = args
            .first()
            .copied()
            .ok_or(CommandError::MissingOperand { command: "cat" })?;
        let entry = self
            .vfs
            .entry(current_path, name)
            .ok_or(CommandError::ReadNotFound { name: name.to_string() })?;
        if entry.is_dir() {
            return Err(CommandError::ReadIsDirectory { name: name.to_string() });
        }
        Ok(CommandResult::success(canned_content(name)))
    }

    fn tree(&self, current_path: &str) -> CommandResult {
        let mut out = String::new();
        out.push_str(current_path);
        out.push('\n');
        self.render_tree(current_path, "", &mut out);
        CommandResult::success(out.trim_end().to_string())
    }

    fn render_tree(&self, path: &str, prefix: &str, out: &mut String) {
        let Some(items) = self.vfs.list(path) else {
            return;
        };
        let count = items.len();
        for (i, entry) in items.iter().enumerate() {
            let last = i + 1 == count;
            let connector = if last { "└── " } else { "├── " };
            let icon = if entry.is_dir() { "📁 " } else { "📄 " };
            out.push_str(prefix);
            out.push_str(connector);
            out.push_str(icon);
            out.push_str(&entry.name);
            out.push('\n');
            if entry.is_dir() {
                let child = Vfs::join(path, &entry.name);
                let deeper = format!("{}{}", prefix, if last { "    " } else { "│   " });
                self.render_tree(&child, &deeper, out);
            }
        }
    }

    fn cpu(&mut self) -> CommandResult {
        let usage = self.sysinfo.sample_cpu();
        CommandResult::success(format!(
            "CPU Information:\nModel: {}\nCores: {}\nCurrent Usage: {}%",
            CPU_MODEL, CPU_CORES, usage
        ))
    }

    fn mem(&mut self) -> CommandResult {
        let snap = self.sysinfo.sample_memory();
        CommandResult::success(format!(
            "Memory Information:\nTotal: {}\nUsed:  {} ({}%)\nFree:  {}",
            format_size(snap.total_mb * 1024 * 1024),
            format_size(snap.used_mb * 1024 * 1024),
            snap.usage_percent,
            format_size(snap.free_mb * 1024 * 1024),
        ))
    }

    fn history_listing(&self) -> CommandResult {
        let listing = self
            .history
            .entries()
            .iter()
            .enumerate()
            .map(|(i, cmd)| format!("{:4}  {}", i + 1, cmd))
            .collect::<Vec<_>>()
            .join("\n");
        CommandResult::info(listing)
    }

    /// Prefix completion: the verb vocabulary for the first token, then
    /// directory entry names for cd/ls/rm operands.
    pub fn suggest(&self, input: &str, current_path: &str) -> Vec<String> {
        let trailing = input.ends_with(|c: char| c.is_whitespace());
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let Some(first) = tokens.first().copied() else {
            return Vec::new();
        };

        if tokens.len() == 1 && !trailing {
            return COMMANDS
                .iter()
                .filter(|c| c.starts_with(first))
                .map(|c| c.to_string())
                .collect();
        }

        if matches!(first, "cd" | "ls" | "rm") {
            let partial = if trailing {
                ""
            } else {
                tokens.last().copied().unwrap_or("")
            };
            if let Some(items) = self.vfs.list(current_path) {
                return items
                    .iter()
                    .filter(|e| e.name.starts_with(partial))
                    .map(|e| e.name.clone())
                    .collect();
            }
        }
        Vec::new()
    }

    #[cfg(test)]
    fn vfs(&self) -> &Vfs {
        &self.vfs
    }
}

fn error_result(err: CommandError) -> CommandResult {
    CommandResult {
        output: err.to_string(),
        kind: OutputKind::Error,
        new_path: None,
    }
}

fn ps() -> CommandResult {
    let mut lines = vec!["PID    NAME           CPU%   MEM(KB)  STATUS".to_string()];
    for p in PROCESSES {
        lines.push(format!(
            "{:<6} {:<14} {:>5.1}  {:>7}  {}",
            p.pid, p.name, p.cpu, p.memory_kb, p.status
        ));
    }
    CommandResult::success(lines.join("\n"))
}

fn uptime() -> CommandResult {
    let days = UPTIME_SECS / 86400;
    let hours = (UPTIME_SECS % 86400) / 3600;
    let minutes = (UPTIME_SECS % 3600) / 60;
    CommandResult::success(format!("up {} days, {}:{:02}", days, hours, minutes))
}

/// Fixed contents for the well-known seed files; everything else reads
/// as the generic placeholder.
fn canned_content(name: &str) -> String {
    match name.to_lowercase().as_str() {
        "readme.txt" => "Welcome to CodeMate Terminal!\n\n\
             This is a simulated shell that also understands plain English.\n\
             Try 'create folder demo' or type 'help' for the command list."
            .to_string(),
        "script.sh" => "#!/bin/bash\necho \"Hello from CodeMate Terminal!\"\n".to_string(),
        "project.txt" => "Project: CodeMate Terminal\nStatus: in progress\n\
             Next up: polish the autocomplete dropdown."
            .to_string(),
        "notes.md" => "# Notes\n\n\
             - natural language works: try 'show cpu usage'\n\
             - the last 100 commands are kept in history"
            .to_string(),
        _ => GENERIC_FILE_CONTENT.to_string(),
    }
}

/// Canned responses for the read-only utilities that are simulated
/// rather than dispatched.
fn simulate(verb: &str, args: &[&str]) -> Result<CommandResult, CommandError> {
    let output = match verb {
        "grep" => {
            if args.is_empty() {
                "usage: grep <pattern> [file]".to_string()
            } else {
                let pattern = args[0];
                let file = args.get(1).copied().unwrap_or("README.txt");
                format!("{}:1:{}", file, pattern)
            }
        }
        "find" => {
            let named = args
                .iter()
                .position(|a| *a == "-name")
                .and_then(|i| args.get(i + 1));
            match named {
                Some(name) => format!("./{}", name),
                None => ".\n./Documents\n./Desktop\n./Downloads\n./README.txt\n./script.sh"
                    .to_string(),
            }
        }
        "wc" => {
            let file = args
                .iter()
                .find(|a| !a.starts_with('-'))
                .copied()
                .unwrap_or("README.txt");
            format!(" 12  48 1024 {}", file)
        }
        "head" | "tail" => match args.iter().find(|a| !a.starts_with('-')) {
            None => format!("usage: {} <file>", verb),
            Some(file) => {
                let content = canned_content(file);
                let lines: Vec<&str> = content.lines().collect();
                let slice = if verb == "head" {
                    &lines[..lines.len().min(10)]
                } else {
                    &lines[lines.len().saturating_sub(10)..]
                };
                slice.join("\n")
            }
        },
        "ping" => match args.iter().find(|a| !a.starts_with('-')) {
            None => "usage: ping <host>".to_string(),
            Some(host) => {
                let times = [0.42, 0.38, 0.45, 0.40];
                let mut out = format!("PING {} (127.0.0.1): 56 data bytes\n", host);
                for (i, t) in times.iter().enumerate() {
                    out.push_str(&format!(
                        "64 bytes from 127.0.0.1: icmp_seq={} ttl=64 time={:.2} ms\n",
                        i + 1,
                        t
                    ));
                }
                out.push_str(&format!("\n--- {} ping statistics ---\n", host));
                out.push_str("4 packets transmitted, 4 packets received, 0% packet loss");
                out
            }
        },
        _ => {
            return Err(CommandError::UnknownCommand {
                command: verb.to_string(),
                supported: COMMANDS.join(", "),
            })
        }
    };
    Ok(CommandResult::info(output))
}
