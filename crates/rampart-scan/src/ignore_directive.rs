/// The tool's ignore keyword as it appears in a comment: `# rampart-ignore`.
pub const IGNORE_KEYWORD: &str = "rampart-ignore";

/// A parsed `<tool>-ignore[(reason)] [name[, name...]]` annotation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IgnoreDirective {
    /// 1-based line the comment itself was found on.
    pub comment_line: usize,
    /// Free-text reason, if the directive carried one.
    pub reason: Option<String>,
    /// Symbol names this directive is scoped to. Empty means "every import
    /// on the attached line".
    pub names: Vec<String>,
}

impl IgnoreDirective {
    /// Whether this directive applies to an import binding `name`. A
    /// directive with no symbol list applies to every import on its line.
    pub fn applies_to(&self, name: &str) -> bool {
        self.names.is_empty() || self.names.iter().any(|n| n == name)
    }
}

/// Scan a single comment body (text after the comment prefix, prefix
/// already stripped) for an ignore directive. Returns `None` if the
/// comment doesn't start with the ignore keyword.
///
/// Accepted shapes: `rampart-ignore`, `rampart-ignore(reason text)`,
/// `rampart-ignore name, other_name`, `rampart-ignore(reason) name`.
pub fn parse_directive(comment_line: usize, comment_body: &str) -> Option<IgnoreDirective> {
    let body = comment_body.trim();
    let rest = body.strip_prefix(IGNORE_KEYWORD)?;
    // Must be a whole-word match: "rampart-ignored" is not a directive.
    if let Some(next) = rest.chars().next() {
        if next.is_alphanumeric() || next == '-' || next == '_' {
            return None;
        }
    }
    let rest = rest.trim_start();

    let (reason, rest) = if let Some(after_open) = rest.strip_prefix('(') {
        match after_open.find(')') {
            Some(end) => {
                let reason = after_open[..end].trim();
                let reason = if reason.is_empty() { None } else { Some(reason.to_string()) };
                (reason, after_open[end + 1..].trim_start())
            }
            None => (None, rest),
        }
    } else {
        (None, rest)
    };

    let names = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
    };

    Some(IgnoreDirective { comment_line, reason, names })
}

/// Scan raw source text for every `# <keyword>...` comment, in source
/// order, parsing each into an `IgnoreDirective`. Runs independently of the
/// AST since comments never survive parsing (design note: "implement by
/// buffering the previous non-blank line during scanning rather than by
/// re-reading the file" -- here a single forward pass plays the same
/// role). A minimal quote tracker keeps a `#` inside a string literal from
/// being mistaken for a comment; it does not need to be a full tokenizer
/// since only the comment boundary matters.
pub fn collect_ignore_directives(source: &str) -> Vec<IgnoreDirective> {
    let chars: Vec<char> = source.chars().collect();
    let mut out = Vec::new();
    let mut in_string: Option<(char, bool)> = None;
    let mut line_no = 1usize;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            line_no += 1;
            i += 1;
            continue;
        }
        if let Some((quote, triple)) = in_string {
            if c == '\\' {
                i += 2;
                continue;
            }
            if triple {
                if c == quote && chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote)
                {
                    in_string = None;
                    i += 3;
                    continue;
                }
            } else if c == quote {
                in_string = None;
            } else if c == '\n' {
                // Unterminated single-quoted string on this line; give up
                // tracking rather than eating the rest of the file.
                in_string = None;
            }
            i += 1;
            continue;
        }
        match c {
            '"' | '\'' => {
                let triple = chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c);
                in_string = Some((c, triple));
                i += if triple { 3 } else { 1 };
            }
            '#' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != '\n' {
                    end += 1;
                }
                let body: String = chars[start..end].iter().collect();
                if let Some(directive) = parse_directive(line_no, &body) {
                    out.push(directive);
                }
                i = end;
            }
            _ => i += 1,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_directive() {
        let d = parse_directive(1, "rampart-ignore").unwrap();
        assert!(d.reason.is_none());
        assert!(d.names.is_empty());
        assert!(d.applies_to("anything"));
    }

    #[test]
    fn directive_with_reason() {
        let d = parse_directive(1, "rampart-ignore(legacy shim)").unwrap();
        assert_eq!(d.reason.as_deref(), Some("legacy shim"));
    }

    #[test]
    fn directive_with_names() {
        let d = parse_directive(1, "rampart-ignore Internal, Other").unwrap();
        assert_eq!(d.names, vec!["Internal".to_string(), "Other".to_string()]);
        assert!(d.applies_to("Internal"));
        assert!(!d.applies_to("Unrelated"));
    }

    #[test]
    fn directive_with_reason_and_names() {
        let d = parse_directive(1, "rampart-ignore(legacy) Internal").unwrap();
        assert_eq!(d.reason.as_deref(), Some("legacy"));
        assert_eq!(d.names, vec!["Internal".to_string()]);
    }

    #[test]
    fn non_directive_comment_is_none() {
        assert!(parse_directive(1, "just a regular comment").is_none());
        assert!(parse_directive(1, "rampart-ignored-typo").is_none());
    }

    #[test]
    fn collects_directive_on_its_own_line() {
        let src = "# rampart-ignore(legacy)\nimport a.b\n";
        let found = collect_ignore_directives(src);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].comment_line, 1);
    }

    #[test]
    fn collects_trailing_directive() {
        let src = "import a.b  # rampart-ignore\n";
        let found = collect_ignore_directives(src);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].comment_line, 1);
    }

    #[test]
    fn ignores_hash_inside_string_literal() {
        let src = "x = \"not a # rampart-ignore\"\nimport a.b\n";
        let found = collect_ignore_directives(src);
        assert!(found.is_empty());
    }
}
