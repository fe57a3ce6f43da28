use std::fmt;

use regex::Regex;

const SEPARATOR: char = '/';

/// An error that occurred while compiling a glob pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    glob: String,
    kind: ErrorKind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum ErrorKind {
    UnclosedClass,
    DanglingEscape,
    InvalidRange(char, char),
    Regex(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::UnclosedClass => {
                write!(f, "unclosed character class in glob '{}'", self.glob)
            }
            ErrorKind::DanglingEscape => {
                write!(f, "dangling '\\' at end of glob '{}'", self.glob)
            }
            ErrorKind::InvalidRange(a, b) => write!(
                f,
                "invalid range '{}-{}' in glob '{}'",
                a, b, self.glob
            ),
            ErrorKind::Regex(msg) => {
                write!(f, "invalid glob '{}': {}", self.glob, msg)
            }
        }
    }
}

/// A builder for a single compiled glob pattern.
///
/// The concrete syntax supported is deliberately small: `?` matches any
/// single character except the path separator, `*` matches any run of
/// characters except the separator, `**` matches any run of characters
/// including separators, and `[...]` matches a single character out of a
/// class (optionally negated with a leading `!` or `^`). Everything else is
/// matched literally.
#[derive(Clone, Debug)]
pub struct GlobBuilder<'a> {
    glob: &'a str,
    case_insensitive: bool,
    literal_separator: bool,
}

impl<'a> GlobBuilder<'a> {
    /// Create a new builder for the given glob pattern.
    pub fn new(glob: &'a str) -> GlobBuilder<'a> {
        GlobBuilder { glob, case_insensitive: false, literal_separator: false }
    }

    /// When enabled, matching is case insensitive.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut GlobBuilder<'a> {
        self.case_insensitive = yes;
        self
    }

    /// When enabled, `*` and `?` never match the path separator, even when
    /// the glob contains no literal separator of its own. Disabled by
    /// default, matching the exclude-glob semantics of : a bare
    /// `*` is a prefix match against path segments joined with `/`, and the
    /// caller is expected to split on `/` themselves if segment-exact
    /// matching is wanted. `**` always matches separators regardless of
    /// this setting.
    pub fn literal_separator(&mut self, yes: bool) -> &mut GlobBuilder<'a> {
        self.literal_separator = yes;
        self
    }

    /// Parse and compile the pattern into a `Glob`.
    pub fn build(&self) -> Result<Glob, Error> {
        let translated = translate(self.glob, self.literal_separator)
            .map_err(|kind| Error { glob: self.glob.to_string(), kind })?;
        let mut pattern = String::with_capacity(translated.len() + 8);
        if self.case_insensitive {
            pattern.push_str("(?i)");
        }
        pattern.push('^');
        pattern.push_str(&translated);
        pattern.push('$');
        let re = Regex::new(&pattern).map_err(|err| Error {
            glob: self.glob.to_string(),
            kind: ErrorKind::Regex(err.to_string()),
        })?;
        Ok(Glob { original: self.glob.to_string(), re })
    }
}

/// A single compiled glob pattern.
#[derive(Clone, Debug)]
pub struct Glob {
    original: String,
    re: Regex,
}

impl Glob {
    /// Compile `glob` with default options.
    pub fn new(glob: &str) -> Result<Glob, Error> {
        GlobBuilder::new(glob).build()
    }

    /// The original glob string this was compiled from.
    pub fn glob(&self) -> &str {
        &self.original
    }

    /// Convert this glob into a standalone matcher.
    pub fn compile_matcher(&self) -> GlobMatcher {
        GlobMatcher { glob: self.clone() }
    }

    fn is_match_candidate(&self, candidate: &str) -> bool {
        self.re.is_match(candidate)
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl PartialEq for Glob {
    fn eq(&self, other: &Glob) -> bool {
        self.original == other.original
    }
}

impl Eq for Glob {}

/// A matcher for a single glob, normalizing its input the same way a
/// `GlobSet` would.
#[derive(Clone, Debug)]
pub struct GlobMatcher {
    glob: Glob,
}

impl GlobMatcher {
    /// Test whether `path` (forward-slash separated, relative to the
    /// project root) matches this glob.
    pub fn is_match<P: AsRef<str>>(&self, path: P) -> bool {
        self.glob.is_match_candidate(path.as_ref())
    }

    /// The glob this matcher was built from.
    pub fn glob(&self) -> &Glob {
        &self.glob
    }
}

/// Translate a glob pattern into an (unanchored) regex body.
fn translate(glob: &str, literal_separator: bool) -> Result<String, ErrorKind> {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::with_capacity(chars.len() * 2);
    let mut i = 0;
    let not_sep = if literal_separator {
        r"[^/]"
    } else {
        r"[^/]" // `*` never crosses a `/` boundary; use `**` for that.
    };

    while i < chars.len() {
        match chars[i] {
            '*' => {
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    // `**`: match across directory boundaries. Consume any
                    // trailing/leading separator so `**/foo` and `foo/**`
                    // behave as users expect.
                    i += 2;
                    let leading_sep = out.ends_with('/');
                    let _ = leading_sep;
                    if i < chars.len() && chars[i] == '/' {
                        i += 1;
                        out.push_str("(?:.*/)?");
                    } else {
                        out.push_str(".*");
                    }
                } else {
                    out.push_str(not_sep);
                    out.push('*');
                    i += 1;
                }
            }
            '?' => {
                out.push_str(not_sep);
                i += 1;
            }
            '[' => {
                let start = i;
                i += 1;
                let negate = i < chars.len() && (chars[i] == '!' || chars[i] == '^');
                if negate {
                    i += 1;
                }
                let class_start = i;
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(ErrorKind::UnclosedClass);
                }
                let class: String = chars[class_start..i].iter().collect();
                validate_ranges(&class)?;
                i += 1; // consume ']'
                let _ = start;
                out.push('[');
                if negate {
                    out.push('^');
                }
                out.push_str(&escape_class_body(&class));
                out.push(']');
            }
            '\\' => {
                i += 1;
                if i >= chars.len() {
                    return Err(ErrorKind::DanglingEscape);
                }
                out.push_str(&regex::escape(&chars[i].to_string()));
                i += 1;
            }
            c => {
                out.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }
    Ok(out)
}

fn validate_ranges(class: &str) -> Result<(), ErrorKind> {
    let chars: Vec<char> = class.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if i + 2 < chars.len() && chars[i + 1] == '-' {
            let (a, b) = (chars[i], chars[i + 2]);
            if a > b {
                return Err(ErrorKind::InvalidRange(a, b));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

fn escape_class_body(class: &str) -> String {
    // Characters that are special inside a regex character class but not
    // inside a glob class: escape them, but leave `-` alone so ranges keep
    // working.
    let mut out = String::with_capacity(class.len());
    for c in class.chars() {
        if c == '\\' || c == ']' || c == '^' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
