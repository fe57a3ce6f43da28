/// A scan-time issue that doesn't prevent the rest of the file from being
/// scanned: an unresolvable relative import is emitted as a
/// `Configuration` diagnostic rather than silently dropped, and a parse
/// error produces one `Configuration` diagnostic pinned to the failing
/// line.
///
/// Kept distinct from `rampart_check::Diagnostic` so this crate doesn't
/// depend on the checker; `rampart-check` promotes each `ScanIssue` into a
/// full diagnostic when it assembles a file's results.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanIssue {
    /// 1-based line the issue is pinned to.
    pub line_number: usize,
    /// Human-readable explanation.
    pub message: String,
}

impl ScanIssue {
    /// Build an issue pinned to `line_number` with the given message.
    pub fn new(line_number: usize, message: impl Into<String>) -> ScanIssue {
        ScanIssue { line_number, message: message.into() }
    }
}
