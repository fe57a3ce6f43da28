use std::fmt;

/// Errors raised while building a `Resolver`. Currently infallible in
/// practice -- filesystem issues while listing source roots are logged and
/// degrade gracefully rather than failing the build -- but kept as a real
/// type since the checker's orchestration layer threads `Result` throughout.
#[derive(Debug)]
pub enum ResolveError {}

impl fmt::Display for ResolveError {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl std::error::Error for ResolveError {}
