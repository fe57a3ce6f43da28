/// Directories that are always excluded from file discovery unless the
/// caller opts out ("The configured default excludes cover
/// compiled-artifact directories, build outputs, and virtual-environment
/// directories; these are always added unless the user opts out.").
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/.git",
    "**/__pycache__",
    "**/*.pyc",
    "**/*.pyo",
    "**/.venv",
    "**/venv",
    "**/env",
    "**/.tox",
    "**/.mypy_cache",
    "**/.pytest_cache",
    "**/.ruff_cache",
    "**/node_modules",
    "**/dist",
    "**/build",
    "**/*.egg-info",
    "**/.eggs",
];
