use std::path::Path;

use rampart_config::DottedPath;

/// Derive a file's own dotted import path from its location under a source
/// root: strip the `.py` extension, treat `__init__.py` as naming its
/// containing directory rather than a `__init__` leaf segment, and replace
/// path separators with `.` ("derived import path").
pub fn module_path_for(source_root: &Path, file: &Path) -> Option<DottedPath> {
    let rel = file.strip_prefix(source_root).ok()?;
    let mut segments: Vec<String> =
        rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();

    let last = segments.pop()?;
    let stem = last.strip_suffix(".py")?;
    if stem != "__init__" {
        segments.push(stem.to_string());
    }
    Some(DottedPath::from_segments(segments))
}
