use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use ignore::WalkBuilder;
use rampart_cache::{CacheEntry, FingerprintInputs};
use rampart_config::ProjectConfig;

use crate::commands::load_project;
use crate::flags::{Args, TestArgs};

/// Environment variable naming the interpreter version folded into the
/// fingerprint. There is no dedicated CLI flag for it, since every other
/// input is read from the project itself.
const INTERPRETER_VERSION_ENV: &str = "RAMPART_INTERPRETER_VERSION";

/// `rampart test [action]`: fingerprint the project against `action` and
/// either replay a cached run or execute `action` as a shell
/// command, capture its output, and store it.
pub fn run(args: &Args, test: &TestArgs) -> anyhow::Result<i32> {
    let project = load_project(&args.project_dir, args.config_path.as_deref())?;
    rampart_check::validate_project_dir(&args.project_dir)?;

    let action = test.action.clone().unwrap_or_else(|| "test".to_string());

    let inputs = FingerprintInputs {
        interpreter_version: std::env::var(INTERPRETER_VERSION_ENV).unwrap_or_else(|_| "unknown".to_string()),
        source_files: discover_source_files(&project, &args.project_dir),
        dependency_manifest: read_manifest(&args.project_dir),
        file_dependencies: FingerprintInputs::resolve_file_dependencies(
            &args.project_dir,
            &project.cache.file_dependencies,
        ),
        env_dependencies: FingerprintInputs::read_env_dependencies(&project.cache.env_dependencies),
        action: action.clone(),
    };
    let fingerprint = rampart_cache::compute(&inputs);

    let cache_dir = rampart_cache::resolve_cache_dir(&args.project_dir, &project.cache.cache_dir);
    let cache = rampart_cache::Cache::new(cache_dir);

    if let Some(entry) = cache.get(&fingerprint)? {
        log::debug!("test: cache hit for fingerprint {fingerprint}");
        return Ok(entry.replay(true, io::stdout(), io::stderr()));
    }
    log::debug!("test: cache miss for fingerprint {fingerprint}, running '{action}'");

    let mut command = shell_command(&action);
    command.current_dir(&args.project_dir);
    let entry = CacheEntry::capture(&mut command).map_err(rampart_cache::CacheError::Spawn)?;
    cache.put(&fingerprint, &entry)?;
    Ok(entry.replay(false, io::stdout(), io::stderr()))
}

#[cfg(unix)]
fn shell_command(action: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(action);
    command
}

#[cfg(not(unix))]
fn shell_command(action: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(action);
    command
}

fn discover_source_files(project: &ProjectConfig, project_dir: &Path) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new();
    for root in &project.source_roots {
        builder.add(project_dir.join(root));
    }
    builder.respect_gitignore(project.respect_gitignore);
    builder.source_suffixes(["py"]);
    for pattern in &project.exclude {
        builder.exclude(pattern.clone());
    }
    match builder.build() {
        Ok(walk) => walk
            .filter_map(|entry| match entry {
                Ok(e) if e.is_file() => Some(e.path().to_path_buf()),
                _ => None,
            })
            .collect(),
        Err(err) => {
            log::warn!("test: failed to walk source roots: {err}");
            Vec::new()
        }
    }
}

fn read_manifest(project_dir: &Path) -> Option<Vec<u8>> {
    for candidate in ["pyproject.toml", "requirements.txt"] {
        let path = project_dir.join(candidate);
        if let Ok(bytes) = std::fs::read(&path) {
            return Some(bytes);
        }
    }
    None
}
