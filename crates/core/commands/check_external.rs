use rampart_check::{CheckOptions, DiagnosticKind};
use rampart_resolve::{Resolution, Resolver};

use crate::commands::load_project;
use crate::flags::{Args, OutputFormat};
use crate::render;

/// `rampart check-external`: the same dependency pipeline as `check`, but
/// narrowed to imports that resolve to an external package or to nothing
/// recognizable at all, reusing the checker's diagnostics rather than
/// re-deriving them.
pub fn run(args: &Args, format: OutputFormat) -> anyhow::Result<i32> {
    let project = load_project(&args.project_dir, args.config_path.as_deref())?;
    rampart_check::validate_project_dir(&args.project_dir)?;

    let resolver = Resolver::build(&project, &args.project_dir);
    let diagnostics = rampart_check::check_project(&project, &args.project_dir, CheckOptions::default());

    let external_only: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| {
            matches!(d.kind, DiagnosticKind::Dependency | DiagnosticKind::Deprecated)
                && !d.import_mod_path.is_empty()
                && !matches!(resolver.resolve(&d.import_mod_path), Resolution::Internal { .. })
        })
        .collect();

    let errors = render::render(&external_only, format);
    Ok(if errors > 0 { 1 } else { 0 })
}
