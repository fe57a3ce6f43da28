use rampart_check::CheckOptions;

use crate::commands::load_project;
use crate::flags::{Args, CheckArgs, OutputFormat};
use crate::render;

/// `rampart check`: the full rule pipeline against every
/// `(file, import)` pair, plus the project-wide circular- and
/// unused-dependency checks. Returns 0 when no `Error`-severity diagnostic
/// was raised, 1 otherwise.
pub fn run(args: &Args, check: &CheckArgs, format: OutputFormat) -> anyhow::Result<i32> {
    let project = load_project(&args.project_dir, args.config_path.as_deref())?;
    rampart_check::validate_project_dir(&args.project_dir)?;

    let mut exclude = project.exclude.clone();
    exclude.extend(check.extra_excludes.iter().cloned());
    let mut project = project;
    project.exclude = exclude;

    let options = CheckOptions {
        dependencies_only: check.dependencies_only,
        interfaces_only: check.interfaces_only,
        exact: check.exact,
    };
    let diagnostics = rampart_check::check_project(&project, &args.project_dir, options);
    let errors = render::render(&diagnostics, format);
    Ok(if errors > 0 { 1 } else { 0 })
}
