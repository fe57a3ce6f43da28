use rampart_config::DottedPath;

use crate::commands::load_project;
use crate::flags::{Args, ReportArgs};

/// `rampart report <module> [--no-deps] [--no-usages]`: print what a module
/// actually imports and who actually imports it, independent of whatever
/// rules are declared for it.
pub fn run(args: &Args, report_args: &ReportArgs) -> anyhow::Result<i32> {
    let project = load_project(&args.project_dir, args.config_path.as_deref())?;
    rampart_check::validate_project_dir(&args.project_dir)?;

    let module = DottedPath::parse(&report_args.module);
    let report = rampart_check::report(&project, &args.project_dir, &module);

    println!("{module}");
    if !report_args.no_deps {
        println!("  dependencies:");
        if report.dependencies.is_empty() {
            println!("    (none)");
        }
        for dep in &report.dependencies {
            println!("    {dep}");
        }
    }
    if !report_args.no_usages {
        println!("  usages:");
        if report.usages.is_empty() {
            println!("    (none)");
        }
        for usage in &report.usages {
            println!("    {usage}");
        }
    }

    Ok(0)
}
