/*!
One module per subcommand, each taking the parsed
`Args` and returning the process's eventual exit code (0/1) or an error that
`main.rs` maps to exit 2.
*/

mod check;
mod check_external;
mod report;
mod sync;
mod test_cmd;

pub use check::run as check;
pub use check_external::run as check_external;
pub use report::run as report;
pub use sync::run as sync;
pub use test_cmd::run as test;

use std::path::{Path, PathBuf};

use rampart_config::ProjectConfig;

/// Resolve the configuration path (`--config`, or `<project_dir>/rampart.toml`)
/// and load it, the first step shared by every subcommand.
pub fn load_project(project_dir: &Path, config_path: Option<&Path>) -> anyhow::Result<ProjectConfig> {
    let path: PathBuf = match config_path {
        Some(p) => p.to_path_buf(),
        None => project_dir.join(rampart_config::DEFAULT_CONFIG_FILE_NAME),
    };
    Ok(rampart_config::load(&path)?)
}
