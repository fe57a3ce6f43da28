/*!
Parses rampart's CLI surface into a structured representation.

Kept as a single hand-rolled pass over `lexopt::Parser`, in the spirit of
ripgrep's own flag layer (no derive-macro CLI framework) but scaled down to
the handful of subcommands and flags rampart's CLI surface actually calls for.
*/

use std::path::PathBuf;

use lexopt::{Arg, Parser};

/// The result of parsing argv: either a fully-formed command, a request to
/// print help/version and exit, or a parse error (mapped by the caller to
/// exit code 2).
pub enum ParseResult {
    /// Arguments parsed into a runnable command.
    Ok(Args),
    /// `-h/--help` or `-V/--version` was given; print this and exit 0.
    Special(String),
    /// Argv didn't parse.
    Err(anyhow::Error),
}

/// Global flags accepted before or after the subcommand name, plus the
/// subcommand itself.
pub struct Args {
    /// Project root to operate on (defaults to the current directory).
    pub project_dir: PathBuf,
    /// Path to the configuration file (defaults to `<project_dir>/rampart.toml`).
    pub config_path: Option<PathBuf>,
    /// `--output json` switches diagnostic rendering to the stable JSON form.
    pub format: OutputFormat,
    /// Number of `-v` flags given, controlling `log`'s max level.
    pub verbosity: u8,
    /// The subcommand to run.
    pub command: Command,
}

/// `--output` values ("also serializable to a stable JSON form").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    /// `<severity> <file>:<line>: <message>` lines plus a summary count.
    Human,
    /// One JSON array of diagnostic objects.
    Json,
}

/// One of rampart's CLI surface commands.
pub enum Command {
    /// `check [--dependencies] [--interfaces] [--exact] [--exclude PATH,...]`
    Check(CheckArgs),
    /// `check-external`
    CheckExternal,
    /// `report PATH [--no-deps] [--no-usages]`
    Report(ReportArgs),
    /// `sync [--add]`
    Sync(SyncArgs),
    /// `test [action]`
    Test(TestArgs),
}

/// `check` subcommand flags.
#[derive(Default)]
pub struct CheckArgs {
    /// `--dependencies`: limit to dependency-list rules only.
    pub dependencies_only: bool,
    /// `--interfaces`: limit to interface-strictness rules only.
    pub interfaces_only: bool,
    /// `--exact`: also report unused declared dependencies.
    pub exact: bool,
    /// `--exclude PATH,...`: extra exclude patterns, on top of config.
    pub extra_excludes: Vec<String>,
}

/// `report` subcommand flags.
pub struct ReportArgs {
    /// The dotted module path to report on.
    pub module: String,
    /// `--no-deps`: omit the dependencies side of the report.
    pub no_deps: bool,
    /// `--no-usages`: omit the usages side of the report.
    pub no_usages: bool,
}

/// `sync` subcommand flags.
#[derive(Default)]
pub struct SyncArgs {
    /// `--add`: also append observed-but-undeclared dependencies, not just
    /// remove unused ones.
    pub add: bool,
}

/// `test` subcommand flags.
pub struct TestArgs {
    /// The action label to fingerprint and cache ("a
    /// caller-supplied `action` label"). Defaults to `"test"`.
    pub action: Option<String>,
}

const HELP: &str = "\
rampart: enforce architectural boundaries in a source repository

USAGE:
    rampart [OPTIONS] <COMMAND>

COMMANDS:
    check            Check every import against the declared rules
    check-external   Check only imports that resolve to external packages
    report <PATH>    Show a module's dependencies and usages
    sync             Bring declared dependencies in line with observed imports
    test [ACTION]    Run (or replay, if cached) a named action

OPTIONS:
    -C, --project-dir <DIR>   Project root (default: current directory)
        --config <PATH>       Configuration file (default: <DIR>/rampart.toml)
        --output <FORMAT>     human (default) or json
    -v                        Increase log verbosity (repeatable)
    -h, --help                Print this message
    -V, --version              Print the version
";

/// Parse `std::env::args_os()` into a `ParseResult`.
pub fn parse() -> ParseResult {
    let mut parser = Parser::from_env();
    parse_from(&mut parser)
}

fn parse_from(parser: &mut Parser) -> ParseResult {
    let mut project_dir = PathBuf::from(".");
    let mut config_path = None;
    let mut format = OutputFormat::Human;
    let mut verbosity = 0u8;
    let mut command_name: Option<String> = None;
    let mut positionals: Vec<String> = Vec::new();
    let mut dependencies_only = false;
    let mut interfaces_only = false;
    let mut exact = false;
    let mut extra_excludes = Vec::new();
    let mut no_deps = false;
    let mut no_usages = false;
    let mut add = false;

    loop {
        let arg = match parser.next() {
            Ok(Some(arg)) => arg,
            Ok(None) => break,
            Err(err) => return ParseResult::Err(err.into()),
        };
        let result = match arg {
            Arg::Short('h') | Arg::Long("help") => return ParseResult::Special(HELP.to_string()),
            Arg::Short('V') | Arg::Long("version") => {
                return ParseResult::Special(format!("rampart {}", env!("CARGO_PKG_VERSION")))
            }
            Arg::Short('C') | Arg::Long("project-dir") => {
                parser.value().map(|v| project_dir = PathBuf::from(v))
            }
            Arg::Long("config") => parser.value().map(|v| config_path = Some(PathBuf::from(v))),
            Arg::Long("output") => parser.value().and_then(|v| {
                match v.to_string_lossy().as_ref() {
                    "json" => format = OutputFormat::Json,
                    _ => format = OutputFormat::Human,
                }
                Ok(())
            }),
            Arg::Short('v') => {
                verbosity = verbosity.saturating_add(1);
                Ok(())
            }
            Arg::Long("dependencies") => {
                dependencies_only = true;
                Ok(())
            }
            Arg::Long("interfaces") => {
                interfaces_only = true;
                Ok(())
            }
            Arg::Long("exact") => {
                exact = true;
                Ok(())
            }
            Arg::Long("exclude") => parser.value().map(|v| {
                extra_excludes.extend(v.to_string_lossy().split(',').map(str::to_string));
            }),
            Arg::Long("no-deps") => {
                no_deps = true;
                Ok(())
            }
            Arg::Long("no-usages") => {
                no_usages = true;
                Ok(())
            }
            Arg::Long("add") => {
                add = true;
                Ok(())
            }
            Arg::Value(value) => {
                let value = value.to_string_lossy().into_owned();
                if command_name.is_none() {
                    command_name = Some(value);
                } else {
                    positionals.push(value);
                }
                Ok(())
            }
            arg => Err(arg.unexpected()),
        };
        if let Err(err) = result {
            return ParseResult::Err(err.into());
        }
    }

    let Some(command_name) = command_name else {
        return ParseResult::Err(anyhow::anyhow!("no command given; see --help"));
    };

    let command = match command_name.as_str() {
        "check" => Command::Check(CheckArgs {
            dependencies_only,
            interfaces_only,
            exact,
            extra_excludes,
        }),
        "check-external" => Command::CheckExternal,
        "report" => {
            let Some(module) = positionals.into_iter().next() else {
                return ParseResult::Err(anyhow::anyhow!("report requires a module path argument"));
            };
            Command::Report(ReportArgs { module, no_deps, no_usages })
        }
        "sync" => Command::Sync(SyncArgs { add }),
        "test" => Command::Test(TestArgs { action: positionals.into_iter().next() }),
        other => return ParseResult::Err(anyhow::anyhow!("unrecognized command '{other}'")),
    };

    ParseResult::Ok(Args { project_dir, config_path, format, verbosity, command })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Args {
        let mut parser = Parser::from_args(args.iter().copied());
        match parse_from(&mut parser) {
            ParseResult::Ok(args) => args,
            ParseResult::Special(s) => panic!("unexpected special result: {s}"),
            ParseResult::Err(err) => panic!("unexpected parse error: {err}"),
        }
    }

    #[test]
    fn parses_plain_check() {
        let args = parse_args(&["check"]);
        assert!(matches!(args.command, Command::Check(_)));
        assert_eq!(args.format, OutputFormat::Human);
    }

    #[test]
    fn parses_check_flags() {
        let args = parse_args(&["check", "--exact", "--dependencies"]);
        let Command::Check(check) = args.command else { panic!("expected check") };
        assert!(check.exact);
        assert!(check.dependencies_only);
    }

    #[test]
    fn parses_report_module_argument() {
        let args = parse_args(&["report", "app.core", "--no-usages"]);
        let Command::Report(report) = args.command else { panic!("expected report") };
        assert_eq!(report.module, "app.core");
        assert!(report.no_usages);
        assert!(!report.no_deps);
    }

    #[test]
    fn report_without_module_is_an_error() {
        let mut parser = Parser::from_args(["report"]);
        assert!(matches!(parse_from(&mut parser), ParseResult::Err(_)));
    }

    #[test]
    fn parses_global_project_dir_and_json_output() {
        let args = parse_args(&["-C", "/tmp/proj", "--output", "json", "test", "lint"]);
        assert_eq!(args.project_dir, PathBuf::from("/tmp/proj"));
        assert_eq!(args.format, OutputFormat::Json);
        let Command::Test(test) = args.command else { panic!("expected test") };
        assert_eq!(test.action.as_deref(), Some("lint"));
    }

    #[test]
    fn help_flag_short_circuits() {
        let mut parser = Parser::from_args(["--help"]);
        assert!(matches!(parse_from(&mut parser), ParseResult::Special(_)));
    }
}
