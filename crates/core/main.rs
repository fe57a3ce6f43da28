/*!
`rampart`'s entry point: parses argv (`flags`), initializes logging
(`logger`), installs the SIGINT handler, dispatches to a
subcommand, and maps the outcome to an exit code:

- 0: the command ran and found no `Error`-severity diagnostic.
- 1: the command ran and found at least one.
- 2: argument parsing failed, the configuration couldn't be loaded, or the
  project directory couldn't be read.
- 3: an internal panic.
*/

mod commands;
mod flags;
mod logger;
mod render;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};

use flags::{Command, ParseResult};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

fn main() -> ExitCode {
    match flags::parse() {
        ParseResult::Special(message) => {
            println!("{message}");
            ExitCode::from(0)
        }
        ParseResult::Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
        ParseResult::Ok(args) => run(args),
    }
}

fn run(args: flags::Args) -> ExitCode {
    logger::init(args.verbosity);
    install_sigint_handler();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        // Exercised by tests/cli.rs to assert the exit-code-3 contract;
        // has no effect in a release build.
        #[cfg(debug_assertions)]
        if std::env::var_os("RAMPART_TEST_PANIC").is_some() {
            panic!("RAMPART_TEST_PANIC: deliberate panic for exit-code-3 testing");
        }
        dispatch(&args)
    }));
    match outcome {
        Ok(Ok(code)) => ExitCode::from(code as u8),
        Ok(Err(err)) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
        Err(panic) => {
            eprintln!("internal error: {}", panic_message(&panic));
            ExitCode::from(3)
        }
    }
}

fn dispatch(args: &flags::Args) -> anyhow::Result<i32> {
    match &args.command {
        Command::Check(check) => commands::check(args, check, args.format),
        Command::CheckExternal => commands::check_external(args, args.format),
        Command::Report(report) => commands::report(args, report),
        Command::Sync(sync) => commands::sync(args, sync),
        Command::Test(test) => commands::test(args, test),
    }
}

/// Catch a second Ctrl-C and terminate immediately; the first one is left to
/// the in-flight batch, which runs to completion and flushes its
/// diagnostics normally ("A soft interrupt... lets the current
/// batch finish and its accumulated diagnostics flush before exit; a second
/// interrupt terminates immediately.").
fn install_sigint_handler() {
    let _ = ctrlc::set_handler(|| {
        if INTERRUPTED.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        log::warn!("interrupted; finishing in-flight work (press Ctrl-C again to force quit)");
    });
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
