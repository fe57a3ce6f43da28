/*!
A thin `env_logger` wrapper (SPEC_FULL.md "Ambient stack"): level is
controlled by the `-v`/`-vv` CLI flags and the `RAMPART_LOG` environment
variable, mirroring ripgrep's own `crates/core/logger.rs` split between a
minimal custom `Log` impl and a level knob -- except rampart reaches for
`env_logger` directly rather than hand-rolling the `Log` trait, since it
has no need for ripgrep's interleaved-with-search-output formatting.
*/

/// Environment variable consulted in addition to `-v` flags.
pub const LOG_ENV_VAR: &str = "RAMPART_LOG";

/// Initialize the global logger. `verbosity` is the number of `-v` flags
/// given on the command line; it sets a floor under whatever `RAMPART_LOG`
/// requests; one escalation per occurrence: 0 is warnings-and-errors only,
/// 1 is `info`, 2+ is `debug`.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::new().filter(LOG_ENV_VAR).default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
