/*!
Renders `rampart_check::Diagnostic`s as either a human-readable line
format (`<severity> <file>:<line>: <message>`, with a trailing
summary count) or a stable JSON form, honoring `NO_COLOR` and
non-tty output the way ripgrep's own printer crate does.
*/

use std::io::Write;

use rampart_check::{Diagnostic, DiagnosticKind, Severity};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::flags::OutputFormat;

/// Render `diagnostics` to stdout in `format`, returning the count of
/// `Error`-severity diagnostics (used by the caller to pick an exit code).
pub fn render(diagnostics: &[Diagnostic], format: OutputFormat) -> usize {
    let errors = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    match format {
        OutputFormat::Human => render_human(diagnostics, errors),
        OutputFormat::Json => render_json(diagnostics),
    }
    errors
}

fn render_human(diagnostics: &[Diagnostic], errors: usize) {
    let choice = if std::env::var_os("NO_COLOR").is_some() {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let mut stdout = StandardStream::stdout(choice);

    for diagnostic in diagnostics {
        let mut spec = ColorSpec::new();
        match diagnostic.severity {
            Severity::Error => spec.set_fg(Some(Color::Red)).set_bold(true),
            Severity::Warning => spec.set_fg(Some(Color::Yellow)).set_bold(true),
        };
        let _ = stdout.set_color(&spec);
        let _ = write!(stdout, "{}", severity_label(diagnostic.severity));
        let _ = stdout.reset();
        let _ = writeln!(
            stdout,
            " {}:{}: {}",
            diagnostic.file_path.display(),
            diagnostic.line_number,
            diagnostic.message
        );
    }

    if diagnostics.is_empty() {
        println!("no violations found");
    } else {
        println!(
            "{} error{}, {} warning{}",
            errors,
            if errors == 1 { "" } else { "s" },
            diagnostics.len() - errors,
            if diagnostics.len() - errors == 1 { "" } else { "s" },
        );
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    file_path: String,
    line_number: usize,
    import_mod_path: String,
    severity: &'static str,
    kind: &'static str,
    message: &'a str,
}

fn kind_label(kind: DiagnosticKind) -> &'static str {
    match kind {
        DiagnosticKind::Configuration => "configuration",
        DiagnosticKind::Dependency => "dependency",
        DiagnosticKind::Interface => "interface",
        DiagnosticKind::Deprecated => "deprecated",
        DiagnosticKind::Unused => "unused",
    }
}

fn render_json(diagnostics: &[Diagnostic]) {
    let rendered: Vec<JsonDiagnostic> = diagnostics
        .iter()
        .map(|d| JsonDiagnostic {
            file_path: d.file_path.display().to_string(),
            line_number: d.line_number,
            import_mod_path: d.import_mod_path.to_string(),
            severity: severity_label(d.severity),
            kind: kind_label(d.kind),
            message: &d.message,
        })
        .collect();
    match serde_json::to_string_pretty(&rendered) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("failed to render diagnostics as JSON: {err}"),
    }
}
