//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use sdnboard_core::{Notice, NoticeLevel};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// "blocked" in red or "open" in green.
pub fn blocked_label(blocked: bool, color: bool) -> String {
    match (blocked, color) {
        (true, true) => "blocked".red().to_string(),
        (false, true) => "open".green().to_string(),
        (true, false) => "blocked".into(),
        (false, false) => "open".into(),
    }
}

/// An optional timestamp, `-` when the controller sent none.
pub fn timestamp<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "-".into(), ToString::to_string)
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views don't use
/// the `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print operator notices to stderr.
///
/// Failures are always shown; successes are dropped in quiet mode.
pub fn print_notices(notices: &[Notice], global: &GlobalOpts) {
    let color = should_color(&global.color);
    for notice in notices {
        let line = format!("{}: {}", notice.title, notice.description);
        match (notice.level, color) {
            (NoticeLevel::Success, _) if global.quiet => {}
            (NoticeLevel::Success, true) => eprintln!("{} {line}", "✓".green()),
            (NoticeLevel::Success, false) => eprintln!("✓ {line}"),
            (NoticeLevel::Failure, true) => eprintln!("{} {line}", "✗".red()),
            (NoticeLevel::Failure, false) => eprintln!("✗ {line}"),
        }
    }
}

// ── Progress ─────────────────────────────────────────────────────────

/// Run `fut` behind a stderr spinner when stderr is an interactive
/// terminal and output isn't quiet.
pub async fn with_spinner<F: Future>(message: &str, quiet: bool, fut: F) -> F::Output {
    if quiet || !io::stderr().is_terminal() {
        return fut.await;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let out = fut.await;
    spinner.finish_and_clear();
    out
}

// ── Format-specific renderers ────────────────────────────────────────

pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    out.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Serialize;
    use tabled::Tabled;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        ip: String,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "IP")]
        ip: String,
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                ip: "10.0.0.1".into(),
            },
            Item {
                ip: "10.0.0.2".into(),
            },
        ]
    }

    fn row(i: &Item) -> ItemRow {
        ItemRow { ip: i.ip.clone() }
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let out = render_list(&OutputFormat::Plain, &items(), row, |i| i.ip.clone()).unwrap();
        assert_eq!(out, "10.0.0.1\n10.0.0.2");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out =
            render_list(&OutputFormat::JsonCompact, &items(), row, |i| i.ip.clone()).unwrap();
        assert_eq!(out, r#"[{"ip":"10.0.0.1"},{"ip":"10.0.0.2"}]"#);
    }

    #[test]
    fn table_has_header() {
        let out = render_list(&OutputFormat::Table, &items(), row, |i| i.ip.clone()).unwrap();
        assert!(out.contains("IP"));
        assert!(out.contains("10.0.0.2"));
    }

    #[test]
    fn blocked_label_without_color() {
        assert_eq!(blocked_label(true, false), "blocked");
        assert_eq!(blocked_label(false, false), "open");
    }
}
