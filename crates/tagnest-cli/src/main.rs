use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tagnest_lexer::{TagKind, TagToken, COMPONENT_PRESET};
use tagnest_validator::{Diagnostic, ValidateError, ValidatorConfig, CONFIG_FILE_NAME};
use tracing::info;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "tagnest")]
#[command(about = "tagnest: report unclosed, extra and mismatched tags in JSX-like markup")]
#[command(version)]
struct Cli {
    /// Log scan details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a file for tag nesting errors
    Check {
        /// Input markup file
        path: PathBuf,

        #[command(flatten)]
        options: ScanOptions,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Print the tag tokens found in a file
    Tokens {
        /// Input markup file
        path: PathBuf,

        #[command(flatten)]
        options: ScanOptions,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Args, Debug, Default)]
struct ScanOptions {
    /// Config file (defaults to ./tagnest.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Tag name to track; repeatable. Replaces the config file's list
    #[arg(short, long = "tag", value_name = "NAME")]
    tags: Vec<String>,

    /// Track a built-in set of tag names
    #[arg(long, value_enum, conflicts_with = "tags")]
    preset: Option<Preset>,

    /// Track every tag-like token
    #[arg(long, conflicts_with_all = ["tags", "preset"])]
    all: bool,

    /// Do not suppress opens that are self-closed on the same line
    #[arg(long)]
    no_self_closing: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// div, main, Card, CardContent, Dialog, DialogContent, Badge
    Components,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    path: &'a Path,
    diagnostics: &'a [Diagnostic],
}

#[derive(Serialize)]
struct JsonTokens<'a> {
    path: &'a Path,
    tokens: &'a [TagToken],
}

/// Errors that end the run with status 1.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error("serializing output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("writing output: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    /// A reader that went away (`tagnest check ... | head`) is not a failure.
    fn is_broken_pipe(&self) -> bool {
        match self {
            CliError::Output(e) => e.kind() == io::ErrorKind::BrokenPipe,
            CliError::Json(e) => e.io_error_kind() == Some(io::ErrorKind::BrokenPipe),
            CliError::Validate(_) => false,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut out = io::stdout().lock();
    let result = match cli.command {
        Command::Check {
            path,
            options,
            format,
        } => cmd_check(&mut out, &path, &options, format),
        Command::Tokens {
            path,
            options,
            format,
        } => cmd_tokens(&mut out, &path, &options, format),
    };

    match result {
        Ok(()) => {}
        Err(e) if e.is_broken_pipe() => {}
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "tagnest=debug" } else { "tagnest=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Defaults, then the config file, then command-line flags.
fn resolve_config(options: &ScanOptions) -> Result<ValidatorConfig, ValidateError> {
    let mut config = match &options.config {
        Some(path) => ValidatorConfig::load(path)?,
        None if Path::new(CONFIG_FILE_NAME).is_file() => {
            ValidatorConfig::load(Path::new(CONFIG_FILE_NAME))?
        }
        None => ValidatorConfig::default(),
    };

    apply_flags(&mut config, options);
    Ok(config)
}

fn apply_flags(config: &mut ValidatorConfig, options: &ScanOptions) {
    if !options.tags.is_empty() {
        config.tracked_tags = options.tags.clone();
        config.all_tags = false;
    }
    if let Some(Preset::Components) = options.preset {
        config.tracked_tags = COMPONENT_PRESET.iter().map(|s| s.to_string()).collect();
        config.all_tags = false;
    }
    if options.all {
        config.all_tags = true;
    }
    if options.no_self_closing {
        config.self_closing_heuristic = false;
    }
}

/// Findings are output, not failures: only unreadable input is an error.
fn cmd_check(
    out: &mut impl Write,
    path: &Path,
    options: &ScanOptions,
    format: Format,
) -> Result<(), CliError> {
    let config = resolve_config(options)?;
    info!(path = %path.display(), ?config, "checking");

    let report = tagnest_validator::validate_file(path, &config)?;

    match format {
        Format::Text => out.write_all(report.render_text().as_bytes())?,
        Format::Json => {
            let json = JsonReport {
                path,
                diagnostics: &report.diagnostics,
            };
            serde_json::to_writer_pretty(&mut *out, &json)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn cmd_tokens(
    out: &mut impl Write,
    path: &Path,
    options: &ScanOptions,
    format: Format,
) -> Result<(), CliError> {
    let config = resolve_config(options)?;
    let source = std::fs::read_to_string(path).map_err(|source| ValidateError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let tokens = config.scanner().tokenize(&source);
    match format {
        Format::Text => {
            for token in &tokens {
                writeln!(out, "{}", format_token(token))?;
            }
        }
        Format::Json => {
            let json = JsonTokens {
                path,
                tokens: &tokens,
            };
            serde_json::to_writer_pretty(&mut *out, &json)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn format_token(token: &TagToken) -> String {
    let kind = match token.kind {
        TagKind::Open => "open",
        TagKind::Close => "close",
    };
    format!(
        "{}:{} {kind} {}",
        token.span.line, token.span.column, token.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tagnest").chain(args.iter().copied())).unwrap()
    }

    fn options(cli: Cli) -> ScanOptions {
        match cli.command {
            Command::Check { options, .. } | Command::Tokens { options, .. } => options,
        }
    }

    #[test]
    fn test_check_defaults() {
        let cli = parse(&["check", "page.tsx"]);
        assert!(!cli.verbose);
        match cli.command {
            Command::Check { path, format, .. } => {
                assert_eq!(path, PathBuf::from("page.tsx"));
                assert_eq!(format, Format::Text);
            }
            Command::Tokens { .. } => panic!("expected check"),
        }
    }

    #[test]
    fn test_repeated_tags() {
        let mut config = ValidatorConfig::default();
        apply_flags(
            &mut config,
            &options(parse(&["check", "p.tsx", "-t", "Card", "--tag", "div"])),
        );
        assert_eq!(config.tracked_tags, vec!["Card", "div"]);
    }

    #[test]
    fn test_flags_override_file() {
        let mut config = ValidatorConfig {
            all_tags: true,
            ..ValidatorConfig::watching(["main"])
        };
        apply_flags(
            &mut config,
            &options(parse(&["tokens", "p.tsx", "--preset", "components", "--no-self-closing"])),
        );
        assert_eq!(config.tracked_tags.len(), COMPONENT_PRESET.len());
        assert!(!config.all_tags);
        assert!(!config.self_closing_heuristic);
    }

    #[test]
    fn test_all_conflicts_with_tags() {
        let result = Cli::try_parse_from(["tagnest", "check", "p.tsx", "--all", "--tag", "div"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_format() {
        let cli = parse(&["-v", "check", "p.tsx", "--format", "json"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Check { format: Format::Json, .. }));
    }

    #[test]
    fn test_explicit_config_missing() {
        let opts = ScanOptions {
            config: Some(PathBuf::from("/nonexistent/tagnest.toml")),
            ..ScanOptions::default()
        };
        assert!(resolve_config(&opts).is_err());
    }

    #[test]
    fn test_format_token() {
        assert_eq!(format_token(&TagToken::open("Card", 3, 5)), "3:5 open Card");
        assert_eq!(format_token(&TagToken::close("div", 9, 1)), "9:1 close div");
    }

    #[test]
    fn test_json_report_shape() {
        let diagnostics = vec![Diagnostic::MismatchedTag {
            opened: "div".into(),
            opened_line: 2,
            closed: "Card".into(),
            closed_line: 3,
        }];
        let json = JsonReport {
            path: Path::new("page.tsx"),
            diagnostics: &diagnostics,
        };
        assert_eq!(
            serde_json::to_value(&json).unwrap(),
            serde_json::json!({
                "path": "page.tsx",
                "diagnostics": [{
                    "kind": "mismatched_tag",
                    "opened": "div",
                    "opened_line": 2,
                    "closed": "Card",
                    "closed_line": 3
                }]
            })
        );
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Writes `source` to a temp file unique to this test.
    fn temp_source(name: &str, source: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("tagnest-cli-{}-{name}.tsx", std::process::id()));
        std::fs::write(&path, source).unwrap();
        path
    }

    fn run_check(path: &Path, options: &ScanOptions, format: Format) -> (Result<(), CliError>, String) {
        let mut out = Vec::new();
        let result = cmd_check(&mut out, path, options, format);
        (result, String::from_utf8(out).unwrap())
    }

    /// Writer whose every write fails with the given kind.
    struct FailingWriter(io::ErrorKind);

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(self.0))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_check_with_faults_succeeds() {
        let path = temp_source("faults", "<main>\n<Card>\n<div>\n</Card>\n</div>\n</Badge>\n");
        let options = ScanOptions {
            preset: Some(Preset::Components),
            ..ScanOptions::default()
        };
        let (result, output) = run_check(&path, &options, Format::Text);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_ok());
        assert_eq!(
            output,
            "Mismatch: Opened div at 3, but closed Card at 4\n\
             Mismatch: Opened Card at 2, but closed div at 5\n\
             Mismatch: Opened main at 1, but closed Badge at 6\n"
        );
    }

    #[test]
    fn test_check_json_output() {
        let path = temp_source("json", "</div>\n<div>\n");
        let (result, output) = run_check(&path, &ScanOptions::default(), Format::Json);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_ok());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value["diagnostics"],
            serde_json::json!([
                { "kind": "extra_closing_tag", "tag": "div", "line": 1 },
                { "kind": "unclosed_tags", "tags": [{ "tag": "div", "line": 2 }] }
            ])
        );
    }

    #[test]
    fn test_check_missing_input() {
        let (result, output) = run_check(
            Path::new("/nonexistent/x.tsx"),
            &ScanOptions::default(),
            Format::Text,
        );
        assert!(matches!(result, Err(CliError::Validate(ValidateError::Io { .. }))));
        assert_eq!(output, "");
    }

    #[test]
    fn test_tokens_missing_input() {
        let mut out = Vec::new();
        let result = cmd_tokens(
            &mut out,
            Path::new("/nonexistent/x.tsx"),
            &ScanOptions::default(),
            Format::Text,
        );
        assert!(matches!(result, Err(CliError::Validate(ValidateError::Io { .. }))));
    }

    #[test]
    fn test_tokens_text_output() {
        let path = temp_source("tokens-text", "<div>\n  <Badge />\n</div>\n");
        let options = ScanOptions {
            tags: vec!["div".into(), "Badge".into()],
            ..ScanOptions::default()
        };
        let mut out = Vec::new();
        let result = cmd_tokens(&mut out, &path, &options, Format::Text);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_ok());
        assert_eq!(String::from_utf8(out).unwrap(), "1:1 open div\n3:1 close div\n");
    }

    #[test]
    fn test_tokens_json_output() {
        let path = temp_source("tokens-json", "  <div></div>\n");
        let mut out = Vec::new();
        let result = cmd_tokens(&mut out, &path, &ScanOptions::default(), Format::Json);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_ok());
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            value["tokens"],
            serde_json::json!([
                { "kind": "open", "name": "div", "span": { "line": 1, "column": 3 } },
                { "kind": "close", "name": "div", "span": { "line": 1, "column": 8 } }
            ])
        );
    }

    #[test]
    fn test_tokens_format_flag() {
        let cli = parse(&["tokens", "p.tsx", "--format", "json"]);
        assert!(matches!(cli.command, Command::Tokens { format: Format::Json, .. }));
    }

    // =========================================================================
    // Output failures
    // =========================================================================

    #[test]
    fn test_write_failure_is_an_error() {
        let path = temp_source("write-fail", "</div>\n");
        let mut out = FailingWriter(io::ErrorKind::Other);
        let result = cmd_check(&mut out, &path, &ScanOptions::default(), Format::Text);
        std::fs::remove_file(&path).unwrap();

        let err = result.unwrap_err();
        assert!(matches!(err, CliError::Output(_)));
        assert!(!err.is_broken_pipe());
    }

    #[test]
    fn test_json_write_failure_is_an_error() {
        let path = temp_source("json-fail", "</div>\n");
        let mut out = FailingWriter(io::ErrorKind::Other);
        let result = cmd_check(&mut out, &path, &ScanOptions::default(), Format::Json);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(CliError::Json(_))));
    }

    #[test]
    fn test_broken_pipe_is_quiet() {
        let path = temp_source("pipe", "</div>\n");
        let mut text = FailingWriter(io::ErrorKind::BrokenPipe);
        let text_result = cmd_check(&mut text, &path, &ScanOptions::default(), Format::Text);
        let mut json = FailingWriter(io::ErrorKind::BrokenPipe);
        let json_result = cmd_check(&mut json, &path, &ScanOptions::default(), Format::Json);
        std::fs::remove_file(&path).unwrap();

        assert!(text_result.unwrap_err().is_broken_pipe());
        assert!(json_result.unwrap_err().is_broken_pipe());
    }
}
