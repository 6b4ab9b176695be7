//! Command-line front end for the calculator.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use safecalc::calculator::{CalcResult, Calculator, ErrorCategory, looks_like_expression};
use safecalc::Config;

#[derive(Parser, Debug)]
#[command(name = "safecalc", version, about = "Evaluate arithmetic expressions safely")]
struct Args {
    /// Expression to evaluate. Reads one expression per line from stdin when omitted.
    expression: Option<String>,

    /// Skip stdin lines that do not look like calculations.
    #[arg(long)]
    filter: bool,

    /// Print one JSON object per expression.
    #[arg(long)]
    json: bool,

    /// Print the parsed tree as JSON instead of evaluating.
    #[arg(long)]
    ast: bool,

    /// Print results without thousand separators.
    #[arg(long)]
    raw: bool,

    /// Path to a TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Maximum nesting of parentheses and unary minuses.
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Maximum expression length in characters.
    #[arg(long, value_name = "N")]
    max_input_len: Option<usize>,
}

/// One line of `--json` output.
#[derive(Serialize)]
struct Report<'a> {
    expression: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<ErrorCategory>,
    message: &'a str,
}

impl<'a> From<&'a CalcResult> for Report<'a> {
    fn from(result: &'a CalcResult) -> Self {
        match result {
            CalcResult::Success {
                expression,
                value,
                display_result,
                ..
            } => Self {
                expression,
                ok: true,
                value: Some(*value),
                error: None,
                category: None,
                message: display_result,
            },
            CalcResult::Error { expression, error } => Self {
                expression,
                ok: false,
                value: None,
                error: Some(error.to_string()),
                category: Some(error.category()),
                message: error.user_message(),
            },
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let outcome = run(Args::parse());
    if let Err(err) = &outcome {
        eprintln!("error: {:#}", err);
    }
    ExitCode::from(exit_status(&outcome))
}

/// 0 when everything evaluated, 1 when some expression failed, 2 when the
/// run itself failed.
fn exit_status(outcome: &Result<bool>) -> u8 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

/// Returns whether every expression evaluated successfully.
fn run(args: Args) -> Result<bool> {
    let mut config =
        Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(max_input_len) = args.max_input_len {
        config.max_input_len = max_input_len;
    }
    if args.raw {
        config.thousands_separator = false;
    }
    config.validate().context("Invalid limits")?;
    debug!(?config, "effective configuration");

    let calculator = Calculator::from_config(&config);
    let mut out = io::stdout().lock();

    match &args.expression {
        Some(expression) => handle(&calculator, &args, expression, &mut out),
        None => run_lines(&calculator, &args, io::stdin().lock(), &mut out),
    }
}

/// Evaluate one expression per input line.
fn run_lines(
    calculator: &Calculator,
    args: &Args,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<bool> {
    let mut all_ok = true;
    for line in input.lines() {
        let line = line.context("Failed to read from stdin")?;
        if args.filter && !looks_like_expression(&line) {
            debug!(line = %line, "skipping non-expression line");
            continue;
        }
        all_ok &= handle(calculator, args, &line, out)?;
    }
    Ok(all_ok)
}

fn handle(
    calculator: &Calculator,
    args: &Args,
    input: &str,
    out: &mut impl Write,
) -> Result<bool> {
    if args.ast {
        return print_ast(calculator, input, out);
    }

    let result = calculator.calculate(input);
    if args.json {
        serde_json::to_writer(&mut *out, &Report::from(&result))?;
        writeln!(out)?;
    } else {
        match &result {
            CalcResult::Success { display_result, .. } => {
                writeln!(out, "Result: {}", display_result)?
            }
            CalcResult::Error { error, .. } if error.category() == ErrorCategory::EmptyInput => {
                writeln!(out, "{}", error.user_message())?
            }
            CalcResult::Error { error, .. } => {
                writeln!(out, "{} ({})", error.user_message(), error)?
            }
        }
    }
    Ok(result.is_success())
}

fn print_ast(calculator: &Calculator, input: &str, out: &mut impl Write) -> Result<bool> {
    match calculator.parse(input.trim()) {
        Ok(ast) => {
            serde_json::to_writer(&mut *out, &ast)?;
            writeln!(out)?;
            Ok(true)
        }
        Err(err) => {
            writeln!(out, "{} ({})", err.user_message(), err)?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::Value;

    fn args(extra: &[&str]) -> Args {
        Args::parse_from(std::iter::once("safecalc").chain(extra.iter().copied()))
    }

    fn render(extra: &[&str], input: &str) -> (bool, String) {
        let mut out = Vec::new();
        let ok = handle(&Calculator::new(), &args(extra), input, &mut out).unwrap();
        (ok, String::from_utf8(out).unwrap())
    }

    fn render_lines(extra: &[&str], input: &str) -> (bool, String) {
        let mut out = Vec::new();
        let ok = run_lines(&Calculator::new(), &args(extra), input.as_bytes(), &mut out).unwrap();
        (ok, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_plain_output() {
        assert_eq!(render(&[], "2 + 3 * 4"), (true, "Result: 14\n".to_string()));
        assert_eq!(
            render(&[], "1000 * 1000"),
            (true, "Result: 1,000,000\n".to_string())
        );
        assert_eq!(
            render(&[], "10 / 0"),
            (false, "Invalid calculation (division by zero)\n".to_string())
        );
        assert_eq!(
            render(&[], "   "),
            (false, "Please enter a calculation\n".to_string())
        );
    }

    #[test]
    fn test_raw_output() {
        let calculator = Calculator::new().with_thousands_separator(false);
        let mut out = Vec::new();
        assert!(handle(&calculator, &args(&["--raw"]), "1000 * 1000", &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "Result: 1000000\n");
    }

    #[test]
    fn test_json_success() {
        let (ok, text) = render(&["--json"], " 1500 + 2 ");
        assert!(ok);
        let report: Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(report["expression"], "1500 + 2");
        assert_eq!(report["ok"], true);
        assert_eq!(report["value"], 1502.0);
        assert_eq!(report["message"], "1,502");
        assert!(report.get("error").is_none());
        assert!(report.get("category").is_none());
    }

    #[test]
    fn test_json_error() {
        let (ok, text) = render(&["--json"], "2 $ 3");
        assert!(!ok);
        let report: Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(report["expression"], "2 $ 3");
        assert_eq!(report["ok"], false);
        assert_eq!(report["error"], "unexpected character '$' at position 2");
        assert_eq!(report["category"], "invalid_input");
        assert_eq!(report["message"], "Invalid input");
        assert!(report.get("value").is_none());

        let (_, text) = render(&["--json"], "(1 + 2");
        let report: Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(report["category"], "invalid_calculation");
    }

    #[test]
    fn test_ast_output() {
        let (ok, text) = render(&["--ast"], "1 / 2");
        assert!(ok);
        let tree: Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(tree["BinaryOp"]["op"], "Div");
        assert_eq!(tree["BinaryOp"]["left"]["Literal"], 1.0);
        assert_eq!(tree["BinaryOp"]["right"]["Literal"], 2.0);

        let (ok, text) = render(&["--ast"], "1 +");
        assert!(!ok);
        assert!(text.starts_with("Invalid calculation ("));
    }

    #[test]
    fn test_lines_with_filter() {
        let input = "hello\n2 + 2\n42\n3 * 3\n";
        let (ok, text) = render_lines(&["--filter"], input);
        assert!(ok);
        assert_eq!(text, "Result: 4\nResult: 9\n");
    }

    #[test]
    fn test_lines_without_filter() {
        let (ok, text) = render_lines(&[], "hello\n2 + 2\n");
        assert!(!ok);
        assert_eq!(
            text,
            "Invalid input (unexpected character 'h' at position 0)\nResult: 4\n"
        );
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&Ok(true)), 0);
        assert_eq!(exit_status(&Ok(false)), 1);
        assert_eq!(exit_status(&Err(anyhow::anyhow!("broken"))), 2);

        let (ok, _) = render_lines(&[], "1 + 1\n1 / 0\n");
        assert_eq!(exit_status(&Ok(ok)), 1);
    }

    #[test]
    fn test_setup_errors() {
        let missing = std::env::temp_dir().join("safecalc-cli-missing.toml");
        let missing = missing.to_str().unwrap();
        let outcome = run(args(&["--config", missing, "1 + 1"]));
        assert_eq!(exit_status(&outcome), 2);

        let outcome = run(args(&["--max-depth", "0", "1 + 1"]));
        assert_eq!(exit_status(&outcome), 2);

        let outcome = run(args(&["--max-input-len", "100000000", "1 + 1"]));
        assert_eq!(exit_status(&outcome), 2);
    }
}
