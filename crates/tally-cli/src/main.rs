//! Tally CLI - evaluate formulas with named variables

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tally::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally")]
#[command(
    author,
    version,
    about = "Evaluate arithmetic formulas that reference named variables"
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula template such as "({Revenue} - {Expenses}) * 2"
    Eval {
        #[command(flatten)]
        formula: FormulaArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a formula template splits into text and tags
    Render {
        #[command(flatten)]
        formula: FormulaArgs,

        /// Print the segments as JSON
        #[arg(long)]
        json: bool,
    },

    /// List catalog variables whose name contains a search term
    Suggest {
        /// Search term (case-insensitive)
        term: String,

        /// Variable catalog (JSON array of {"id", "name", "value"})
        #[arg(short, long, env = "TALLY_CATALOG")]
        catalog: Option<PathBuf>,

        /// Print the matches as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct FormulaArgs {
    /// Formula text; `{Name}` inserts the variable `Name` as a tag
    template: String,

    /// Define a variable, overriding the catalog (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    vars: Vec<(String, f64)>,

    /// Variable catalog (JSON array of {"id", "name", "value"})
    #[arg(short, long, env = "TALLY_CATALOG")]
    catalog: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Eval { formula, json } => eval(&formula, json),
        Commands::Render { formula, json } => render(&formula, json).map(|_| ExitCode::SUCCESS),
        Commands::Suggest {
            term,
            catalog,
            json,
        } => suggest(&term, catalog.as_deref(), json).map(|_| ExitCode::SUCCESS),
    }
}

/// `RUST_LOG` wins over `--verbose`; the default is warnings only
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn eval(args: &FormulaArgs, json: bool) -> Result<ExitCode> {
    let buffer = build_buffer(args)?;
    let outcome = buffer.outcome();

    if json {
        let report = json!({
            "formula": buffer.text(),
            "value": outcome.value(),
            "error": outcome.error().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", outcome);
    }

    Ok(if outcome.error().is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn render(args: &FormulaArgs, json: bool) -> Result<()> {
    let buffer = build_buffer(args)?;

    if json {
        let segments: Vec<_> = buffer
            .ordered_render()
            .map(|segment| match segment {
                Segment::Text { start, text } => json!({
                    "kind": "text",
                    "start": start,
                    "text": text,
                }),
                Segment::Tag(tag) => json!({
                    "kind": "tag",
                    "start": tag.position,
                    "id": tag.id,
                    "name": tag.name,
                    "value": tag.value,
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&segments)?);
        return Ok(());
    }

    for segment in buffer.ordered_render() {
        match segment {
            Segment::Text { start, text } => println!("{:>4}  text  {:?}", start, text),
            Segment::Tag(tag) => println!(
                "{:>4}  tag   {} ({}) = {}",
                tag.position, tag.name, tag.id, tag.value
            ),
        }
    }
    Ok(())
}

fn suggest(term: &str, catalog: Option<&Path>, json: bool) -> Result<()> {
    let catalog = load_catalog(catalog)?;
    let matches = catalog.suggest(term);

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        eprintln!("No variables match '{}'", term);
    }
    for suggestion in &matches {
        println!(
            "{:>5}  {:<24} {}",
            suggestion.id.to_string(),
            suggestion.name,
            suggestion.value
        );
    }
    Ok(())
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::builtin());
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog '{}'", path.display()))?;
    let catalog = Catalog::from_json(&json)
        .with_context(|| format!("Failed to parse catalog '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), entries = catalog.len(), "loaded catalog");
    Ok(catalog)
}

/// Build a buffer from a template, typing plain text and inserting a tag
/// for every `{Name}` placeholder
fn build_buffer(args: &FormulaArgs) -> Result<FormulaBuffer> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let mut buffer = FormulaBuffer::new();
    let mut next_id = 1;

    let mut rest = args.template.as_str();
    while let Some(open) = rest.find('{') {
        let (literal, tail) = rest.split_at(open);
        type_text(&mut buffer, literal)?;

        let close = tail
            .find('}')
            .with_context(|| format!("Unclosed '{{' in template '{}'", args.template))?;
        let name = tail[1..close].trim();
        if name.is_empty() {
            bail!("Empty placeholder in template '{}'", args.template);
        }

        let (name, value) = resolve(name, &args.vars, &catalog)
            .with_context(|| format!("Unknown variable '{}'", name))?;
        let at = buffer.len();
        buffer
            .insert_tag(Suggestion::new(TagId(next_id), name, value), at)
            .with_context(|| format!("Failed to insert variable '{}'", name))?;
        next_id += 1;

        rest = &tail[close + 1..];
    }
    type_text(&mut buffer, rest)?;

    tracing::debug!(formula = buffer.text(), tags = buffer.tag_count(), "built formula");
    Ok(buffer)
}

fn type_text(buffer: &mut FormulaBuffer, text: &str) -> Result<()> {
    let at = buffer.len();
    buffer
        .insert_text(at, text)
        .context("Failed to insert template text")?;
    Ok(())
}

/// Command-line definitions first, then the catalog
fn resolve<'a>(
    name: &'a str,
    vars: &'a [(String, f64)],
    catalog: &'a Catalog,
) -> Option<(&'a str, f64)> {
    vars.iter()
        .rev()
        .find(|(var, _)| var == name)
        .map(|(var, value)| (var.as_str(), *value))
        .or_else(|| catalog.get(name).map(|s| (s.name.as_str(), s.value)))
}

fn parse_var(s: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("variable name is empty".to_string());
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", value));
    }
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(template: &str, vars: &[(&str, f64)]) -> FormulaArgs {
        FormulaArgs {
            template: template.to_string(),
            vars: vars.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
            catalog: None,
        }
    }

    #[test]
    fn test_default_log_directive() {
        assert_eq!(default_directive(false), "warn");
        assert_eq!(default_directive(true), "debug");
        assert!(EnvFilter::try_new(default_directive(true)).is_ok());
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var("Rate=0.5"), Ok(("Rate".to_string(), 0.5)));
        assert_eq!(parse_var(" Units = 12 "), Ok(("Units".to_string(), 12.0)));
        assert!(parse_var("Rate").is_err());
        assert!(parse_var("=1").is_err());
        assert!(parse_var("Rate=abc").is_err());
        assert!(parse_var("Rate=inf").is_err());
    }

    #[test]
    fn test_build_buffer_from_template() {
        let buffer = build_buffer(&args("({revenue} - {Expenses}) * {Rate}", &[("Rate", 0.5)])).unwrap();
        assert_eq!(buffer.text(), "(Revenue - Expenses) * Rate");
        assert_eq!(buffer.tag_count(), 3);
        assert_eq!(buffer.outcome(), Outcome::Value(250.0));
    }

    #[test]
    fn test_vars_override_catalog() {
        let buffer = build_buffer(&args("{Revenue}*2", &[("Revenue", 10.0)])).unwrap();
        assert_eq!(buffer.outcome(), Outcome::Value(20.0));
    }

    #[test]
    fn test_repeated_placeholder() {
        let buffer = build_buffer(&args("{Profit}+{Profit}", &[])).unwrap();
        assert_eq!(buffer.tag_count(), 2);
        assert_eq!(buffer.outcome(), Outcome::Value(1000.0));
    }

    #[test]
    fn test_template_errors() {
        assert!(build_buffer(&args("{Revenue", &[])).is_err());
        assert!(build_buffer(&args("{} + 1", &[])).is_err());
        assert!(build_buffer(&args("{Nope} + 1", &[])).is_err());
    }
}
