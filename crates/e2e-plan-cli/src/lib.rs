//! E2E Plan command line
//!
//! Subcommands:
//! - `validate <PATH>`: report every validation error, as text or JSON
//! - `render <PATH>`: write the canonical markdown for a valid plan
//! - `schema`: print the JSON Schema of plan documents
//!
//! Exit status is 0 on success, 1 when the plan has validation errors, and
//! 2 when the input cannot be read.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use e2e_plan_config::{load_document, schema_json, PlanDocument, Settings};
use e2e_plan_core::{Plan, PlanAggregator};
use e2e_plan_model::Diagnostics;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// How a command finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command succeeded
    Success,
    /// Plan has validation errors
    Invalid,
}

impl Outcome {
    /// Process exit code
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Invalid => 1,
        }
    }
}

/// Build the argument parser
#[must_use]
pub fn command() -> Command {
    let document = || {
        Arg::new("document")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Plan document (.json, .yaml, .yml or .toml)")
    };

    Command::new("e2e-plan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validate and render end-to-end test plans")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .env("E2E_PLAN_CONFIG")
                .value_parser(value_parser!(PathBuf))
                .help("Settings file (TOML)"),
        )
        .arg(
            Arg::new("title")
                .long("title")
                .global(true)
                .help("Plan title, overriding the document and settings"),
        )
        .arg(
            Arg::new("reserved-prefix")
                .long("reserved-prefix")
                .global(true)
                .action(ArgAction::Append)
                .help("Reject selector ids starting with this prefix (repeatable)"),
        )
        .arg(
            Arg::new("sequential")
                .long("sequential")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Validate scenarios on one thread"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a plan document and list every error")
                .arg(document())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("text")
                        .value_parser(["text", "json"])
                        .help("Report format"),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Render a valid plan document to markdown")
                .arg(document())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write to a file instead of stdout"),
                ),
        )
        .subcommand(Command::new("schema").about("Print the JSON Schema of plan documents"))
}

/// Install the tracing subscriber; logs go to stderr
pub fn init_tracing(matches: &ArgMatches) {
    let level = match matches.get_count("verbose") {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = if matches.get_flag("log-json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Run the parsed command, writing reports to `out`
///
/// # Errors
/// Unreadable or unparsable input files, or a failed write.
pub fn run(matches: &ArgMatches, out: &mut dyn Write) -> Result<Outcome> {
    match matches.subcommand() {
        Some(("validate", args)) => {
            let (document, settings) = load_inputs(matches, args)?;
            let json = args.get_one::<String>("format").is_some_and(|f| f == "json");
            validate(&document, &settings, json, out)
        }
        Some(("render", args)) => {
            let (document, settings) = load_inputs(matches, args)?;
            let output = args.get_one::<PathBuf>("output");
            render(&document, &settings, output.map(PathBuf::as_path), out)
        }
        Some(("schema", _)) => {
            let schema = schema_json().context("failed to generate schema")?;
            writeln!(out, "{schema}")?;
            Ok(Outcome::Success)
        }
        _ => anyhow::bail!("unknown subcommand"),
    }
}

/// Settings from `--config` with command-line overrides applied
fn settings(matches: &ArgMatches) -> Result<Settings> {
    let mut settings = match matches.get_one::<PathBuf>("config") {
        Some(path) => Settings::load(path).with_context(|| format!("loading settings {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(prefixes) = matches.get_many::<String>("reserved-prefix") {
        settings = settings.with_reserved_prefixes(prefixes.cloned().collect());
    }
    if matches.get_flag("sequential") {
        settings = settings.with_parallel(false);
    }
    Ok(settings)
}

fn load_inputs(matches: &ArgMatches, args: &ArgMatches) -> Result<(PlanDocument, Settings)> {
    let settings = settings(matches)?;
    let path = args
        .get_one::<PathBuf>("document")
        .context("missing document path")?;
    let mut document = load_document(path).with_context(|| format!("loading plan {}", path.display()))?;
    if let Some(title) = matches.get_one::<String>("title") {
        document.title = Some(title.clone());
    }
    Ok((document, settings))
}

fn build(document: &PlanDocument, settings: &Settings) -> Result<Plan, Diagnostics> {
    let options = settings.to_build_options(document.title.as_deref());
    PlanAggregator::new(options).build_plan(&document.components, &document.scenarios)
}

#[derive(Serialize)]
struct Report<'a> {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<&'a str>,
    errors: &'a Diagnostics,
}

fn validate(document: &PlanDocument, settings: &Settings, json: bool, out: &mut dyn Write) -> Result<Outcome> {
    let result = build(document, settings);
    let empty = Diagnostics::new();
    let (plan, errors) = match &result {
        Ok(plan) => (Some(plan), &empty),
        Err(diags) => (None, diags),
    };

    if json {
        let report = Report {
            valid: plan.is_some(),
            title: plan.map(Plan::title),
            hash: plan.map(Plan::validation_hash),
            errors,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else if let Some(plan) = plan {
        let summary = plan.summary();
        writeln!(
            out,
            "ok: `{}` is valid ({} page object(s), {} scenario(s))",
            plan.title(),
            summary.pages + summary.components,
            summary.scenarios
        )?;
    } else {
        write_errors(errors, out)?;
    }

    Ok(if plan.is_some() { Outcome::Success } else { Outcome::Invalid })
}

fn render(document: &PlanDocument, settings: &Settings, output: Option<&Path>, out: &mut dyn Write) -> Result<Outcome> {
    let plan = match build(document, settings) {
        Ok(plan) => plan,
        Err(diags) => {
            write_errors(&diags, out)?;
            return Ok(Outcome::Invalid);
        }
    };
    let markdown = e2e_plan_render::render(&plan).context("plan failed verification")?;
    match output {
        Some(path) => {
            std::fs::write(path, &markdown).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote rendered plan");
        }
        None => out.write_all(markdown.as_bytes())?,
    }
    Ok(Outcome::Success)
}

fn write_errors(diags: &Diagnostics, out: &mut dyn Write) -> Result<()> {
    for error in diags {
        writeln!(out, "error[{}] {}: {}", error.kind, error.entity, error.message)?;
    }
    writeln!(out, "{} validation error(s)", diags.len())?;
    Ok(())
}
