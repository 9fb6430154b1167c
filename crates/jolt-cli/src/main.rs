mod project;
mod report;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use jolt_core::FileId;
use jolt_index::{MethodId, Workspace};
use jolt_refactor::{ChangeSignature, ChangeSignatureOptions, ChangeSignatureRequest};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use project::Project;
use report::{ChangeSignatureReport, CheckReport};

#[derive(Parser)]
#[command(name = "jolt", version, about = "Jolt CLI (Java signature refactoring)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Change the signature of a method and update every occurrence
    ChangeSignature(ChangeSignatureArgs),
    /// Print compile diagnostics for every Java file of a project
    Check(CheckArgs),
    /// Print the JSON schema of `jolt.toml`
    ConfigSchema,
}

#[derive(Args)]
struct ChangeSignatureArgs {
    /// Project root; every `.java` file below it is loaded
    root: PathBuf,
    /// JSON file naming the method and the change to make
    #[arg(long)]
    request: PathBuf,
    /// Write the change to disk
    #[arg(long)]
    apply: bool,
    /// Apply even when the checks report errors
    #[arg(long, requires = "apply")]
    force: bool,
    /// Config file to use instead of the project's `jolt.toml`
    #[arg(long)]
    config: Option<PathBuf>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CheckArgs {
    /// Project root
    root: PathBuf,
    /// Config file to use instead of the project's `jolt.toml`
    #[arg(long)]
    config: Option<PathBuf>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

/// The method to change, as found in the request file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TargetMethod {
    /// Declaring file, relative to the project root.
    #[serde(default)]
    file: Option<String>,
    /// Simple or qualified name of the declaring type.
    #[serde(rename = "type")]
    type_name: String,
    /// Method name; the type name (or `<init>`) for constructors.
    method: String,
    /// Parameter types as written, to pick one overload.
    #[serde(default)]
    param_types: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RequestFile {
    target: TargetMethod,
    change: ChangeSignatureRequest,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::ChangeSignature(args) => change_signature(args),
        Command::Check(args) => {
            let project = Project::open(&args.root, args.config.as_deref())?;
            let report = CheckReport::new(&project.workspace);
            report.print(args.json)?;
            Ok(if report.errors > 0 { 1 } else { 0 })
        }
        Command::ConfigSchema => {
            let schema = jolt_config::json_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(0)
        }
    }
}

fn change_signature(args: ChangeSignatureArgs) -> Result<i32> {
    let request_text = fs::read_to_string(&args.request)
        .with_context(|| format!("failed to read {}", args.request.display()))?;
    let request: RequestFile = serde_json::from_str(&request_text)
        .with_context(|| format!("invalid request file {}", args.request.display()))?;

    let mut project = Project::open(&args.root, args.config.as_deref())?;
    let options = ChangeSignatureOptions::from(&project.config.refactor.change_signature);
    let method = find_target(&project.workspace, &request.target)?;

    let (mut report, change) = {
        let workspace = &project.workspace;
        let cancel = CancellationToken::new();
        let mut refactoring = ChangeSignature::new(workspace, method, options)?;
        let label = workspace.model().method_label(method);

        let mut status = refactoring.check_activation(&cancel);
        if !status.has_fatal() {
            refactoring.apply_request(&request.change)?;
            status.merge(refactoring.check_input(&cancel));
        }
        let change = if status.has_fatal() {
            None
        } else {
            Some(refactoring.create_change()?)
        };
        tracing::debug!(
            target: "jolt.cli",
            method = %label,
            severity = ?status.severity(),
            "change signature checked"
        );
        let report = ChangeSignatureReport::new(
            workspace,
            label,
            refactoring.signature_preview(),
            &status,
            change.as_ref(),
        )?;
        (report, change)
    };

    let blocked = report
        .severity
        .is_some_and(|severity| severity >= jolt_refactor::Severity::Error);
    if let (true, Some(change)) = (args.apply, &change) {
        if blocked && !args.force {
            eprintln!("not applying: the checks reported errors (pass --force to apply anyway)");
        } else {
            change
                .commit(&mut project.workspace)
                .context("failed to apply the change")?;
            let files: Vec<&FileId> = change.files().collect();
            project.write_back(files)?;
            tracing::info!(target: "jolt.cli", files = change.units().count(), "applied change");
            report.applied = true;
        }
    }

    report.print(args.json)?;
    Ok(if blocked { 1 } else { 0 })
}

fn find_target(workspace: &Workspace, target: &TargetMethod) -> Result<MethodId> {
    let found: Vec<MethodId> = workspace
        .find_methods(&target.type_name, &target.method, target.param_types.as_deref())
        .into_iter()
        .filter(|&id| match &target.file {
            Some(file) => {
                workspace.model().method(id).origin.file() == Some(&FileId::new(file.as_str()))
            }
            None => true,
        })
        .collect();
    match found.as_slice() {
        [] => bail!("no method `{}` found in type `{}`", target.method, target.type_name),
        [method] => Ok(*method),
        many => bail!(
            "{} methods named `{}` in `{}`; add `param_types` to the target",
            many.len(),
            target.method,
            target.type_name
        ),
    }
}
