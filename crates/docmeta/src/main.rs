//! docmeta: inspect and edit the metadata of Word packages.
//!
//! - `docmeta show report.docx [--json]`
//! - `docmeta edit report.docx --set Title="Q3 Report" --set Company=Acme [-o out.docx]`
//! - `docmeta fields`

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use docmeta_core::error::MetaError;
use docmeta_core::fields::{PartName, FIELDS};
use docmeta_core::options::EditorOptions;
use docmeta_core::session::SaveOutcome;
use docmeta_docx::DocumentEditor;

#[derive(Parser)]
#[command(
    name = "docmeta",
    version,
    about = "Inspect and edit Word document metadata"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Accept .DOCX/.DOCM extensions in any letter case
    #[arg(long, global = true)]
    ignore_extension_case: bool,

    /// Prefix for edited file names (default: edited_)
    #[arg(long, global = true)]
    output_prefix: Option<String>,

    /// Directory for edited files (default: next to the input)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Dump effective merged config as TOML and exit
    #[arg(long, global = true)]
    dump_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the metadata fields of a package
    Show {
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Change metadata fields and write an edited copy
    Edit {
        input: PathBuf,

        /// Field assignment, by id or label (e.g. dc:title=Report, Company=Acme)
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Output file (default: <output_dir>/<prefix><input name>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the supported fields
    Fields,
}

#[derive(Serialize)]
struct FieldRow<'a> {
    id: &'a str,
    label: &'a str,
    part: PartName,
    value: String,
}

/// Load config from global and project-local TOML files.
/// The project-local file fully overrides the global one. Missing files are ignored.
fn load_config() -> EditorOptions {
    let mut opts = EditorOptions::default();

    // 1. Global config: ~/.config/docmeta/config.toml
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("docmeta").join("config.toml");
        if let Some(parsed) = read_config(&global_path) {
            opts = parsed;
        }
    }

    // 2. Project-local config: ./.docmeta.toml
    if let Some(parsed) = read_config(Path::new(".docmeta.toml")) {
        opts = parsed;
    }

    opts
}

fn read_config(path: &Path) -> Option<EditorOptions> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<EditorOptions>(&contents) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            let err = MetaError::Config(format!("{}: {}", path.display(), e));
            log::warn!("{}", err);
            None
        }
    }
}

/// Apply CLI flags on top of config-loaded options.
fn apply_cli_overrides(opts: &mut EditorOptions, cli: &Cli) {
    if cli.verbose > 0 {
        opts.verbose = cli.verbose;
    }
    if cli.ignore_extension_case {
        opts.ignore_extension_case = true;
    }
    if let Some(ref prefix) = cli.output_prefix {
        opts.output_prefix = prefix.clone();
    }
    if cli.output_dir.is_some() {
        opts.output_dir = cli.output_dir.clone();
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let cli = Cli::parse();

    let mut opts = load_config();
    apply_cli_overrides(&mut opts, &cli);
    init_logging(opts.verbose);

    if cli.dump_config {
        match toml::to_string_pretty(&opts) {
            Ok(s) => {
                println!("{}", s);
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                process::exit(1);
            }
        }
    }

    let result = match &cli.command {
        Some(Commands::Show { input, json }) => run_show(input, *json, opts),
        Some(Commands::Edit { input, set, output }) => {
            run_edit(input, set, output.as_deref(), opts)
        }
        Some(Commands::Fields) => {
            run_fields();
            Ok(())
        }
        None => {
            eprintln!("Usage: docmeta show <file.docx>");
            eprintln!("   or: docmeta edit <file.docx> --set KEY=VALUE [-o output.docx]");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        log::debug!("{:?}", e);
        eprintln!("{}", notice(&e));
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// User-facing message for a failed operation.
fn notice(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<MetaError>() {
        Some(MetaError::UnsupportedFormat(_)) => {
            "Unsupported file format. Please provide a .docx or .docm file."
        }
        Some(MetaError::CorruptPackage(_)) => {
            "Could not read the file. It might be corrupted or not a Word document."
        }
        Some(MetaError::Serialization(_)) => "An error occurred while saving the file.",
        Some(MetaError::UnknownField(_)) => {
            "Unknown metadata field. Run `docmeta fields` for the supported fields."
        }
        _ => "The operation failed.",
    }
}

fn run_show(input: &Path, json: bool, opts: EditorOptions) -> Result<()> {
    let mut editor = DocumentEditor::new(opts);
    editor.open_path(input)?;

    let fields = editor.fields();
    if json {
        let rows: Vec<FieldRow<'_>> = fields
            .into_iter()
            .map(|(f, value)| FieldRow {
                id: f.id,
                label: f.label,
                part: f.part,
                value,
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("Cannot serialize fields")?
        );
        return Ok(());
    }

    println!("{}", editor.file_name().unwrap_or_default());
    for (f, value) in fields {
        let shown = if value.is_empty() { "—" } else { value.as_str() };
        println!("  {:<26} {}", f.label, shown);
    }
    Ok(())
}

fn run_edit(
    input: &Path,
    assignments: &[String],
    output: Option<&Path>,
    opts: EditorOptions,
) -> Result<()> {
    let edits = assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Vec<_>>>()?;

    let output_dir = opts.output_dir.clone();
    let mut editor = DocumentEditor::new(opts);
    editor.open_path(input)?;
    editor.begin_edit()?;
    editor.stage_all(&edits)?;

    match editor.save()? {
        SaveOutcome::Unchanged => {
            log::info!("No metadata changes; nothing written");
        }
        SaveOutcome::Saved { package, changed } => {
            let target =
                output_path(input, output, output_dir.as_deref(), &package.file_name);
            std::fs::write(&target, &package.bytes)
                .with_context(|| format!("Cannot write {}", target.display()))?;
            log::info!(
                "Wrote {} ({}, {} bytes); changed: {}",
                target.display(),
                package.media_type,
                package.bytes.len(),
                changed.join(", ")
            );
        }
    }
    Ok(())
}

fn run_fields() {
    for f in FIELDS.iter() {
        println!("{:<20} {:<26} {}", f.id, f.label, f.part.path());
    }
}

/// Split `KEY=VALUE`; the value may itself contain `=` or be empty.
fn parse_assignment(s: &str) -> Result<(String, String)> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => bail!("Invalid assignment '{}': expected KEY=VALUE", s),
    }
}

/// Where the edited package goes: explicit output, else the configured
/// directory, else next to the input.
fn output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    file_name: &str,
) -> PathBuf {
    if let Some(out) = output {
        return out.to_path_buf();
    }
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(file_name)
}
