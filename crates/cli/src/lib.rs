use anyhow::{Context as AnyhowContext, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use casebundle_bundle::{BundleService, EngineConfig};
use casebundle_catalog::{normalize, DocumentReference, KeyDocumentSelector, NormalizedCategory};
use casebundle_fetch::{DocumentSource, FsDocumentSource, HttpDocumentSource};
use casebundle_protocol::{
    request_schema, response_schema, serialize_json_pretty, BundleRequest, BundleStatus,
};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod config;
mod report;

pub use config::load_engine_config;
pub use report::error_envelope;

/// Exit code when every requested document failed.
pub const EXIT_BUNDLE_FAILED: i32 = 2;
/// Exit code for request-level errors (an error envelope is printed).
pub const EXIT_ERROR: i32 = 1;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "casebundle")]
#[command(about = "Assemble case documents into a single PDF bundle", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Engine configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, merge and package the documents of a bundle request
    Bundle(BundleArgs),

    /// Print the key documents a request would be narrowed to
    KeyDocuments(RequestArgs),

    /// Print the canonical category for raw upstream labels
    Classify(ClassifyArgs),

    /// Print the JSON Schema of a wire type
    Schema {
        #[arg(value_enum, default_value_t = SchemaKind::Response)]
        kind: SchemaKind,
    },
}

#[derive(Args)]
struct RequestArgs {
    /// Bundle request JSON file, or `-` for stdin
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    request: String,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["source_dir", "upstream"])
))]
struct BundleArgs {
    #[command(flatten)]
    input: RequestArgs,

    /// Shared-drive mount holding `<source>/<documentId>.pdf` files
    #[arg(long, value_name = "DIR")]
    source_dir: Option<PathBuf>,

    /// Base URL of the upstream document service
    #[arg(long, value_name = "URL")]
    upstream: Option<String>,

    /// Also write the merged PDF to this path
    #[arg(long, value_name = "FILE")]
    pdf_out: Option<PathBuf>,
}

#[derive(Args)]
struct ClassifyArgs {
    /// Raw category label
    #[arg(long)]
    category: Option<String>,

    /// Raw classification label, used when the category is not recognized
    #[arg(long)]
    classification: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaKind {
    Request,
    Response,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyDocumentsOutput<'a> {
    case_id: &'a str,
    documents: &'a [DocumentReference],
    #[serde(skip_serializing_if = "Option::is_none")]
    bail_document_id: Option<&'a str>,
}

#[derive(Serialize)]
struct ClassifyOutput {
    category: NormalizedCategory,
    known: bool,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match run(cli).await {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(err) => {
            log::error!("{err:#}");
            print_stdout(&serialize_json_pretty(&error_envelope(&err))?)?;
            std::process::exit(EXIT_ERROR);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Bundle(args) => run_bundle(args, cli.config.as_deref()).await,
        Commands::KeyDocuments(args) => run_key_documents(args, cli.config.as_deref()),
        Commands::Classify(args) => run_classify(args),
        Commands::Schema { kind } => run_schema(kind),
    }
}

fn read_request(args: &RequestArgs) -> Result<BundleRequest> {
    let raw = if args.request == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read request from stdin")?;
        buffer
    } else {
        fs::read_to_string(&args.request)
            .with_context(|| format!("Failed to read request from {}", args.request))?
    };

    if raw.trim().is_empty() {
        anyhow::bail!("Bundle request is empty. Provide --request FILE or pipe JSON via stdin.");
    }
    serde_json::from_str(&raw).context("Invalid bundle request JSON")
}

fn open_source(args: &BundleArgs) -> Result<Arc<dyn DocumentSource>> {
    if let Some(dir) = &args.source_dir {
        return Ok(Arc::new(FsDocumentSource::new(dir)?));
    }
    if let Some(url) = &args.upstream {
        return Ok(Arc::new(HttpDocumentSource::new(url)?));
    }
    anyhow::bail!("One of --source-dir or --upstream is required")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn run_bundle(args: BundleArgs, config_path: Option<&Path>) -> Result<i32> {
    let config = load_engine_config(config_path)?;
    let request = read_request(&args.input)?;
    let source = open_source(&args)?;
    log::debug!("Using document source {}", source.name());

    let service = BundleService::new(source, config)?;
    let response = service
        .assemble_or_cancel(&request, shutdown_signal())
        .await?;

    if let Some(path) = &args.pdf_out {
        if response.status != BundleStatus::Failed {
            let pdf = STANDARD
                .decode(&response.base64_pdf)
                .context("Merged PDF is not valid base64")?;
            fs::write(path, &pdf)
                .with_context(|| format!("Failed to write PDF to {}", path.display()))?;
            log::info!("Wrote {} bytes to {}", pdf.len(), path.display());
        }
    }

    print_stdout(&serialize_json_pretty(&response)?)?;

    if response.status == BundleStatus::Failed {
        return Ok(EXIT_BUNDLE_FAILED);
    }
    Ok(0)
}

fn run_key_documents(args: RequestArgs, config_path: Option<&Path>) -> Result<i32> {
    let config: EngineConfig = load_engine_config(config_path)?;
    let request = read_request(&args)?;
    let case_id = request.case_id.trim();

    let selector = KeyDocumentSelector::new(config.selection);
    let key = selector.try_select(
        request
            .documents
            .iter()
            .map(|doc| DocumentReference::from_request(doc, case_id)),
    )?;

    let output = KeyDocumentsOutput {
        case_id,
        documents: key.documents(),
        bail_document_id: key.bail_document().map(|doc| doc.document_id()),
    };
    print_stdout(&serialize_json_pretty(&output)?)?;
    Ok(0)
}

fn run_classify(args: ClassifyArgs) -> Result<i32> {
    let category = normalize(args.category.as_deref(), args.classification.as_deref());
    let output = ClassifyOutput {
        category,
        known: category.is_known(),
    };
    print_stdout(&serialize_json_pretty(&output)?)?;
    Ok(0)
}

fn run_schema(kind: SchemaKind) -> Result<i32> {
    let schema = match kind {
        SchemaKind::Request => request_schema()?,
        SchemaKind::Response => response_schema()?,
    };
    print_stdout(&serialize_json_pretty(&schema)?)?;
    Ok(0)
}
