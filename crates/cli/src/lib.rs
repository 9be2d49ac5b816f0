use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::EditorConfig;
use folio_engine::{PageRenderer, PlaceholderRenderer, SourceRegistry};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub mod session;

use session::SessionFile;

#[derive(Debug, Parser)]
#[command(name = "folio-cli")]
#[command(about = "Folio PDF annotation CLI")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print machine-readable PDF metadata.
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Render a placeholder thumbnail PNG for a page.
    RenderThumb {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 320)]
        width: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compose an edited PDF from a session description.
    Export {
        #[arg(long, value_name = "JSON")]
        session: PathBuf,
        /// Output file. Defaults to `<name>_edited.pdf` next to the session.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Editor configuration (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    path: String,
    page_count: u32,
    pages: Vec<PageOutput>,
}

#[derive(Debug, Serialize)]
struct PageOutput {
    page: u32,
    width: f32,
    height: f32,
    rotation: u32,
}

#[derive(Debug, Serialize)]
struct ExportOutput {
    path: String,
    pages_written: usize,
    skipped: Vec<String>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { file } => run_info(&file),
        Commands::RenderThumb { file, page, width, output } => {
            run_render_thumb(&file, page, width, output.as_deref())
        }
        Commands::Export { session, output, config } => {
            run_export(&session, output.as_deref(), config.as_deref())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    // A second init (tests calling `run` twice) keeps the first logger.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}

fn run_info(file: &Path) -> Result<()> {
    ensure_pdf_exists(file)?;

    let mut sources = SourceRegistry::new();
    let id = sources.load_path(file).context("failed to open PDF")?;
    let source = sources.require(id)?;

    let pages = source
        .pages()
        .iter()
        .map(|page| PageOutput {
            page: page.page_number,
            width: page.width_pt,
            height: page.height_pt,
            rotation: page.rotation,
        })
        .collect();

    let payload =
        InfoOutput { path: file.display().to_string(), page_count: source.page_count(), pages };

    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");

    Ok(())
}

fn run_render_thumb(file: &Path, page: u32, width: u32, output: Option<&Path>) -> Result<()> {
    ensure_pdf_exists(file)?;

    if page == 0 {
        anyhow::bail!("--page is 1-based and must be >= 1");
    }

    let mut sources = SourceRegistry::new();
    let id = sources.load_path(file).context("failed to open PDF")?;
    let source = sources.require(id)?;

    let image =
        PlaceholderRenderer.thumbnail(&source, page, width).context("failed to render thumbnail")?;

    let output =
        output.map(ToOwned::to_owned).unwrap_or_else(|| default_thumbnail_output(file, page));

    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    image
        .save(&output)
        .with_context(|| format!("failed to write image to {}", output.display()))?;

    println!("{}", output.display());

    Ok(())
}

fn run_export(session_path: &Path, output: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let config = EditorConfig::load(config).context("failed to load configuration")?;
    let session = SessionFile::read(session_path)?;
    let base_dir = session_path.parent().unwrap_or_else(|| Path::new("."));
    let editor = session.build_editor(base_dir, config)?;

    let outcome = editor.export();
    let Some(bytes) = outcome.bytes.as_deref().filter(|_| outcome.success) else {
        anyhow::bail!("{}", outcome.message);
    };

    let path = output.map(ToOwned::to_owned).unwrap_or_else(|| base_dir.join(&outcome.file_name));
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;

    log::info!("{}", outcome.message);
    let payload = ExportOutput {
        path: path.display().to_string(),
        pages_written: outcome.report.pages_written,
        skipped: outcome.report.skipped.iter().map(ToString::to_string).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}

fn ensure_pdf_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}

fn default_thumbnail_output(file: &Path, page: u32) -> PathBuf {
    let stem = file.file_stem().and_then(|name| name.to_str()).unwrap_or("thumbnail");

    file.with_file_name(format!("{stem}-page-{page}.png"))
}
