//! CLI binary for flashdeck.
//!
//! A thin shim over the library crate that maps CLI flags to `DeckConfig`,
//! reads inputs (files or stdin), and writes the PDF or the recovered rows.

use anyhow::{Context, Result};
use clap::Parser;
use flashdeck::{
    build_deck_to_file, render_deck, resolve_source, rows_from_sources, rows_from_table,
    rows_from_text, write_pdf, ColumnSelector, Deck, DeckConfig, DeckProgressCallback, DuplexMode,
    LoadedRows, OcrEngine, ProgressCallback, ResolvedSource, SourceKind,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner on stderr that follows OCR and rendering.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Reading");
        bar.set_message("inputs…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl DeckProgressCallback for CliProgressCallback {
    fn on_ocr_start(&self, images: usize) {
        self.bar.set_prefix("OCR");
        self.bar.set_message(format!("{images} image(s)…"));
    }

    fn on_ocr_retry(&self, image: usize, attempt: u32, max: u32) {
        self.bar.println(format!(
            "  {} image {image}: retry {attempt}/{max}",
            yellow("↻")
        ));
    }

    fn on_rows_parsed(&self, rows: usize) {
        self.bar
            .println(format!("  {} {} row(s) recovered", green("✓"), bold(&rows.to_string())));
        self.bar.set_prefix("Rendering");
        self.bar.set_message("laying out cards…");
    }

    fn on_sheet_rendered(&self, sheet: usize, total_sheets: usize) {
        self.bar.set_message(format!("sheet {sheet}/{total_sheets}"));
    }

    fn on_deck_complete(&self, _cards: usize, _sheets: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Pasted list from the clipboard
  pbpaste | flashdeck -o vocab.pdf

  # Review the recovered rows first, fix them, then print from the TSV
  flashdeck list.txt --rows-only > rows.tsv
  flashdeck rows.tsv --kind table -o vocab.pdf

  # Two photos of a worksheet, OCR.space key from the environment
  OCR_SPACE_API_KEY=... flashdeck page1.jpg page2.jpg --subject Biology --lesson "Unit 3"

  # Spreadsheet export with named columns
  flashdeck words.csv --term-column Word --definition-column Meaning

  # Printer flips on the short edge and shifts the back by half a millimetre
  flashdeck list.txt --duplex short-edge-mirrored --back-offset-x 0.5 --marker

INPUT FORMATS:
  .txt / other   free-form list (numbered, bullets, "term: def", "term - def",
                 "word (n.) meaning", wrapped definitions)
  .csv / .tsv    spreadsheet export with a header row
  .png / .jpg    photo or scan, OCR'd first
  -              read free-form text from stdin

ENVIRONMENT VARIABLES:
  OCR_SPACE_API_KEY       OCR.space API key (default OCR engine)
  OPENAI_API_KEY          Vision engine credentials (also ANTHROPIC_API_KEY, GEMINI_API_KEY)
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, e.g. flashdeck=debug
"#;

/// Turn vocabulary lists into double-sided, 8-up flash-card PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "flashdeck",
    version,
    about = "Turn vocabulary lists into double-sided, 8-up flash-card PDFs",
    long_about = "Recover term/definition rows from pasted text, tables, spreadsheet exports, \
or photos (via OCR), then print them as duplex flash cards with each definition directly \
behind its term.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input files. Omit, or pass `-`, to read text from stdin.
    inputs: Vec<PathBuf>,

    /// Output PDF path.
    #[arg(short, long, env = "FLASHDECK_OUTPUT", default_value = "flashdeck_cards.pdf")]
    output: PathBuf,

    /// How to read the inputs. `auto` decides by file extension.
    #[arg(long, env = "FLASHDECK_KIND", value_enum, default_value = "auto")]
    kind: KindArg,

    /// Spreadsheet column for terms: header name or zero-based index.
    #[arg(long, env = "FLASHDECK_TERM_COLUMN")]
    term_column: Option<String>,

    /// Spreadsheet column for definitions: header name or zero-based index.
    #[arg(long, env = "FLASHDECK_DEFINITION_COLUMN")]
    definition_column: Option<String>,

    /// OCR backend for image inputs.
    #[arg(long, env = "FLASHDECK_OCR_ENGINE", value_enum, default_value = "ocr-space")]
    ocr_engine: EngineArg,

    /// OCR.space API key.
    #[arg(long, env = "OCR_SPACE_API_KEY", hide_env_values = true)]
    ocr_api_key: Option<String>,

    /// OCR language code.
    #[arg(long, env = "FLASHDECK_LANGUAGE", default_value = "eng")]
    language: String,

    /// Vision LLM provider for `--ocr-engine vision`.
    #[arg(long, env = "FLASHDECK_PROVIDER")]
    provider: Option<String>,

    /// Vision LLM model for `--ocr-engine vision`.
    #[arg(long, env = "FLASHDECK_MODEL")]
    model: Option<String>,

    /// Duplex layout of the back pages.
    #[arg(long, env = "FLASHDECK_DUPLEX", value_enum, default_value = "long-edge-mirrored")]
    duplex: DuplexArg,

    /// Shift back pages horizontally, in millimetres.
    #[arg(long, env = "FLASHDECK_BACK_OFFSET_X", default_value_t = 0.0, allow_negative_numbers = true)]
    back_offset_x: f32,

    /// Shift back pages vertically, in millimetres.
    #[arg(long, env = "FLASHDECK_BACK_OFFSET_Y", default_value_t = 0.0, allow_negative_numbers = true)]
    back_offset_y: f32,

    /// Print a small alignment marker on back pages.
    #[arg(long, env = "FLASHDECK_MARKER")]
    marker: bool,

    /// Subject shown in the card footer.
    #[arg(long, env = "FLASHDECK_SUBJECT", default_value = "")]
    subject: String,

    /// Lesson shown in the card footer.
    #[arg(long, env = "FLASHDECK_LESSON", default_value = "")]
    lesson: String,

    /// Footer template with `{subject}` and `{lesson}` placeholders.
    #[arg(long, env = "FLASHDECK_FOOTER_TEMPLATE")]
    footer_template: Option<String>,

    /// Do not print footers.
    #[arg(long, env = "FLASHDECK_NO_FOOTER")]
    no_footer: bool,

    /// Print the recovered rows (TSV) and stop; no PDF is written.
    #[arg(long)]
    rows_only: bool,

    /// With `--rows-only`, print JSON instead of TSV.
    #[arg(long, requires = "rows_only")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FLASHDECK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FLASHDECK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Auto,
    Text,
    Table,
    Spreadsheet,
    Image,
}

impl KindArg {
    fn source_kind(self) -> Option<SourceKind> {
        match self {
            KindArg::Auto => None,
            KindArg::Text => Some(SourceKind::Text),
            KindArg::Table => Some(SourceKind::Table),
            KindArg::Spreadsheet => Some(SourceKind::Spreadsheet),
            KindArg::Image => Some(SourceKind::Image),
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EngineArg {
    OcrSpace,
    Vision,
}

impl From<EngineArg> for OcrEngine {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::OcrSpace => OcrEngine::OcrSpace,
            EngineArg::Vision => OcrEngine::Vision,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum DuplexArg {
    LongEdgeMirrored,
    LongEdge,
    ShortEdgeMirrored,
    ShortEdge,
}

impl From<DuplexArg> for DuplexMode {
    fn from(v: DuplexArg) -> Self {
        match v {
            DuplexArg::LongEdgeMirrored => DuplexMode::LongEdgeMirrored,
            DuplexArg::LongEdge => DuplexMode::LongEdge,
            DuplexArg::ShortEdgeMirrored => DuplexMode::ShortEdgeMirrored,
            DuplexArg::ShortEdge => DuplexMode::ShortEdge,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters in normal runs, so
    // library INFO logs are only shown with --verbose.
    let show_progress = !cli.quiet && !cli.rows_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn DeckProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Resolve inputs ───────────────────────────────────────────────────
    let kind = cli.kind.source_kind();
    let inputs = resolve_inputs(&cli.inputs, kind)?;
    let reads_stdin = inputs.iter().any(|i| matches!(i, Input::Stdin));

    // ── Fast path: files straight to a PDF ───────────────────────────────
    if !reads_stdin && !cli.rows_only {
        let sources: Vec<ResolvedSource> = inputs
            .into_iter()
            .filter_map(|i| match i {
                Input::File(source) => Some(source),
                Input::Stdin => None,
            })
            .collect();
        let stats = build_deck_to_file(&sources, &cli.output, &config)
            .await
            .context("Could not build the deck")?;
        if !cli.quiet {
            eprintln!(
                "{}  {} cards on {} sheet(s)  {}ms  →  {}",
                green("✔"),
                stats.cards,
                stats.sheets,
                stats.duration_ms,
                bold(&cli.output.display().to_string()),
            );
            let skipped = stats.entries.saturating_sub(stats.cards);
            if skipped > 0 {
                eprintln!("   {}", dim(&format!("{skipped} incomplete row(s) skipped")));
            }
        }
        return Ok(());
    }

    // ── Collect rows ─────────────────────────────────────────────────────
    let started = Instant::now();
    let loaded = collect_rows(inputs, kind, &config, || {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    })
    .await?;

    if cli.rows_only {
        return print_rows(&loaded.deck, cli.json);
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_rows_parsed(loaded.deck.len());
    }

    // ── Render ───────────────────────────────────────────────────────────
    let cards = loaded.deck.printable().len();
    let pdf = render_deck(&loaded.deck, &config)
        .await
        .context("Could not render the deck")?;
    write_pdf(&cli.output, pdf)
        .await
        .context("Could not write the PDF")?;

    if !cli.quiet {
        eprintln!(
            "{}  {} cards  {}ms  →  {}",
            green("✔"),
            cards,
            started.elapsed().as_millis(),
            bold(&cli.output.display().to_string()),
        );
    }
    Ok(())
}

// ── Inputs ───────────────────────────────────────────────────────────────────

/// One positional input: a validated file, or `-` for stdin.
#[derive(Debug)]
enum Input {
    File(ResolvedSource),
    Stdin,
}

/// Validate every positional input. No inputs at all means stdin.
fn resolve_inputs(paths: &[PathBuf], kind: Option<SourceKind>) -> Result<Vec<Input>> {
    if paths.is_empty() {
        return Ok(vec![Input::Stdin]);
    }
    paths
        .iter()
        .map(|p| {
            if p.as_os_str() == "-" {
                Ok(Input::Stdin)
            } else {
                resolve_source(p, kind)
                    .map(Input::File)
                    .with_context(|| format!("Cannot use input {}", p.display()))
            }
        })
        .collect()
}

/// Load rows from every input in command-line order.
///
/// Runs of files go through the library together so consecutive images are
/// still OCR'd as one document. Stdin is read once, at the first `-`; later
/// `-` inputs contribute nothing.
async fn collect_rows(
    inputs: Vec<Input>,
    kind: Option<SourceKind>,
    config: &DeckConfig,
    read_stdin: impl FnOnce() -> io::Result<String>,
) -> Result<LoadedRows> {
    let mut loaded = LoadedRows::default();
    let mut run: Vec<ResolvedSource> = Vec::new();
    let mut read_stdin = Some(read_stdin);

    for input in inputs {
        match input {
            Input::File(source) => run.push(source),
            Input::Stdin => {
                flush_run(&mut run, config, &mut loaded).await?;
                let Some(read) = read_stdin.take() else {
                    continue;
                };
                let text = read().context("Failed to read stdin")?;
                let deck = match kind {
                    Some(SourceKind::Table) => rows_from_table(&text),
                    _ => rows_from_text(&text),
                };
                for entry in deck.into_entries() {
                    loaded.deck.push(entry);
                }
            }
        }
    }
    flush_run(&mut run, config, &mut loaded).await?;
    Ok(loaded)
}

async fn flush_run(
    run: &mut Vec<ResolvedSource>,
    config: &DeckConfig,
    loaded: &mut LoadedRows,
) -> Result<()> {
    if run.is_empty() {
        return Ok(());
    }
    let rows = rows_from_sources(run, config)
        .await
        .context("Could not read the inputs")?;
    for entry in rows.deck.into_entries() {
        loaded.deck.push(entry);
    }
    loaded.ocr_attempts += rows.ocr_attempts;
    run.clear();
    Ok(())
}

// ── Output ───────────────────────────────────────────────────────────────────

/// Write the recovered grid to stdout.
fn print_rows(deck: &Deck, json: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if json {
        let out = serde_json::to_string_pretty(deck).context("Failed to serialise rows")?;
        writeln!(handle, "{out}").context("Failed to write to stdout")?;
    } else {
        handle
            .write_all(deck.to_tsv().as_bytes())
            .context("Failed to write to stdout")?;
    }
    Ok(())
}

/// Map CLI args to `DeckConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<DeckConfig> {
    let mut builder = DeckConfig::builder()
        .duplex(cli.duplex.into())
        .back_offset_mm(cli.back_offset_x, cli.back_offset_y)
        .show_marker(cli.marker)
        .include_footer(!cli.no_footer)
        .subject(cli.subject.clone())
        .lesson(cli.lesson.clone())
        .ocr_engine(cli.ocr_engine.into())
        .ocr_language(cli.language.clone());

    if let Some(ref template) = cli.footer_template {
        builder = builder.footer_template(template.clone());
    }
    if let Some(ref column) = cli.term_column {
        builder = builder.term_column(parse_column(column));
    }
    if let Some(ref column) = cli.definition_column {
        builder = builder.definition_column(parse_column(column));
    }
    if let Some(ref key) = cli.ocr_api_key {
        builder = builder.ocr_api_key(key.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn parse_column(s: &str) -> ColumnSelector {
    match s.parse::<ColumnSelector>() {
        Ok(column) => column,
        Err(never) => match never {},
    }
}
