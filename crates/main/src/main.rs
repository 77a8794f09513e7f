use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finreport::snapshot::ImageFileElement;
use finreport::{GeneratorOptions, Locale, ReportData, ReportGenerator, VisualElement};

/// Renders finance reports to PDF from the command line.
///
/// Fonts must be present under `assets/fonts` next to the binary or in the
/// `finreport` crate, or be provided via the `FINREPORT_FONTS_DIR` environment
/// variable. Liberation Sans (Linux) or Arial (Windows) is used otherwise.
#[derive(Parser)]
#[command(author, version, about = "Render finance reports to PDF")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a report JSON payload to `report-{type}-{date}.pdf`.
    Render(RenderArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Report payload in JSON.
    input: PathBuf,

    /// Directory the PDF is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Locale for amounts and dates (`fr`, `en`, `fr-FR`, `en-US`).
    #[arg(long, default_value = "fr-FR")]
    locale: Locale,

    /// Maximum number of transaction rows before the listing is cut.
    #[arg(long)]
    max_rows: Option<usize>,

    /// Maximum number of description characters per row.
    #[arg(long)]
    description_chars: Option<usize>,

    /// Document title.
    #[arg(long)]
    title: Option<String>,

    /// Footer text printed on the last page.
    #[arg(long)]
    footer: Option<String>,

    /// Pre-rendered image of the report to paginate instead of drawing it.
    #[arg(long, value_name = "IMAGE")]
    snapshot: Option<PathBuf>,

    /// Embed a PDF outline with the report sections.
    #[arg(long)]
    bookmarks: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finreport=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render(args) => render(args),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn render(args: RenderArgs) -> Result<(), Box<dyn Error>> {
    let payload = fs::read_to_string(&args.input)
        .map_err(|err| format!("failed to read {}: {}", args.input.display(), err))?;
    let report = ReportData::from_json(&payload)?;

    let mut options = GeneratorOptions::new()
        .with_locale(args.locale)
        .with_bookmarks(args.bookmarks);
    if let Some(max_rows) = args.max_rows {
        options = options.with_max_rows(max_rows);
    }
    if let Some(description_chars) = args.description_chars {
        options = options.with_description_chars(description_chars);
    }
    if let Some(title) = args.title {
        options = options.with_title(title);
    }
    if let Some(footer) = args.footer {
        options = options.with_footer_text(footer);
    }

    let snapshot = args.snapshot.map(ImageFileElement::new);
    let element = snapshot.as_ref().map(|element| element as &dyn VisualElement);

    fs::create_dir_all(&args.out_dir)?;
    let generator = ReportGenerator::new(options);
    info!(
        "rendering {} report ({} transactions, locale {})",
        report.report_type,
        report.transactions.len(),
        generator.options().locale()
    );
    let rendered = generator.generate(&report, element)?;
    let path = rendered.write_to(&args.out_dir)?;

    info!(
        "{:?} rendering, {} page(s)",
        rendered.strategy, rendered.page_count
    );
    println!("{}", path.display());
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
