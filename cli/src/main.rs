//! flatfill CLI - flat PDF form analysis and filling tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use flatfill::parser::{LopdfBackend, PdfBackend};
use flatfill::render::FillStep;
use flatfill::values::{display_string, format_date, is_checked, resolve_path};
use flatfill::{
    content_hash, spawn_fill, AnalysisResult, AnalyzeOptions, DefaultFormatter, DisplayFormatter,
    FieldKind, FillOptions, FillRequest, PageSelection, RenderOptions, TemplateAnalyzer,
    TemplateConfig,
};

const DETECTED_FIELDS_FILE: &str = "detected_fields.json";
const TEMPLATE_CONFIG_FILE: &str = "template_config.json";

#[derive(Parser)]
#[command(name = "flatfill")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Detect and fill fields on flat PDF forms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect candidate fields and write a starter template config
    Analyze {
        /// Template PDF
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory (defaults to <stem>_template)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Disable parallel analysis
        #[arg(long)]
        sequential: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Fill a template from JSON data
    Fill {
        /// Template PDF
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Template config with field definitions
        #[arg(short, long, value_name = "JSON", env = "FLATFILL_CONFIG")]
        config: PathBuf,

        /// Values to fill in
        #[arg(short, long, value_name = "JSON")]
        data: PathBuf,

        /// Output file (defaults to <stem>_filled.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Smallest font size for shrink-to-fit
        #[arg(long, default_value = "4")]
        min_font_size: f32,

        /// Write overlay streams uncompressed
        #[arg(long)]
        no_compress: bool,
    },

    /// Show how each configured field resolves against the data
    Diagnose {
        /// Template config with field definitions
        #[arg(short, long, value_name = "JSON", env = "FLATFILL_CONFIG")]
        config: PathBuf,

        /// Values to check
        #[arg(short, long, value_name = "JSON")]
        data: PathBuf,

        /// Show at most this many fields
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show template information
    Info {
        /// Template PDF
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            output,
            compact,
            sequential,
            pages,
        } => cmd_analyze(&input, output.as_deref(), compact, sequential, pages.as_deref()),
        Commands::Fill {
            input,
            config,
            data,
            output,
            min_font_size,
            no_compress,
        } => cmd_fill(
            &input,
            &config,
            &data,
            output.as_deref(),
            min_font_size,
            !no_compress,
        ),
        Commands::Diagnose {
            config,
            data,
            limit,
        } => cmd_diagnose(&config, &data, limit),
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_analyze(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    sequential: bool,
    pages: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = if let Some(p) = pages {
        PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?
    } else {
        PageSelection::All
    };

    let stem = input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(format!("{}_template", stem)));

    let pb = ProgressBar::new_spinner();
    pb.set_message("Analyzing template...");

    let options = AnalyzeOptions::new()
        .with_parallel(!sequential)
        .with_pages(page_selection);
    let analysis = TemplateAnalyzer::with_options(options).analyze_file(input)?;
    pb.finish_and_clear();

    let written = write_analysis(&analysis, &stem, &output_dir, !compact)?;

    println!(
        "{} {} candidate fields on {} pages",
        "Found".green().bold(),
        analysis.candidates.len(),
        analysis.page_count
    );
    println!("\n{}", "Output files:".green().bold());
    for (i, path) in written.iter().enumerate() {
        let branch = if i + 1 == written.len() { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), path.display());
    }

    Ok(())
}

/// Write the analysis, plus a starter config unless one already exists.
fn write_analysis(
    analysis: &AnalysisResult,
    template_id: &str,
    output_dir: &Path,
    pretty: bool,
) -> flatfill::Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let detected = output_dir.join(DETECTED_FIELDS_FILE);
    fs::write(&detected, analysis.to_json(pretty)?)?;
    written.push(detected);

    let config_path = output_dir.join(TEMPLATE_CONFIG_FILE);
    if !config_path.exists() {
        let starter = TemplateConfig::starter(template_id, analysis);
        fs::write(&config_path, starter.to_json(true)?)?;
        written.push(config_path);
    }

    Ok(written)
}

fn cmd_fill(
    input: &Path,
    config: &Path,
    data: &Path,
    output: Option<&Path>,
    min_font_size: f32,
    compress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_path = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_filled.pdf", stem))
    });

    let template = fs::read(input)?;
    let config = TemplateConfig::from_file(config)?;
    let data: serde_json::Value = serde_json::from_str(&fs::read_to_string(data)?)?;

    let options = FillOptions::new().with_render_options(
        RenderOptions::new()
            .with_min_font_size(min_font_size)
            .with_compression(compress),
    );
    let job = spawn_fill(FillRequest::new(template, config, data).with_options(options))?;

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    for event in job.progress().iter() {
        pb.set_position(u64::from(event.overall_percent));
        pb.set_message(event.message.clone());
        if event.step == FillStep::Done {
            break;
        }
    }

    let filled = job.wait();
    pb.finish_and_clear();
    let filled = filled?;
    filled.save(&output_path)?;

    println!(
        "{} {} ({} of {} pages filled)",
        "Saved to".green(),
        output_path.display(),
        filled.pages_filled,
        filled.analysis.page_count
    );

    Ok(())
}

fn cmd_diagnose(
    config: &Path,
    data: &Path,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = TemplateConfig::from_file(config)?;
    let data: serde_json::Value = serde_json::from_str(&fs::read_to_string(data)?)?;
    let fields = config.fields()?;
    let formatter = DefaultFormatter::new();

    println!("{}", "Field Resolution".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());

    let shown = limit.unwrap_or(fields.len()).min(fields.len());
    for field in &fields[..shown] {
        let path = match field.binding() {
            Some(path) => path,
            None => {
                println!("{} (no schema_path)", "skip".yellow());
                continue;
            }
        };
        let value = resolve_path(&data, path);
        let display = match (field.kind, value) {
            (FieldKind::Checkbox, v) => {
                String::from(if is_checked(field, v) { "X" } else { "" })
            }
            (FieldKind::Date, Some(v)) => {
                let text = formatter.format(v, path);
                format_date(&text).unwrap_or(text)
            }
            (_, Some(v)) => formatter.format(v, path),
            (_, None) => String::new(),
        };
        let bbox = match field.bbox() {
            Some(b) => format!("{:?}", b.to_array()),
            None => "malformed".red().to_string(),
        };

        println!("{}: {}", "Path".bold(), path);
        println!(
            "  value={} display={:?} page={} bbox={}",
            value
                .map(display_string)
                .unwrap_or_else(|| "<missing>".dimmed().to_string()),
            display,
            field.page,
            bbox
        );
    }

    if shown < fields.len() {
        println!("{}", format!("... {} more", fields.len() - shown).dimmed());
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let hash = content_hash(&data);
    let backend = LopdfBackend::from_vec(data)?;

    println!("{}", "Template Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), backend.version());
    println!("{}: {}", "Pages".bold(), backend.page_count());
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if backend.is_encrypted() { "Yes" } else { "No" }
    );
    println!("{}: {}", "SHA-256".bold(), hash);

    println!();
    println!("{}", "Page Sizes".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for page in backend.pages() {
        println!(
            "  {} {} x {} pt",
            format!("{:>4}", page.index + 1).bold(),
            page.width,
            page.height
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "flatfill".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Flat PDF form analysis and filling tool");
    println!();
    println!("License: MIT");
}
