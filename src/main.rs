//! xlsxhtml CLI
//!
//! Renders one worksheet of an Excel file as an HTML table.

use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use xlsxhtml::{
    ConverterBuilder, HtmlProfile, ImageFailurePolicy, SheetSelector, XlsxToHtmlError,
};

#[derive(Parser)]
#[command(
    name = "xlsxhtml",
    version,
    about = "Render an Excel worksheet as an HTML table",
    after_help = "EXAMPLES:\n  \
                  xlsxhtml report.xlsx > table.html\n  \
                  xlsxhtml report.xlsx --sheet-name Summary --document -o summary.html\n  \
                  xlsxhtml report.xlsx --image-dir images --skip-failed-images"
)]
struct Cli {
    /// Input workbook (.xlsx)
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sheet to render, by 0-based index
    #[arg(long, conflicts_with = "sheet_name")]
    sheet_index: Option<usize>,

    /// Sheet to render, by name
    #[arg(long)]
    sheet_name: Option<String>,

    /// Emit a standalone Bootstrap document instead of a <table> fragment
    #[arg(long)]
    document: bool,

    /// Directory for extracted images
    #[arg(long, default_value = ".")]
    image_dir: PathBuf,

    /// Display width of extracted images in px
    #[arg(long, default_value_t = 300)]
    image_width: u32,

    /// Command used to convert EMF/WMF images to SVG
    #[arg(long, default_value = "inkscape")]
    converter: PathBuf,

    /// Do not convert EMF/WMF images
    #[arg(long, conflicts_with = "converter")]
    no_convert: bool,

    /// Drop images whose conversion fails instead of aborting
    #[arg(long)]
    skip_failed_images: bool,

    /// Emit cell values as raw HTML
    #[arg(long)]
    no_escape: bool,

    /// Write a JSON report (unmapped colours, written images) to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {}", category(&err), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), XlsxToHtmlError> {
    let selector = match (cli.sheet_index, cli.sheet_name) {
        (_, Some(name)) => SheetSelector::Name(name),
        (Some(index), None) => SheetSelector::Index(index),
        (None, None) => SheetSelector::default(),
    };
    let profile = if cli.document {
        HtmlProfile::Document
    } else {
        HtmlProfile::Fragment
    };
    let policy = if cli.skip_failed_images {
        ImageFailurePolicy::Skip
    } else {
        ImageFailurePolicy::Abort
    };
    let converter_command = if cli.no_convert {
        None
    } else {
        Some(cli.converter)
    };

    let converter = ConverterBuilder::new()
        .with_sheet_selector(selector)
        .with_profile(profile)
        .escape_html(!cli.no_escape)
        .with_image_dir(cli.image_dir)
        .with_image_width(cli.image_width)
        .with_image_converter(converter_command)
        .with_image_failure_policy(policy)
        .build()?;

    let rendered = converter.render(File::open(&cli.input)?)?;

    match cli.output {
        Some(path) => File::create(path)?.write_all(rendered.html.as_bytes())?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.html.as_bytes())?;
            stdout.flush()?;
        }
    }

    if let Some(path) = cli.report {
        let json = serde_json::to_string_pretty(&rendered)
            .map_err(|e| XlsxToHtmlError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        std::fs::write(path, json)?;
    }

    Ok(())
}

fn category(err: &XlsxToHtmlError) -> &'static str {
    match err {
        XlsxToHtmlError::Io(_) => "io error",
        XlsxToHtmlError::Parse(_)
        | XlsxToHtmlError::Utf8(_)
        | XlsxToHtmlError::Zip(_)
        | XlsxToHtmlError::Xml { .. }
        | XlsxToHtmlError::ParseInt(_) => "invalid workbook",
        XlsxToHtmlError::Config(_) => "invalid arguments",
        XlsxToHtmlError::SecurityViolation(_) => "rejected workbook",
        XlsxToHtmlError::ImageConversion { .. } => "image conversion failed",
    }
}
