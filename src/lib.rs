//! xlsxhtml - Pure-Rust Excel worksheet to HTML table renderer
//!
//! This crate renders one worksheet of an Excel file (XLSX) as an HTML table,
//! preserving merged cells, fill colours, rich-text run formatting
//! (bold / italic / underline / strike) and a curated set of highlight
//! colours ("markers") rendered as `<mark class='...'>`. Embedded images are
//! written next to the output and re-anchored to the top-left cell of the
//! merged range they fall into.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxhtml::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a converter with default settings
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     // Open input Excel file
//!     let input = File::open("example.xlsx")?;
//!
//!     // Create output HTML file
//!     let output = File::create("output.html")?;
//!
//!     // Render the first sheet as a <table> fragment
//!     converter.convert(input, output)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxhtml::{ConverterBuilder, HtmlProfile, ImageFailurePolicy, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_sheet_selector(SheetSelector::Name("Report".to_string()))
//!         .with_profile(HtmlProfile::Document)  // Standalone Bootstrap page
//!         .with_image_dir("images")
//!         .with_image_failure_policy(ImageFailurePolicy::Skip)
//!         .build()?;
//!
//!     let input = File::open("example.xlsx")?;
//!     let output = File::create("output.html")?;
//!     converter.convert(input, output)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Render Report
//!
//! `Converter::render` returns the HTML together with the colours that had no
//! marker class and the image files that were written:
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxhtml::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!     let rendered = converter.render(File::open("example.xlsx")?)?;
//!
//!     for color in &rendered.unmapped_colors {
//!         eprintln!("no marker for {}", color);
//!     }
//!     println!("{}", rendered.html);
//!
//!     Ok(())
//! }
//! ```

mod api;
mod builder;
mod color;
mod error;
mod image;
mod marker;
mod merge;
mod parser;
mod profile;
mod render;
mod richtext;
mod security;
mod types;

// 公開API
pub use api::{HtmlProfile, ImageFailurePolicy, SheetSelector};
pub use builder::{Converter, ConverterBuilder, RenderedSheet};
pub use error::XlsxToHtmlError;
pub use marker::MarkerTable;
pub use types::{
    Cell, CellCoord, CellRange, CellValue, ColorRef, FontStyle, Image, MergedRegion, Row, Run,
    SharedString, StyleOverrides, ThemeColor, ThemePalette, Workbook, Worksheet,
};
