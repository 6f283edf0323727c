//! Integration Tests for xlsxhtml
//!
//! rust_xlsxwriterで生成したワークブックを公開API（`Converter`）でHTMLに変換し、
//! セル結合、書式、マーカー、画像、出力形式の振る舞いを検証します。

use rust_xlsxwriter::*;
use std::io::Cursor;
use xlsxhtml::{
    ConverterBuilder, HtmlProfile, ImageFailurePolicy, SheetSelector, XlsxToHtmlError,
};

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    /// 1x1ピクセルのPNG
    pub const PNG: [u8; 70] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0x64,
        0x60, 0xF8, 0x5F, 0x0F, 0x00, 0x02, 0x87, 0x01, 0x80, 0xEB, 0x47, 0xBA, 0x92, 0x00, 0x00,
        0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    /// Generate a simple 2x2 table Excel file
    pub fn generate_simple_table() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string(0, 0, "Name")?;
        worksheet.write_string(0, 1, "Score")?;
        worksheet.write_string(1, 0, "Alice")?;
        worksheet.write_number(1, 1, 42)?;

        workbook.save_to_buffer()
    }

    /// Generate a workbook with 3 sheets
    pub fn generate_multi_sheets() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        for name in ["Sheet1", "Sheet2", "Sheet3"] {
            let sheet = workbook.add_worksheet();
            sheet.set_name(name)?;
            sheet.write_string(0, 0, &format!("{}_Data", name))?;
        }

        workbook.save_to_buffer()
    }

    /// Generate a 2x2 merged block with an image inside it
    pub fn generate_merged_with_image() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.merge_range(0, 0, 1, 1, "X", &Format::new())?;
        worksheet.insert_image(1, 1, &Image::new_from_buffer(&PNG)?)?;

        workbook.save_to_buffer()
    }

    /// Generate cells with font colours, fills and flags
    pub fn generate_styled_cells() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let red = Format::new().set_font_color(Color::RGB(0xFF0000));
        let bold_italic = Format::new().set_bold().set_italic();
        let yellow_fill = Format::new().set_background_color(Color::RGB(0xFFFF00));
        let white_fill = Format::new().set_background_color(Color::White);
        let unmapped = Format::new().set_font_color(Color::RGB(0x123456));

        worksheet.write_string_with_format(0, 0, "Red", &red)?;
        worksheet.write_string_with_format(1, 0, "Both", &bold_italic)?;
        worksheet.write_string_with_format(2, 0, "Fill", &yellow_fill)?;
        worksheet.write_string_with_format(3, 0, "White", &white_fill)?;
        worksheet.write_string_with_format(4, 0, "Odd", &unmapped)?;

        workbook.save_to_buffer()
    }

    /// Generate a rich string cell
    pub fn generate_rich_string() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let bold = Format::new().set_bold();
        let plain = Format::new();
        let red = Format::new().set_font_color(Color::RGB(0xFF0000));
        let segments = [(&bold, "Bold"), (&plain, "Plain"), (&red, "Red")];
        worksheet.write_rich_string(0, 0, &segments)?;

        workbook.save_to_buffer()
    }

    /// Generate values of several types, newlines and HTML special characters
    pub fn generate_values() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_number(0, 0, 1.5)?;
        worksheet.write_boolean(0, 1, true)?;
        worksheet.write_string(1, 0, "line1\n  line2")?;
        worksheet.write_string(2, 0, "<a> & 'b'")?;

        workbook.save_to_buffer()
    }
}

/// Fragment形式の外枠
const FRAGMENT_HEADER: &str = "\n<table>\n    <tbody>\n";
const FRAGMENT_FOOTER: &str = "\n    </tbody>\n</table>\n";

fn convert(data: Vec<u8>) -> String {
    ConverterBuilder::new()
        .build()
        .unwrap()
        .convert_to_string(Cursor::new(data))
        .unwrap()
}

#[test]
fn test_simple_table_fragment() {
    let html = convert(fixtures::generate_simple_table().unwrap());

    assert_eq!(
        html,
        format!(
            "{}<tr>\n<td>Name</td>\n<td>Score</td>\n</tr>\n<tr>\n<td>Alice</td>\n<td>42</td>\n</tr>\n{}",
            FRAGMENT_HEADER, FRAGMENT_FOOTER
        )
    );
}

#[test]
fn test_simple_table_document() {
    let converter = ConverterBuilder::new()
        .with_profile(HtmlProfile::Document)
        .build()
        .unwrap();
    let html = converter
        .convert_to_string(Cursor::new(fixtures::generate_simple_table().unwrap()))
        .unwrap();

    assert!(html.starts_with("<!doctype html>"));
    assert!(html.contains("<table class='table table-bordered table-hover table-striped'>"));
    assert!(html.contains(
        "<tbody><tr><th>Name</th><th>Score</th></tr><tr><td>Alice</td><td>42</td></tr></tbody>"
    ));
    assert!(html.ends_with("</tbody></table></body></html>\n"));
}

#[test]
fn test_sheet_selection() {
    let data = fixtures::generate_multi_sheets().unwrap();

    let by_index = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Index(1))
        .build()
        .unwrap()
        .convert_to_string(Cursor::new(data.clone()))
        .unwrap();
    assert!(by_index.contains("<td>Sheet2_Data</td>"));

    let by_name = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Name("Sheet3".to_string()))
        .build()
        .unwrap()
        .convert_to_string(Cursor::new(data.clone()))
        .unwrap();
    assert!(by_name.contains("<td>Sheet3_Data</td>"));

    let default = convert(data.clone());
    assert!(default.contains("<td>Sheet1_Data</td>"));

    let result = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Index(3))
        .build()
        .unwrap()
        .convert_to_string(Cursor::new(data));
    match result {
        Err(XlsxToHtmlError::Config(msg)) => assert!(msg.contains("out of range")),
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_merged_block_with_image_at_anchor() {
    let dir = tempfile::tempdir().unwrap();
    let converter = ConverterBuilder::new()
        .with_image_dir(dir.path())
        .with_image_width(120)
        .build()
        .unwrap();
    let rendered = converter
        .render(Cursor::new(fixtures::generate_merged_with_image().unwrap()))
        .unwrap();

    assert_eq!(rendered.images.len(), 1);
    let image = &rendered.images[0];
    assert_eq!(image.extension().and_then(|e| e.to_str()), Some("png"));
    assert_eq!(std::fs::read(image).unwrap(), fixtures::PNG.to_vec());

    let file_name = image.file_name().and_then(|n| n.to_str()).unwrap();
    // 結合範囲の2行目はセルを持たないため出力されない
    assert!(rendered.html.ends_with(&format!(
        "<tr>\n<td colspan='2' rowspan='2'>X<img src='{}/{}' style='width:120px;'></td>\n</tr>\n{}",
        dir.path().to_string_lossy().replace('\\', "/"),
        file_name,
        FRAGMENT_FOOTER
    )));
}

#[test]
fn test_document_profile_ignores_images() {
    let dir = tempfile::tempdir().unwrap();
    let converter = ConverterBuilder::new()
        .with_profile(HtmlProfile::Document)
        .with_image_dir(dir.path())
        .build()
        .unwrap();
    let rendered = converter
        .render(Cursor::new(fixtures::generate_merged_with_image().unwrap()))
        .unwrap();

    assert!(rendered.images.is_empty());
    assert!(rendered
        .html
        .contains("<tbody><tr><th colspan='2' rowspan='2'>X</th></tr><tr></tr></tbody>"));
}

#[test]
fn test_styled_cells_fragment() {
    let converter = ConverterBuilder::new().build().unwrap();
    let rendered = converter
        .render(Cursor::new(fixtures::generate_styled_cells().unwrap()))
        .unwrap();
    let html = &rendered.html;

    assert!(html.contains("<td><mark class='marker-red'>Red</mark></td>"));
    assert!(html.contains("<td><b><i>Both</i></b></td>"));
    assert!(html.contains("<td style='background-color:#FFFF00;'>Fill</td>"));
    assert!(html.contains("<td>White</td>"));
    assert!(html.contains("<td>Odd</td>"));
    assert_eq!(rendered.unmapped_colors, vec!["123456".to_string()]);
}

#[test]
fn test_styled_cells_document() {
    let converter = ConverterBuilder::new()
        .with_profile(HtmlProfile::Document)
        .build()
        .unwrap();
    let html = converter
        .convert_to_string(Cursor::new(fixtures::generate_styled_cells().unwrap()))
        .unwrap();

    // 先頭行は見出し、書式フラグはプレーンな文字列には適用しない、塗りつぶしは出力しない
    assert!(html.contains("<tr><th><mark class='marker-red'>Red</mark></th></tr>"));
    assert!(html.contains("<tr><td>Both</td></tr>"));
    assert!(html.contains("<tr><td>Fill</td></tr>"));
    assert!(!html.contains("background-color"));
}

#[test]
fn test_rich_string_runs() {
    let html = convert(fixtures::generate_rich_string().unwrap());

    assert!(html.contains("<td><b>Bold</b>Plain<mark class='marker-red'>Red</mark></td>"));
}

#[test]
fn test_values_newlines_and_escaping() {
    let html = convert(fixtures::generate_values().unwrap());

    assert!(html.contains("<td>1.5</td>\n<td>TRUE</td>"));
    assert!(html.contains("<td>line1<br>\n&nbsp;&nbsp;line2</td>"));
    assert!(html.contains("<td>&lt;a&gt; &amp; &#39;b&#39;</td>"));
}

#[test]
fn test_no_escape_passthrough() {
    let converter = ConverterBuilder::new().escape_html(false).build().unwrap();
    let html = converter
        .convert_to_string(Cursor::new(fixtures::generate_values().unwrap()))
        .unwrap();

    assert!(html.contains("<td><a> & 'b'</td>"));
}

#[test]
fn test_convert_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.html");

    let converter = ConverterBuilder::new().build().unwrap();
    converter
        .convert(
            Cursor::new(fixtures::generate_simple_table().unwrap()),
            std::fs::File::create(&path).unwrap(),
        )
        .unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("<td>Alice</td>"));
}

#[test]
fn test_emf_conversion_failure_policies() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-converter");

    let mut sheet = xlsxhtml::Worksheet::new("Sheet1");
    sheet.put_cell(xlsxhtml::Cell::new(
        xlsxhtml::CellCoord::new(0, 0),
        Some(xlsxhtml::CellValue::Literal("pic".to_string())),
    ));
    sheet.images.push(xlsxhtml::Image::new(
        xlsxhtml::CellCoord::new(0, 0),
        None,
        vec![1, 2, 3],
        "emf",
    ));
    let workbook = xlsxhtml::Workbook::default();

    let abort = ConverterBuilder::new()
        .with_image_dir(dir.path())
        .with_image_converter(Some(missing.clone()))
        .build()
        .unwrap();
    match abort.render_sheet(&workbook, &sheet) {
        Err(XlsxToHtmlError::ImageConversion { image, .. }) => assert!(image.ends_with(".emf")),
        _ => panic!("Expected ImageConversion error"),
    }

    let skip = ConverterBuilder::new()
        .with_image_dir(dir.path())
        .with_image_converter(Some(missing))
        .with_image_failure_policy(ImageFailurePolicy::Skip)
        .build()
        .unwrap();
    let rendered = skip.render_sheet(&workbook, &sheet).unwrap();
    assert!(rendered.html.contains("<td>pic</td>"));
    assert!(rendered.images.is_empty());
}
