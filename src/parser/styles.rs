//! Styles Parser Module
//!
//! `xl/styles.xml`からフォント・塗りつぶし・セル書式（cellXfs）を抽出するモジュール。

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{attribute, numeric_attribute};
use crate::error::XlsxToHtmlError;
use crate::types::{ColorRef, FontStyle};

pub(crate) const PART: &str = "xl/styles.xml";

/// セル書式（cellXfs要素）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CellXf {
    pub font_id: usize,
    pub fill_id: usize,
}

/// スタイルシート
#[derive(Debug, Clone, Default)]
pub(crate) struct StyleSheet {
    fonts: Vec<FontStyle>,
    fills: Vec<Option<ColorRef>>,
    cell_xfs: Vec<CellXf>,
}

impl StyleSheet {
    /// スタイルインデックス（`<c s="...">`）に対応するフォント
    pub fn font(&self, style: usize) -> Option<&FontStyle> {
        let xf = self.cell_xfs.get(style)?;
        self.fonts.get(xf.font_id)
    }

    /// スタイルインデックスに対応する塗りつぶし色
    pub fn fill(&self, style: usize) -> Option<&ColorRef> {
        let xf = self.cell_xfs.get(style)?;
        self.fills.get(xf.fill_id)?.as_ref()
    }

    /// `xl/styles.xml`を解析する
    pub fn parse(xml: &[u8]) -> Result<Self, XlsxToHtmlError> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut sheet = StyleSheet::default();
        let mut buf = Vec::new();

        let mut in_fonts = false;
        let mut in_fills = false;
        let mut in_cell_xfs = false;
        let mut current_font: Option<FontStyle> = None;
        let mut current_fill: Option<Option<ColorRef>> = None;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| XlsxToHtmlError::xml(PART, e))?;

            match event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"fonts" => in_fonts = true,
                    b"fills" => in_fills = true,
                    b"cellXfs" => in_cell_xfs = true,
                    b"font" if in_fonts => current_font = Some(FontStyle::default()),
                    b"fill" if in_fills => current_fill = Some(None),
                    b"xf" if in_cell_xfs => sheet.cell_xfs.push(parse_xf(&e)?),
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"font" if in_fonts => sheet.fonts.push(FontStyle::default()),
                    b"fill" if in_fills => sheet.fills.push(None),
                    b"xf" if in_cell_xfs => sheet.cell_xfs.push(parse_xf(&e)?),
                    b"fgColor" => {
                        if let Some(fill) = current_fill.as_mut() {
                            *fill = color_from_element(PART, &e)?;
                        }
                    }
                    _ => {
                        if let Some(font) = current_font.as_mut() {
                            apply_font_property(PART, font, &e)?;
                        }
                    }
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"fonts" => in_fonts = false,
                    b"fills" => in_fills = false,
                    b"cellXfs" => in_cell_xfs = false,
                    b"font" => {
                        if let Some(font) = current_font.take() {
                            sheet.fonts.push(font);
                        }
                    }
                    b"fill" => {
                        if let Some(fill) = current_fill.take() {
                            sheet.fills.push(fill);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }
}

fn parse_xf(element: &BytesStart<'_>) -> Result<CellXf, XlsxToHtmlError> {
    Ok(CellXf {
        font_id: numeric_attribute(PART, element, b"fontId")?.unwrap_or(0),
        fill_id: numeric_attribute(PART, element, b"fillId")?.unwrap_or(0),
    })
}

/// `<color>`などの色要素を`ColorRef`に変換する
///
/// `rgb`があればリテラル、`theme`があればテーマ参照です。`indexed`と`auto`は色なしとして扱います。
pub(crate) fn color_from_element(
    part: &str,
    element: &BytesStart<'_>,
) -> Result<Option<ColorRef>, XlsxToHtmlError> {
    if let Some(rgb) = attribute(part, element, b"rgb")? {
        return Ok(Some(ColorRef::Literal(rgb)));
    }

    if let Some(index) = numeric_attribute::<u32>(part, element, b"theme")? {
        let tint = numeric_attribute::<f64>(part, element, b"tint")?.unwrap_or(0.0);
        return Ok(Some(ColorRef::theme(index, tint)));
    }

    Ok(None)
}

/// 書式フラグ要素の値（`<b/>`はtrue、`val="0"`/`"false"`/`u val="none"`はfalse）
fn flag_value(part: &str, element: &BytesStart<'_>) -> Result<bool, XlsxToHtmlError> {
    Ok(match attribute(part, element, b"val")?.as_deref() {
        None => true,
        Some("0") | Some("false") | Some("none") => false,
        Some(_) => true,
    })
}

/// フォント（`<font>`または`<rPr>`）の子要素を適用する
pub(crate) fn apply_font_property(
    part: &str,
    font: &mut FontStyle,
    element: &BytesStart<'_>,
) -> Result<(), XlsxToHtmlError> {
    match element.local_name().as_ref() {
        b"b" => font.flags.bold = Some(flag_value(part, element)?),
        b"i" => font.flags.italic = Some(flag_value(part, element)?),
        b"u" => font.flags.underline = Some(flag_value(part, element)?),
        b"strike" => font.flags.strike = Some(flag_value(part, element)?),
        b"color" => font.color = color_from_element(part, element)?,
        _ => {}
    }
    Ok(())
}
