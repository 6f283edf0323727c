//! Workbook Parser Module
//!
//! calamineとXLSXパッケージの直接解析を組み合わせ、1枚のワークシートを
//! レンダラが読み取るデータモデル（`Worksheet`）にデコードするモジュール。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets, Xlsx};
use quick_xml::events::Event;
use std::io::{Cursor, Read, Seek};

use super::drawing::parse_drawing;
use super::package::XlsxPackage;
use super::shared_strings::{self, parse_shared_strings};
use super::styles::{self, StyleSheet};
use super::theme::{self, parse_theme};
use super::worksheet::{parse_worksheet, RawCell};
use super::attribute;
use crate::api::SheetSelector;
use crate::error::XlsxToHtmlError;
use crate::security::SecurityConfig;
use crate::types::{
    Cell, CellValue, Image, MergedRegion, Row, ThemePalette, Workbook, Worksheet,
};

const WORKBOOK_PART: &str = "xl/workbook.xml";

/// ワークブックパーサー
///
/// 入力を一度だけメモリに読み込み、calamine（シート一覧、結合範囲、型付きの値）と
/// `XlsxPackage`（スタイル、共有文字列、テーマ、シート構造、描画）で共有します。
pub(crate) struct WorkbookParser {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
    package: XlsxPackage,
    /// シート名とワークシートパートの組（ワークブック内の順序）
    sheets: Vec<(String, String)>,
    styles: StyleSheet,
    context: Workbook,
}

impl WorkbookParser {
    /// ワークブックを開き、ワークブック全体で共有するパートを解析する
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - 読み込みに成功した場合
    /// * `Err(XlsxToHtmlError::SecurityViolation)` - 入力サイズやパッケージの制限に違反した場合
    /// * `Err(XlsxToHtmlError::Parse)` - calamineがワークブックを開けなかった場合
    /// * `Err(XlsxToHtmlError::Config)` - XLSX以外の形式の場合
    pub fn open<R: Read + Seek>(mut reader: R) -> Result<Self, XlsxToHtmlError> {
        let security = SecurityConfig::default();

        let mut buffer = Vec::new();
        let bytes_read = reader.read_to_end(&mut buffer)?;

        if bytes_read as u64 > security.max_input_file_size {
            return Err(XlsxToHtmlError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes_read, security.max_input_file_size
            )));
        }

        // パッケージの検証をcalamineより先に行う
        let mut package = XlsxPackage::open(buffer.clone(), &security)?;

        let sheets = open_workbook_auto_from_rs(Cursor::new(buffer)).map_err(XlsxToHtmlError::Parse)?;
        let workbook = match sheets {
            Sheets::Xlsx(workbook) => workbook,
            _ => {
                return Err(XlsxToHtmlError::Config(
                    "Only XLSX format is supported".to_string(),
                ))
            }
        };

        let workbook_xml = package
            .read_part(WORKBOOK_PART)?
            .ok_or_else(|| XlsxToHtmlError::xml(WORKBOOK_PART, "part not found"))?;
        let relationships = package.relationships(WORKBOOK_PART)?;
        let sheets = parse_sheet_list(&workbook_xml)?
            .into_iter()
            .filter_map(|(name, id)| match relationships.get(&id) {
                Some(part) => Some((name, part.clone())),
                None => {
                    log::debug!("sheet '{}' has no relationship target for {}", name, id);
                    None
                }
            })
            .collect();

        let styles = match package.read_part(styles::PART)? {
            Some(xml) => StyleSheet::parse(&xml)?,
            None => StyleSheet::default(),
        };
        let shared_strings = match package.read_part(shared_strings::PART)? {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };
        let theme = match package.read_part(theme::PART)? {
            Some(xml) => parse_theme(&xml)?,
            None => ThemePalette::default(),
        };

        Ok(Self {
            workbook,
            package,
            sheets,
            styles,
            context: Workbook {
                theme,
                shared_strings,
            },
        })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// ワークブック全体で共有されるデータ（テーマ、共有文字列）
    pub fn workbook(&self) -> &Workbook {
        &self.context
    }

    /// シート選択方式に基づいてシート名を決定
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 選択されたシート名
    /// * `Err(XlsxToHtmlError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<String, XlsxToHtmlError> {
        let names = self.sheet_names();

        match selector {
            SheetSelector::Index(index) => names.get(*index).cloned().ok_or_else(|| {
                XlsxToHtmlError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    names.len()
                ))
            }),
            SheetSelector::Name(name) => {
                if names.contains(name) {
                    Ok(name.clone())
                } else {
                    Err(XlsxToHtmlError::Config(format!("Sheet '{}' not found", name)))
                }
            }
        }
    }

    /// シートをデコードする
    ///
    /// セルの構造とスタイルはワークシートXMLから、共有文字列以外の値の表示文字列は
    /// calamineのキャッシュ値から取得します。
    pub fn decode_sheet(&mut self, sheet_name: &str) -> Result<Worksheet, XlsxToHtmlError> {
        let part = self
            .sheets
            .iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, part)| part.clone())
            .ok_or_else(|| XlsxToHtmlError::Config(format!("Sheet '{}' not found", sheet_name)))?;

        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|e| XlsxToHtmlError::Parse(e.into()))?;

        self.workbook
            .load_merged_regions()
            .map_err(|e| XlsxToHtmlError::Parse(e.into()))?;
        let merged_regions = match self.workbook.worksheet_merge_cells(sheet_name) {
            Some(Ok(regions)) => regions
                .iter()
                .map(|dims| MergedRegion::from_bounds(dims.start.0, dims.start.1, dims.end.0, dims.end.1))
                .collect(),
            Some(Err(_)) | None => Vec::new(),
        };

        let xml = self
            .package
            .read_part(&part)?
            .ok_or_else(|| XlsxToHtmlError::xml(&part, "part not found"))?;
        let sheet_xml = parse_worksheet(&part, &xml)?;

        let mut sheet = Worksheet::new(sheet_name);
        sheet.merged_regions = merged_regions;

        for (row_idx, raw_cells) in sheet_xml.rows {
            let row_idx = row_idx as usize;
            if sheet.rows.len() <= row_idx {
                sheet.rows.resize(row_idx + 1, None);
            }
            sheet.rows[row_idx].get_or_insert_with(Row::default);

            for raw in raw_cells {
                let value = cell_value(&raw, &range)?;
                let mut cell = Cell::new(raw.coord, value);
                cell.font = self.styles.font(raw.style).cloned();
                cell.fill = self.styles.fill(raw.style).cloned();
                sheet.put_cell(cell);
            }
        }

        if let Some(drawing_id) = sheet_xml.drawing {
            sheet.images = self.load_images(&part, &drawing_id)?;
        }

        log::debug!(
            "decoded sheet '{}': {} rows, {} merged ranges, {} images",
            sheet.name,
            sheet.rows.len(),
            sheet.merged_regions.len(),
            sheet.images.len()
        );

        Ok(sheet)
    }

    /// 描画パートから画像を読み込む（アンカーの出現順）
    fn load_images(&mut self, sheet_part: &str, drawing_id: &str) -> Result<Vec<Image>, XlsxToHtmlError> {
        let sheet_rels = self.package.relationships(sheet_part)?;
        let Some(drawing_part) = sheet_rels.get(drawing_id) else {
            log::debug!("drawing {} of {} has no target", drawing_id, sheet_part);
            return Ok(Vec::new());
        };
        let Some(xml) = self.package.read_part(drawing_part)? else {
            log::debug!("drawing part {} is missing", drawing_part);
            return Ok(Vec::new());
        };

        let anchors = parse_drawing(drawing_part, &xml)?;
        let media = self.package.relationships(drawing_part)?;

        let mut images = Vec::with_capacity(anchors.len());
        for anchor in anchors {
            let Some(target) = media.get(&anchor.embed) else {
                log::debug!("image {} in {} has no target", anchor.embed, drawing_part);
                continue;
            };
            let Some(data) = self.package.read_part(target)? else {
                log::debug!("media part {} is missing", target);
                continue;
            };
            images.push(Image::new(anchor.from, anchor.to, data, media_format(target)));
        }

        Ok(images)
    }
}

/// `xl/workbook.xml`からシート名とリレーションシップIdを順に取り出す
fn parse_sheet_list(xml: &[u8]) -> Result<Vec<(String, String)>, XlsxToHtmlError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.trim_text(true);

    let mut sheets = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| XlsxToHtmlError::xml(WORKBOOK_PART, e))?
        {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let name = attribute(WORKBOOK_PART, &e, b"name")?;
                let id = attribute(WORKBOOK_PART, &e, b"id")?;
                if let (Some(name), Some(id)) = (name, id) {
                    sheets.push((name, id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// セルの値を決定する
///
/// 共有文字列はインデックスのまま保持し、それ以外はcalamineの型付きの値を表示文字列にします。
/// calamineが値を持たない場合は`<v>`の内容をそのまま使います。
fn cell_value(raw: &RawCell, range: &Range<Data>) -> Result<Option<CellValue>, XlsxToHtmlError> {
    if raw.is_shared_string() {
        return match raw.raw.as_deref() {
            Some(index) => Ok(Some(CellValue::SharedString(index.trim().parse()?))),
            None => Ok(None),
        };
    }
    if raw.is_inline_string() {
        return Ok(raw.inline.clone().map(CellValue::InlineString));
    }

    let typed = range
        .get_value((raw.coord.row, raw.coord.col))
        .and_then(format_data);
    Ok(typed.or_else(|| raw.raw.clone()).map(CellValue::Literal))
}

/// calamineの値を表示文字列に変換
fn format_data(data: &Data) -> Option<String> {
    #[allow(unreachable_patterns)]
    match data {
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::String(s) => Some(s.clone()),
        Data::Bool(true) => Some("TRUE".to_string()),
        Data::Bool(false) => Some("FALSE".to_string()),
        Data::Error(e) => Some(e.to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Empty => None,
        _ => None,
    }
}

/// メディアパート名から形式タグを決定（拡張子の小文字、`wmf`は`emf`として扱う）
fn media_format(part: &str) -> String {
    let file = part.rsplit('/').next().unwrap_or(part);
    match file.rsplit_once('.') {
        Some((_, ext)) => match ext.to_ascii_lowercase().as_str() {
            "wmf" => "emf".to_string(),
            other => other.to_string(),
        },
        None => "bin".to_string(),
    }
}
