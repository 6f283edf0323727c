//! Worksheet Parser Module
//!
//! ワークシートXMLから行・セルの構造（座標、スタイル、型、生の値）と描画への参照を抽出するモジュール。
//! 値の表示文字列は`workbook`モジュールでcalamineのキャッシュ値と組み合わせて決定します。

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::shared_strings::StringItem;
use super::{attribute, numeric_attribute};
use crate::error::XlsxToHtmlError;
use crate::types::{CellCoord, SharedString, MAX_COLUMNS, MAX_ROWS};

/// セルの生データ
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawCell {
    pub coord: CellCoord,
    /// スタイルインデックス（`s`属性、既定は0）
    pub style: usize,
    /// 型（`t`属性）
    pub kind: Option<String>,
    /// `<v>`または`<is><t>`の内容（値コンテナがない場合は`None`）
    pub raw: Option<String>,
    /// インライン文字列（`<is>`）のラン
    pub inline: Option<SharedString>,
}

impl RawCell {
    /// 共有文字列を参照するセルか
    pub fn is_shared_string(&self) -> bool {
        self.kind.as_deref() == Some("s")
    }

    /// インライン文字列のセルか
    pub fn is_inline_string(&self) -> bool {
        self.kind.as_deref() == Some("inlineStr")
    }
}

/// ワークシートXMLの解析結果
#[derive(Debug, Clone, Default)]
pub(crate) struct SheetXml {
    /// 行インデックス（0始まり）とその行のセル
    pub rows: Vec<(u32, Vec<RawCell>)>,
    /// 描画パートへのリレーションシップId
    pub drawing: Option<String>,
}

/// 解析中の状態
#[derive(Default)]
struct SheetState {
    sheet: SheetXml,
    row: Option<(u32, Vec<RawCell>)>,
    cell: Option<RawCell>,
    inline: Option<StringItem>,
    next_row: u32,
    next_col: u32,
    in_value: bool,
}

impl SheetState {
    fn open_row(&mut self, part: &str, element: &BytesStart<'_>) -> Result<(), XlsxToHtmlError> {
        // `r`属性は1始まり。省略時は直前の行の次
        let index = match numeric_attribute::<u32>(part, element, b"r")? {
            Some(r) if r > 0 => r - 1,
            _ => self.next_row,
        };
        if index >= MAX_ROWS {
            return Err(XlsxToHtmlError::xml(
                part,
                format!("row {} exceeds the sheet limit of {} rows", index + 1, MAX_ROWS),
            ));
        }
        self.next_row = index + 1;
        self.next_col = 0;
        self.row = Some((index, Vec::new()));
        Ok(())
    }

    fn close_row(&mut self) {
        if let Some(row) = self.row.take() {
            self.sheet.rows.push(row);
        }
    }

    fn open_cell(&mut self, part: &str, element: &BytesStart<'_>) -> Result<(), XlsxToHtmlError> {
        let row = self.row.as_ref().map_or(self.next_row, |(index, _)| *index);
        let coord = match attribute(part, element, b"r")? {
            Some(r) => CellCoord::from_a1_notation(&r).ok_or_else(|| {
                XlsxToHtmlError::xml(part, format!("invalid cell reference '{}'", r))
            })?,
            None if self.next_col < MAX_COLUMNS => CellCoord::new(row, self.next_col),
            None => {
                return Err(XlsxToHtmlError::xml(
                    part,
                    format!("row {} exceeds the sheet limit of {} columns", row + 1, MAX_COLUMNS),
                ))
            }
        };
        self.next_col = coord.col + 1;

        self.cell = Some(RawCell {
            coord,
            style: numeric_attribute(part, element, b"s")?.unwrap_or(0),
            kind: attribute(part, element, b"t")?,
            raw: None,
            inline: None,
        });
        Ok(())
    }

    fn close_cell(&mut self) {
        if let (Some(cell), Some((_, cells))) = (self.cell.take(), self.row.as_mut()) {
            cells.push(cell);
        }
    }

    fn push_text(&mut self, text: &str) {
        if !self.in_value {
            return;
        }
        if let Some(cell) = self.cell.as_mut() {
            cell.raw.get_or_insert_with(String::new).push_str(text);
        }
    }
}

/// ワークシートXMLを解析する
pub(crate) fn parse_worksheet(part: &str, xml: &[u8]) -> Result<SheetXml, XlsxToHtmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);

    let mut state = SheetState::default();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| XlsxToHtmlError::xml(part, e))?;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => state.open_row(part, &e)?,
                b"c" => state.open_cell(part, &e)?,
                b"is" if state.cell.is_some() => state.inline = Some(StringItem::default()),
                name if state.inline.is_some() => {
                    if let Some(item) = state.inline.as_mut() {
                        item.start(part, name, &e)?;
                    }
                    if name == b"t" {
                        state.in_value = true;
                        if let Some(cell) = state.cell.as_mut() {
                            cell.raw.get_or_insert_with(String::new);
                        }
                    }
                }
                b"v" | b"t" if state.cell.is_some() => {
                    state.in_value = true;
                    // 空文字列の値も「値あり」として扱う
                    if let Some(cell) = state.cell.as_mut() {
                        cell.raw.get_or_insert_with(String::new);
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    state.open_row(part, &e)?;
                    state.close_row();
                }
                b"c" => {
                    state.open_cell(part, &e)?;
                    state.close_cell();
                }
                b"drawing" => state.sheet.drawing = attribute(part, &e, b"id")?,
                name => {
                    if let Some(item) = state.inline.as_mut() {
                        item.empty(part, name, &e)?;
                    }
                }
            },
            Event::Text(e) => {
                if state.in_value {
                    let text = e.unescape().map_err(|err| XlsxToHtmlError::xml(part, err))?;
                    if let Some(item) = state.inline.as_mut() {
                        item.push_text(&text);
                    }
                    state.push_text(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"row" => state.close_row(),
                b"c" => {
                    state.inline = None;
                    state.close_cell();
                }
                b"is" => {
                    if let (Some(item), Some(cell)) = (state.inline.take(), state.cell.as_mut()) {
                        cell.inline = Some(item.finish());
                    }
                }
                name if state.inline.is_some() => {
                    if let Some(item) = state.inline.as_mut() {
                        item.end(name);
                    }
                    if name == b"t" {
                        state.in_value = false;
                    }
                }
                b"v" | b"t" => state.in_value = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(state.sheet)
}
