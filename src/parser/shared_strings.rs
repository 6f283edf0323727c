//! Shared Strings Parser Module
//!
//! `xl/sharedStrings.xml`から共有文字列テーブルを抽出するモジュール。
//! リッチテキストはランごとに書式プロパティ（`<rPr>`）を保持します。

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::styles::apply_font_property;
use crate::error::XlsxToHtmlError;
use crate::types::{FontStyle, Run, SharedString};

pub(crate) const PART: &str = "xl/sharedStrings.xml";

/// 解析中の文字列アイテム（`<si>`またはインライン文字列の`<is>`）の状態
#[derive(Default)]
pub(crate) struct StringItem {
    text: String,
    runs: Vec<Run>,
    run: Option<(String, Option<FontStyle>)>,
    in_run_properties: bool,
    in_text: bool,
    in_phonetic: bool,
}

impl StringItem {
    pub fn start(
        &mut self,
        part: &str,
        name: &[u8],
        element: &BytesStart<'_>,
    ) -> Result<(), XlsxToHtmlError> {
        match name {
            b"rPh" => self.in_phonetic = true,
            _ if self.in_phonetic => {}
            b"r" => self.run = Some((String::new(), None)),
            b"rPr" => {
                if let Some((_, font)) = self.run.as_mut() {
                    *font = Some(FontStyle::default());
                    self.in_run_properties = true;
                }
            }
            b"t" => self.in_text = true,
            _ => self.run_property(part, element)?,
        }
        Ok(())
    }

    pub fn empty(
        &mut self,
        part: &str,
        name: &[u8],
        element: &BytesStart<'_>,
    ) -> Result<(), XlsxToHtmlError> {
        match name {
            b"rPr" => {
                if let Some((_, font)) = self.run.as_mut() {
                    *font = Some(FontStyle::default());
                }
            }
            _ => self.run_property(part, element)?,
        }
        Ok(())
    }

    pub fn end(&mut self, name: &[u8]) {
        match name {
            b"rPh" => self.in_phonetic = false,
            b"t" => self.in_text = false,
            b"rPr" => self.in_run_properties = false,
            b"r" => {
                if let Some((text, font)) = self.run.take() {
                    self.runs.push(Run { text, font });
                }
            }
            _ => {}
        }
    }

    fn run_property(&mut self, part: &str, element: &BytesStart<'_>) -> Result<(), XlsxToHtmlError> {
        if self.in_run_properties {
            if let Some((_, Some(font))) = self.run.as_mut() {
                apply_font_property(part, font, element)?;
            }
        }
        Ok(())
    }

    pub fn push_text(&mut self, text: &str) {
        if !self.in_text {
            return;
        }
        match self.run.as_mut() {
            Some((run_text, _)) => run_text.push_str(text),
            None => self.text.push_str(text),
        }
    }

    pub fn finish(self) -> SharedString {
        if self.runs.is_empty() {
            SharedString::plain(self.text)
        } else {
            SharedString::rich(self.runs)
        }
    }
}

/// `xl/sharedStrings.xml`を解析する
///
/// `<t>`内の空白はそのまま保持し、ふりがな（`<rPh>`）は無視します。
pub(crate) fn parse_shared_strings(xml: &[u8]) -> Result<Vec<SharedString>, XlsxToHtmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);

    let mut entries = Vec::new();
    let mut entry: Option<StringItem> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| XlsxToHtmlError::xml(PART, e))?;

        match event {
            Event::Start(e) => {
                let name = e.local_name();
                if name.as_ref() == b"si" {
                    entry = Some(StringItem::default());
                } else if let Some(state) = entry.as_mut() {
                    state.start(PART, name.as_ref(), &e)?;
                }
            }
            Event::Empty(e) => {
                let name = e.local_name();
                if name.as_ref() == b"si" {
                    entries.push(SharedString::default());
                } else if let Some(state) = entry.as_mut() {
                    state.empty(PART, name.as_ref(), &e)?;
                }
            }
            Event::Text(e) => {
                if let Some(state) = entry.as_mut() {
                    let text = e.unescape().map_err(|err| XlsxToHtmlError::xml(PART, err))?;
                    state.push_text(&text);
                }
            }
            Event::CData(e) => {
                if let Some(state) = entry.as_mut() {
                    state.push_text(std::str::from_utf8(&e)?);
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                if name.as_ref() == b"si" {
                    if let Some(state) = entry.take() {
                        entries.push(state.finish());
                    }
                } else if let Some(state) = entry.as_mut() {
                    state.end(name.as_ref());
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}
