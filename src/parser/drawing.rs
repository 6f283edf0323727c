//! Drawing Parser Module
//!
//! 描画パート（`xl/drawings/drawingN.xml`）から画像のアンカーと埋め込み参照を抽出するモジュール。

use quick_xml::events::Event;
use quick_xml::Reader;

use super::attribute;
use crate::error::XlsxToHtmlError;
use crate::types::CellCoord;

/// 画像のアンカー
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PictureAnchor {
    pub from: CellCoord,
    /// 2セルアンカーの場合のみ
    pub to: Option<CellCoord>,
    /// 画像へのリレーションシップId（`a:blip r:embed`）
    pub embed: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    From,
    To,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Row,
    Col,
}

/// 解析中のアンカー
#[derive(Default)]
struct AnchorState {
    two_cell: bool,
    from: (Option<u32>, Option<u32>),
    to: (Option<u32>, Option<u32>),
    embed: Option<String>,
}

impl AnchorState {
    fn finish(self) -> Option<PictureAnchor> {
        let (Some(row), Some(col)) = self.from else {
            return None;
        };
        let to = match (self.two_cell, self.to) {
            (true, (Some(row), Some(col))) => Some(CellCoord::new(row, col)),
            _ => None,
        };

        Some(PictureAnchor {
            from: CellCoord::new(row, col),
            to,
            embed: self.embed?,
        })
    }
}

/// 描画XMLを解析し、画像のアンカーを出現順に返す
///
/// セルに固定されない`absoluteAnchor`や、画像を持たない図形・グラフは無視します。
pub(crate) fn parse_drawing(part: &str, xml: &[u8]) -> Result<Vec<PictureAnchor>, XlsxToHtmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut anchors = Vec::new();
    let mut anchor: Option<AnchorState> = None;
    let mut marker: Option<Marker> = None;
    let mut field: Option<Field> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| XlsxToHtmlError::xml(part, e))?;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"twoCellAnchor" => {
                    anchor = Some(AnchorState {
                        two_cell: true,
                        ..AnchorState::default()
                    })
                }
                b"oneCellAnchor" => anchor = Some(AnchorState::default()),
                b"from" if anchor.is_some() => marker = Some(Marker::From),
                b"to" if anchor.is_some() => marker = Some(Marker::To),
                b"row" if marker.is_some() => field = Some(Field::Row),
                b"col" if marker.is_some() => field = Some(Field::Col),
                b"blip" => {
                    if let Some(state) = anchor.as_mut() {
                        state.embed = attribute(part, &e, b"embed")?;
                    }
                }
                _ => {}
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"blip" {
                    if let Some(state) = anchor.as_mut() {
                        state.embed = attribute(part, &e, b"embed")?;
                    }
                }
            }
            Event::Text(e) => {
                if let (Some(state), Some(marker), Some(field)) = (anchor.as_mut(), marker, field) {
                    let text = e.unescape().map_err(|err| XlsxToHtmlError::xml(part, err))?;
                    let value = text.trim().parse::<u32>().ok();
                    let target = match marker {
                        Marker::From => &mut state.from,
                        Marker::To => &mut state.to,
                    };
                    match field {
                        Field::Row => target.0 = value,
                        Field::Col => target.1 = value,
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"twoCellAnchor" | b"oneCellAnchor" => {
                    if let Some(found) = anchor.take().and_then(AnchorState::finish) {
                        anchors.push(found);
                    }
                }
                b"from" | b"to" => marker = None,
                b"row" | b"col" => field = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(anchors)
}
