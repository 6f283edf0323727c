//! Theme Parser Module
//!
//! `xl/theme/theme1.xml`のカラースキームをテーマパレットに変換するモジュール。

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::attribute;
use crate::error::XlsxToHtmlError;
use crate::types::{ThemeColor, ThemePalette};

pub(crate) const PART: &str = "xl/theme/theme1.xml";

/// セルの色参照が使うテーマインデックスの順序
///
/// カラースキーム内の要素順（dk1, lt1, dk2, lt2, ...）とは異なり、明暗の組が入れ替わります。
const SLOT_ORDER: [&[u8]; 12] = [
    b"lt1", b"dk1", b"lt2", b"dk2", b"accent1", b"accent2", b"accent3", b"accent4", b"accent5",
    b"accent6", b"hlink", b"folHlink",
];

fn slot_index(name: &[u8]) -> Option<usize> {
    SLOT_ORDER.iter().position(|slot| *slot == name)
}

/// テーマXMLを解析する
pub(crate) fn parse_theme(xml: &[u8]) -> Result<ThemePalette, XlsxToHtmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut slots = vec![ThemeColor::default(); SLOT_ORDER.len()];
    let mut in_scheme = false;
    let mut current: Option<usize> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| XlsxToHtmlError::xml(PART, e))?;

        match event {
            Event::Start(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"clrScheme" => in_scheme = true,
                    other if in_scheme && current.is_none() => current = slot_index(other),
                    _ => apply_color(&mut slots, current, &e)?,
                }
            }
            Event::Empty(e) => apply_color(&mut slots, current, &e)?,
            Event::End(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"clrScheme" => in_scheme = false,
                    other if current.is_some() && slot_index(other) == current => current = None,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(ThemePalette::new(slots))
}

fn apply_color(
    slots: &mut [ThemeColor],
    current: Option<usize>,
    element: &BytesStart<'_>,
) -> Result<(), XlsxToHtmlError> {
    let Some(slot) = current.and_then(|index| slots.get_mut(index)) else {
        return Ok(());
    };

    match element.local_name().as_ref() {
        b"srgbClr" => slot.rgb = attribute(PART, element, b"val")?,
        b"sysClr" => slot.system = attribute(PART, element, b"lastClr")?,
        _ => {}
    }
    Ok(())
}
