//! Parser Module
//!
//! XLSXパッケージをデコードし、レンダラが読み取るワークシートのデータモデルを構築するモジュール。
//!
//! - calamine: シート一覧、セル結合範囲、リテラルセルの型付きキャッシュ値
//! - quick-xml: スタイル、共有文字列（リッチテキスト）、テーマ、シート構造、描画

mod drawing;
mod package;
mod shared_strings;
mod styles;
mod theme;
mod workbook;
mod worksheet;

pub(crate) use workbook::WorkbookParser;

use quick_xml::escape::unescape;
use quick_xml::events::BytesStart;

use crate::error::XlsxToHtmlError;

/// 要素の属性値を取得する（名前空間接頭辞は無視）
pub(crate) fn attribute(
    part: &str,
    element: &BytesStart<'_>,
    name: &[u8],
) -> Result<Option<String>, XlsxToHtmlError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| XlsxToHtmlError::xml(part, e))?;
        if attr.key.local_name().as_ref() == name {
            let raw = std::str::from_utf8(&attr.value)?;
            let value = unescape(raw).map_err(|e| XlsxToHtmlError::xml(part, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// 数値属性を取得する（存在しない、または解析できない場合は`None`）
pub(crate) fn numeric_attribute<T: std::str::FromStr>(
    part: &str,
    element: &BytesStart<'_>,
    name: &[u8],
) -> Result<Option<T>, XlsxToHtmlError> {
    Ok(attribute(part, element, name)?.and_then(|value| value.trim().parse().ok()))
}
