//! Profile Module
//!
//! `HtmlProfile`ごとのレンダリング設定を定義するモジュール。

use crate::api::HtmlProfile;
use crate::color::ColorNormalization;
use crate::marker::MarkerTable;

/// フラグメント出力のヘッダー
const FRAGMENT_HEADER: &str = "\n<table>\n    <tbody>\n";

/// フラグメント出力のフッター
const FRAGMENT_FOOTER: &str = "\n    </tbody>\n</table>\n";

/// ドキュメント出力のヘッダー（Bootstrap 4のテーブル）
const DOCUMENT_HEADER: &str = concat!(
    "<!doctype html>",
    "<html lang='en'>",
    "<head>",
    "<meta charset='utf-8'>",
    "<meta name='viewport' content='width=device-width, initial-scale=1, shrink-to-fit=no'>",
    "<link rel='stylesheet' href='https://stackpath.bootstrapcdn.com/bootstrap/4.4.1/css/bootstrap.min.css'>",
    "<script src='https://code.jquery.com/jquery-3.4.1.slim.min.js'></script>",
    "<script src='https://cdn.jsdelivr.net/npm/popper.js@1.16.0/dist/umd/popper.min.js'></script>",
    "<script src='https://stackpath.bootstrapcdn.com/bootstrap/4.4.1/js/bootstrap.min.js'></script>",
    "</head>",
    "<body>",
    "<table class='table table-bordered table-hover table-striped'>",
    "<thead></thead>",
    "<tbody>",
);

/// ドキュメント出力のフッター
const DOCUMENT_FOOTER: &str = concat!(
    "</tbody>",
    "</table>",
    "</body>",
    "</html>\n",
);

/// レンダラが参照する設定値
#[derive(Debug, Clone)]
pub(crate) struct ProfileSettings {
    /// 色の正規化ルール
    pub color: ColorNormalization,

    /// 改行の置換文字列
    pub line_break: &'static str,

    /// 改行直後の空白を`&nbsp;`にするか
    pub preserve_indent: bool,

    /// 塗りつぶし色を`background-color`として出力するか
    pub fill: bool,

    /// 画像を出力するか
    pub images: bool,

    /// 先頭行を`<th>`にするか
    pub header_row: bool,

    /// プレーンな値をセル既定の書式で装飾するか
    pub style_plain_values: bool,

    /// 書式プロパティのないランがセルの文字色を引き継ぐか
    pub run_color_fallback: bool,

    /// 欠落セルを`<td></td>`として出力するか
    pub absent_cell_as_empty: bool,

    /// セルのない行を省略するか
    pub skip_empty_rows: bool,

    /// 行・セルの終端に付ける改行
    pub newline: &'static str,

    pub header: &'static str,
    pub footer: &'static str,

    /// HTMLエスケープを行うか
    pub escape: bool,
}

impl ProfileSettings {
    pub fn for_profile(profile: HtmlProfile) -> Self {
        match profile {
            HtmlProfile::Fragment => Self {
                color: ColorNormalization::strict(),
                line_break: "<br>\n",
                preserve_indent: true,
                fill: true,
                images: true,
                header_row: false,
                style_plain_values: true,
                run_color_fallback: true,
                absent_cell_as_empty: true,
                skip_empty_rows: true,
                newline: "\n",
                header: FRAGMENT_HEADER,
                footer: FRAGMENT_FOOTER,
                escape: true,
            },
            HtmlProfile::Document => Self {
                color: ColorNormalization::lenient(),
                line_break: "<br>",
                preserve_indent: false,
                fill: false,
                images: false,
                header_row: true,
                style_plain_values: false,
                run_color_fallback: false,
                absent_cell_as_empty: false,
                skip_empty_rows: false,
                newline: "",
                header: DOCUMENT_HEADER,
                footer: DOCUMENT_FOOTER,
                escape: true,
            },
        }
    }
}

impl HtmlProfile {
    /// プロファイル既定のマーカーテーブル
    pub(crate) fn default_markers(self) -> MarkerTable {
        match self {
            HtmlProfile::Fragment => MarkerTable::extended(),
            HtmlProfile::Document => MarkerTable::compact(),
        }
    }
}
