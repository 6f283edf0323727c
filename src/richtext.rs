//! Rich Text Module
//!
//! セルの値（プレーン文字列・リテラル・リッチテキスト）をHTML断片に変換するモジュール。
//!
//! # 書式の継承
//!
//! ランの実効フラグは「ランの指定があればそれ、なければセルの既定」です。
//! ランが明示的に指定したフラグ（`false`を含む）は、同じセル内の以降のランでは
//! セルの既定から外れます。この状態はランの列に対する畳み込みで表現します。

use crate::color::ColorResolver;
use crate::marker::MarkerClassifier;
use crate::profile::ProfileSettings;
use crate::types::{
    Cell, CellValue, ColorRef, FontStyle, Run, SharedString, StyleFlags, StyleOverrides, Workbook,
};

/// セル内で引き継がれる既定の書式フラグ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StyleDefaults(StyleFlags);

impl StyleDefaults {
    /// セルのフォントから既定値を生成
    pub fn from_font(font: Option<&FontStyle>) -> Self {
        Self(
            font.map(|f| StyleFlags::from_overrides(&f.flags))
                .unwrap_or_default(),
        )
    }

    /// ランの指定を適用した実効フラグ
    pub fn effective(self, overrides: &StyleOverrides) -> StyleFlags {
        StyleFlags {
            bold: overrides.bold.unwrap_or(self.0.bold),
            italic: overrides.italic.unwrap_or(self.0.italic),
            underline: overrides.underline.unwrap_or(self.0.underline),
            strike: overrides.strike.unwrap_or(self.0.strike),
        }
    }

    /// ランを描画した後の既定値（明示指定されたフラグは外れる）
    pub fn after(self, overrides: &StyleOverrides) -> Self {
        Self(StyleFlags {
            bold: self.0.bold && overrides.bold.is_none(),
            italic: self.0.italic && overrides.italic.is_none(),
            underline: self.0.underline && overrides.underline.is_none(),
            strike: self.0.strike && overrides.strike.is_none(),
        })
    }

    pub fn flags(self) -> StyleFlags {
        self.0
    }
}

/// HTMLの特殊文字をエスケープ
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// 書式タグ（開く順）
fn style_tags(flags: StyleFlags) -> Vec<&'static str> {
    [
        (flags.bold, "b"),
        (flags.italic, "i"),
        (flags.underline, "u"),
        (flags.strike, "strike"),
    ]
    .into_iter()
    .filter_map(|(on, tag)| on.then_some(tag))
    .collect()
}

/// セル値のHTMLレンダラ
pub(crate) struct RichTextRenderer<'a> {
    workbook: &'a Workbook,
    settings: &'a ProfileSettings,
    colors: ColorResolver<'a>,
}

impl<'a> RichTextRenderer<'a> {
    pub fn new(workbook: &'a Workbook, settings: &'a ProfileSettings) -> Self {
        Self {
            workbook,
            settings,
            colors: ColorResolver::new(&workbook.theme, &settings.color),
        }
    }

    /// 色参照を解決する（塗りつぶし色の判定にも使用）
    pub fn resolve_color(&self, color: Option<&ColorRef>) -> Option<String> {
        self.colors.resolve(color)
    }

    /// セルの値をHTML断片に変換する
    ///
    /// 値コンテナがない、または共有文字列の参照先が存在しない場合は空文字列です。
    pub fn render(&self, cell: &Cell, markers: &mut MarkerClassifier<'_>) -> String {
        let font = cell.font.as_ref();
        let cell_color = font.and_then(|f| f.color.as_ref());
        let defaults = StyleDefaults::from_font(font);

        let html = match &cell.value {
            None => return String::new(),
            Some(CellValue::Literal(text)) => {
                if self.settings.style_plain_values {
                    self.run_to_html(text, cell_color, defaults.flags(), markers)
                } else {
                    self.text(text)
                }
            }
            Some(CellValue::SharedString(index)) => match self.workbook.shared_strings.get(*index) {
                None => {
                    log::debug!(
                        "shared string {} out of range at {}",
                        index,
                        cell.coord.to_a1_notation()
                    );
                    return String::new();
                }
                Some(entry) => self.string_to_html(entry, cell_color, defaults, markers),
            },
            Some(CellValue::InlineString(entry)) => {
                self.string_to_html(entry, cell_color, defaults, markers)
            }
        };

        self.break_lines(&html)
    }

    /// 文字列アイテム（共有文字列・インライン文字列）を描画する
    fn string_to_html(
        &self,
        entry: &SharedString,
        cell_color: Option<&ColorRef>,
        defaults: StyleDefaults,
        markers: &mut MarkerClassifier<'_>,
    ) -> String {
        if !entry.runs.is_empty() {
            return self.runs_to_html(&entry.runs, cell_color, defaults, markers);
        }

        let flags = if self.settings.style_plain_values {
            defaults.flags()
        } else {
            StyleFlags::default()
        };
        self.run_to_html(&entry.text, cell_color, flags, markers)
    }

    /// リッチテキストのランを順に描画する
    fn runs_to_html(
        &self,
        runs: &[Run],
        cell_color: Option<&ColorRef>,
        defaults: StyleDefaults,
        markers: &mut MarkerClassifier<'_>,
    ) -> String {
        let (html, _) = runs
            .iter()
            .fold((String::new(), defaults), |(mut html, defaults), run| {
                let overrides = run.font.as_ref().map(|f| f.flags).unwrap_or_default();
                let color = match &run.font {
                    Some(font) => font.color.as_ref(),
                    None if self.settings.run_color_fallback => cell_color,
                    None => None,
                };

                html.push_str(&self.run_to_html(
                    &run.text,
                    color,
                    defaults.effective(&overrides),
                    markers,
                ));
                (html, defaults.after(&overrides))
            });

        html
    }

    /// 1つのランを書式タグとマーカーで包む
    ///
    /// 書式タグは b, i, u, strike の順に開き、逆順に閉じます。マーカーはテキストのみを包みます。
    fn run_to_html(
        &self,
        text: &str,
        color: Option<&ColorRef>,
        flags: StyleFlags,
        markers: &mut MarkerClassifier<'_>,
    ) -> String {
        let text = self.text(text);
        let rgb = self.colors.resolve(color);

        let body = match markers.classify(rgb.as_deref()) {
            Some(class) => format!("<mark class='{}'>{}</mark>", class, text),
            None => text,
        };

        let tags = style_tags(flags);
        let mut html = String::with_capacity(body.len() + tags.len() * 9);
        for tag in &tags {
            html.push('<');
            html.push_str(tag);
            html.push('>');
        }
        html.push_str(&body);
        for tag in tags.iter().rev() {
            html.push_str("</");
            html.push_str(tag);
            html.push('>');
        }
        html
    }

    fn text(&self, text: &str) -> String {
        if self.settings.escape {
            escape_html(text)
        } else {
            text.to_string()
        }
    }

    /// 改行を改行タグに置き換え、改行直後の空白を`&nbsp;`にする
    fn break_lines(&self, html: &str) -> String {
        if !html.contains('\n') {
            return html.to_string();
        }

        let mut out = String::with_capacity(html.len() + 16);
        let mut chars = html.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != '\n' {
                out.push(ch);
                continue;
            }

            out.push_str(self.settings.line_break);
            if self.settings.preserve_indent {
                while chars.next_if_eq(&' ').is_some() {
                    out.push_str("&nbsp;");
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HtmlProfile;
    use crate::marker::MarkerTable;
    use crate::types::{CellCoord, SharedString};

    fn bold() -> StyleOverrides {
        StyleOverrides {
            bold: Some(true),
            ..StyleOverrides::default()
        }
    }

    fn not_bold() -> StyleOverrides {
        StyleOverrides {
            bold: Some(false),
            ..StyleOverrides::default()
        }
    }

    fn font(flags: StyleOverrides, color: Option<ColorRef>) -> FontStyle {
        FontStyle { flags, color }
    }

    fn workbook_with(entries: Vec<SharedString>) -> Workbook {
        Workbook {
            shared_strings: entries,
            ..Workbook::default()
        }
    }

    fn shared_cell(index: usize) -> Cell {
        Cell::new(CellCoord::new(0, 0), Some(CellValue::SharedString(index)))
    }

    fn render(workbook: &Workbook, profile: HtmlProfile, cell: &Cell) -> (String, Vec<String>) {
        let settings = ProfileSettings::for_profile(profile);
        let table = profile.default_markers();
        let renderer = RichTextRenderer::new(workbook, &settings);
        let mut markers = MarkerClassifier::new(&table);
        let html = renderer.render(cell, &mut markers);
        (html, markers.into_unmapped())
    }

    #[test]
    fn test_defaults_fold_clears_explicit_overrides() {
        let defaults = StyleDefaults(StyleFlags {
            bold: true,
            italic: true,
            ..StyleFlags::default()
        });

        // 指定なしのランは既定を引き継ぐ
        assert!(defaults.effective(&StyleOverrides::default()).bold);
        let defaults = defaults.after(&StyleOverrides::default());
        assert!(defaults.flags().bold);

        // 明示的な false は既定を外す
        assert!(!defaults.effective(&not_bold()).bold);
        let defaults = defaults.after(&not_bold());
        assert!(!defaults.flags().bold);
        assert!(defaults.flags().italic);
    }

    #[test]
    fn test_explicit_false_is_not_regressed_by_later_runs() {
        let workbook = workbook_with(vec![SharedString::rich(vec![
            Run::plain("a"),
            Run::new("b", font(not_bold(), None)),
            Run::plain("c"),
        ])]);
        let cell = shared_cell(0).with_font(font(bold(), None));

        let (html, _) = render(&workbook, HtmlProfile::Fragment, &cell);
        assert_eq!(html, "<b>a</b>bc");
    }

    #[test]
    fn test_explicit_true_also_clears_default() {
        let workbook = workbook_with(vec![SharedString::rich(vec![
            Run::new("a", font(bold(), None)),
            Run::new("b", FontStyle::default()),
        ])]);
        let cell = shared_cell(0).with_font(font(bold(), None));

        let (html, _) = render(&workbook, HtmlProfile::Fragment, &cell);
        // 2つ目のランは太字指定を持たないので、外れた既定は戻らない
        assert_eq!(html, "<b>a</b>b");

        // 明示指定がなければ、すべてのランが既定を引き継ぐ
        let workbook = workbook_with(vec![SharedString::rich(vec![
            Run::plain("a"),
            Run::new("b", FontStyle::default()),
        ])]);
        let (html, _) = render(&workbook, HtmlProfile::Fragment, &cell);
        assert_eq!(html, "<b>a</b><b>b</b>");
    }

    #[test]
    fn test_tags_nest_and_marker_wraps_text_only() {
        let flags = StyleOverrides {
            bold: Some(true),
            italic: Some(true),
            underline: Some(true),
            strike: Some(true),
        };
        let workbook = workbook_with(vec![SharedString::rich(vec![Run::new(
            "x",
            font(flags, Some(ColorRef::literal("FFFF0000"))),
        )])]);

        let (html, unmapped) = render(&workbook, HtmlProfile::Fragment, &shared_cell(0));
        assert_eq!(
            html,
            "<b><i><u><strike><mark class='marker-red'>x</mark></strike></u></i></b>"
        );
        assert!(unmapped.is_empty());
    }

    #[test]
    fn test_run_without_properties_uses_cell_color_in_fragment() {
        let workbook = workbook_with(vec![SharedString::rich(vec![
            Run::plain("a"),
            Run::new("b", FontStyle::default()),
        ])]);
        let cell = shared_cell(0).with_font(FontStyle::with_color(ColorRef::literal("00B050")));

        let (html, _) = render(&workbook, HtmlProfile::Fragment, &cell);
        assert_eq!(html, "<mark class='marker-green'>a</mark>b");

        let (html, _) = render(&workbook, HtmlProfile::Document, &cell);
        assert_eq!(html, "ab");
    }

    #[test]
    fn test_plain_value_renders_as_single_default_run() {
        let workbook = workbook_with(vec![SharedString::plain("Hello")]);
        let cell = shared_cell(0).with_font(font(bold(), Some(ColorRef::literal("FF0000"))));

        let (html, _) = render(&workbook, HtmlProfile::Fragment, &cell);
        assert_eq!(html, "<b><mark class='marker-red'>Hello</mark></b>");

        // ドキュメント出力ではマーカーのみ
        let (html, _) = render(&workbook, HtmlProfile::Document, &cell);
        assert_eq!(html, "<mark class='marker-red'>Hello</mark>");
    }

    #[test]
    fn test_inline_string_keeps_runs() {
        let inline = SharedString::rich(vec![
            Run::new("Bold", font(bold(), None)),
            Run::new(" red", font(not_bold(), Some(ColorRef::literal("FFFF0000")))),
        ]);
        let cell = Cell::new(CellCoord::new(0, 0), Some(CellValue::InlineString(inline)));

        let (html, _) = render(&Workbook::default(), HtmlProfile::Fragment, &cell);
        assert_eq!(html, "<b>Bold</b><mark class='marker-red'> red</mark>");

        let plain = Cell::new(
            CellCoord::new(0, 0),
            Some(CellValue::InlineString(SharedString::plain("Hello"))),
        )
        .with_font(FontStyle::with_color(ColorRef::literal("FF0000")));
        let (html, _) = render(&Workbook::default(), HtmlProfile::Document, &plain);
        assert_eq!(html, "<mark class='marker-red'>Hello</mark>");
    }

    #[test]
    fn test_render_is_idempotent() {
        let workbook = workbook_with(vec![SharedString::plain("same")]);
        let cell = shared_cell(0).with_font(font(bold(), None));

        let first = render(&workbook, HtmlProfile::Fragment, &cell);
        let second = render(&workbook, HtmlProfile::Fragment, &cell);
        assert_eq!(first, second);
    }

    #[test]
    fn test_literal_values() {
        let workbook = Workbook::default();
        let cell = Cell::new(CellCoord::new(0, 0), Some(CellValue::Literal("3.5".to_string())))
            .with_font(font(bold(), None));

        let (html, _) = render(&workbook, HtmlProfile::Fragment, &cell);
        assert_eq!(html, "<b>3.5</b>");

        let (html, _) = render(&workbook, HtmlProfile::Document, &cell);
        assert_eq!(html, "3.5");
    }

    #[test]
    fn test_empty_and_dangling_values() {
        let workbook = Workbook::default();

        let (html, _) = render(&workbook, HtmlProfile::Fragment, &Cell::new(CellCoord::new(0, 0), None));
        assert_eq!(html, "");

        let (html, _) = render(&workbook, HtmlProfile::Fragment, &shared_cell(7));
        assert_eq!(html, "");
    }

    #[test]
    fn test_unmapped_color_is_reported() {
        let workbook = workbook_with(vec![SharedString::plain("x")]);
        let cell = shared_cell(0).with_font(FontStyle::with_color(ColorRef::literal("123456")));

        let (html, unmapped) = render(&workbook, HtmlProfile::Fragment, &cell);
        assert_eq!(html, "x");
        assert_eq!(unmapped, vec!["123456"]);
    }

    #[test]
    fn test_newlines_and_leading_spaces() {
        let workbook = workbook_with(vec![SharedString::plain("a\n  b\nc")]);

        let (html, _) = render(&workbook, HtmlProfile::Fragment, &shared_cell(0));
        assert_eq!(html, "a<br>\n&nbsp;&nbsp;b<br>\nc");

        let (html, _) = render(&workbook, HtmlProfile::Document, &shared_cell(0));
        assert_eq!(html, "a<br>  b<br>c");
    }

    #[test]
    fn test_escaping_can_be_disabled() {
        let workbook = workbook_with(vec![SharedString::plain("<i>&</i>")]);
        let mut settings = ProfileSettings::for_profile(HtmlProfile::Fragment);
        let table = MarkerTable::extended();

        let renderer = RichTextRenderer::new(&workbook, &settings);
        let mut markers = MarkerClassifier::new(&table);
        assert_eq!(
            renderer.render(&shared_cell(0), &mut markers),
            "&lt;i&gt;&amp;&lt;/i&gt;"
        );

        settings.escape = false;
        let renderer = RichTextRenderer::new(&workbook, &settings);
        assert_eq!(renderer.render(&shared_cell(0), &mut markers), "<i>&</i>");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("\"'"), "&quot;&#39;");
        assert_eq!(escape_html("日本語"), "日本語");
    }
}
