//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::PathBuf;

use crate::api::{HtmlProfile, ImageFailurePolicy, SheetSelector};
use crate::error::XlsxToHtmlError;
use crate::image::ImageStore;
use crate::marker::MarkerTable;
use crate::parser::WorkbookParser;
use crate::profile::ProfileSettings;
use crate::render::TableRenderer;
use crate::types::{Workbook, Worksheet};

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 出力形式
    pub profile: HtmlProfile,

    /// マーカーテーブル（`None`の場合はプロファイル既定）
    pub marker_table: Option<MarkerTable>,

    /// セル値をHTMLエスケープするか
    pub escape_html: bool,

    /// 画像の書き出し先ディレクトリ
    pub image_dir: PathBuf,

    /// `<img>`の表示幅（px）
    pub image_width: u32,

    /// EMF/WMFをSVGに変換する外部コマンド
    pub image_converter: Option<PathBuf>,

    /// 画像変換に失敗した場合の方針
    pub image_failure_policy: ImageFailurePolicy,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::default(),
            profile: HtmlProfile::default(),
            marker_table: None,
            escape_html: true,
            image_dir: PathBuf::from("."),
            image_width: 300,
            image_converter: Some(PathBuf::from("inkscape")),
            image_failure_policy: ImageFailurePolicy::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxhtml::{ConverterBuilder, HtmlProfile, SheetSelector};
///
/// # fn main() -> Result<(), xlsxhtml::XlsxToHtmlError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::Index(0))
///     .with_profile(HtmlProfile::Document)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: 最初のシート
    /// - 出力形式: `HtmlProfile::Fragment`
    /// - HTMLエスケープ: 有効
    /// - 画像: カレントディレクトリに幅300pxで書き出し、`inkscape`で変換
    /// - 画像変換の失敗: 中断
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 変換対象のシートを選択する
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxhtml::{ConverterBuilder, SheetSelector};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name("Sheet1".to_string()));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 出力形式を指定する
    pub fn with_profile(mut self, profile: HtmlProfile) -> Self {
        self.config.profile = profile;
        self
    }

    /// マーカーテーブルを差し替える
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxhtml::{ConverterBuilder, MarkerTable};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_marker_table(MarkerTable::compact().with_marker("123456", "marker-custom"));
    /// ```
    pub fn with_marker_table(mut self, table: MarkerTable) -> Self {
        self.config.marker_table = Some(table);
        self
    }

    /// セル値をHTMLエスケープするかを指定する
    ///
    /// * `true`: `<`, `>`, `&`, `'`, `"`をエスケープ（デフォルト）
    /// * `false`: セル値をそのままHTMLとして出力
    pub fn escape_html(mut self, escape: bool) -> Self {
        self.config.escape_html = escape;
        self
    }

    /// 画像の書き出し先ディレクトリを指定する
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.image_dir = dir.into();
        self
    }

    /// `<img>`の表示幅（px）を指定する
    pub fn with_image_width(mut self, width: u32) -> Self {
        self.config.image_width = width;
        self
    }

    /// EMF/WMFの変換に使用する外部コマンドを指定する
    ///
    /// `None`の場合は変換せず、元の形式のまま書き出します。
    pub fn with_image_converter(mut self, converter: Option<PathBuf>) -> Self {
        self.config.image_converter = converter;
        self
    }

    /// 画像変換に失敗した場合の方針を指定する
    pub fn with_image_failure_policy(mut self, policy: ImageFailurePolicy) -> Self {
        self.config.image_failure_policy = policy;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Converter)`: 設定が有効な場合
    /// * `Err(XlsxToHtmlError::Config)`: 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * 画像の表示幅が0
    /// * 画像の書き出し先ディレクトリが空
    /// * シート名による指定で、名前が空
    pub fn build(self) -> Result<Converter, XlsxToHtmlError> {
        if self.config.image_width == 0 {
            return Err(XlsxToHtmlError::Config(
                "Image width must be greater than 0".to_string(),
            ));
        }

        if self.config.image_dir.as_os_str().is_empty() {
            return Err(XlsxToHtmlError::Config(
                "Image directory must not be empty".to_string(),
            ));
        }

        if let SheetSelector::Name(ref name) = self.config.sheet_selector {
            if name.is_empty() {
                return Err(XlsxToHtmlError::Config(
                    "Sheet name must not be empty".to_string(),
                ));
            }
        }

        Ok(Converter::new(self.config))
    }
}

/// 1枚のシートのレンダリング結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedSheet {
    /// HTML
    pub html: String,

    /// マーカーに分類できなかった色（出現ごと、出現順）
    pub unmapped_colors: Vec<String>,

    /// 書き出した画像ファイルのパス（出現順）
    pub images: Vec<PathBuf>,
}

/// 変換処理のファサード
///
/// ExcelファイルのワークシートをHTMLテーブルに変換するためのメインエントリーポイントです。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxhtml::ConverterBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), xlsxhtml::XlsxToHtmlError> {
/// let converter = ConverterBuilder::new().build()?;
/// let input = File::open("example.xlsx")?;
/// let output = File::create("output.html")?;
/// converter.convert(input, output)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,

    /// プロファイルから決まる振る舞い
    settings: ProfileSettings,

    /// 使用するマーカーテーブル
    markers: MarkerTable,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        let mut settings = ProfileSettings::for_profile(config.profile);
        settings.escape = config.escape_html;
        let markers = config
            .marker_table
            .clone()
            .unwrap_or_else(|| config.profile.default_markers());

        Self {
            config,
            settings,
            markers,
        }
    }

    /// デコード済みのワークシートをレンダリングする
    ///
    /// Excelファイルを経由せずに、組み立てたデータモデルを直接HTMLにする場合に使用します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(RenderedSheet)` - HTML、未分類の色、書き出した画像
    /// * `Err(XlsxToHtmlError)` - 画像の書き出しまたは変換に失敗した場合
    pub fn render_sheet(
        &self,
        workbook: &Workbook,
        sheet: &Worksheet,
    ) -> Result<RenderedSheet, XlsxToHtmlError> {
        let mut store = if self.settings.images {
            if !sheet.images.is_empty() {
                fs::create_dir_all(&self.config.image_dir)?;
            }
            Some(ImageStore::new(
                self.config.image_dir.clone(),
                self.config.image_width,
                self.config.image_converter.clone(),
                self.config.image_failure_policy,
            ))
        } else {
            None
        };

        let renderer = TableRenderer::new(workbook, &self.settings, &self.markers);
        let mut buffer = Vec::new();
        let unmapped_colors = renderer.render(sheet, store.as_mut(), &mut buffer)?;

        let html = String::from_utf8(buffer).map_err(|e| {
            XlsxToHtmlError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        Ok(RenderedSheet {
            html,
            unmapped_colors,
            images: store.map(ImageStore::into_written).unwrap_or_default(),
        })
    }

    /// Excelファイルを読み込み、選択されたシートをレンダリングする
    ///
    /// # 処理フロー
    ///
    /// 1. WorkbookParserの初期化（共有文字列、スタイル、テーマ）
    /// 2. シート選択
    /// 3. シートのデコード（セル、結合範囲、画像）
    /// 4. レンダリング
    pub fn render<R: Read + Seek>(&self, input: R) -> Result<RenderedSheet, XlsxToHtmlError> {
        let mut parser = WorkbookParser::open(input)?;
        let sheet_name = parser.select_sheet(&self.config.sheet_selector)?;
        let sheet = parser.decode_sheet(&sheet_name)?;

        self.render_sheet(parser.workbook(), &sheet)
    }

    /// ExcelファイルをHTMLに変換
    ///
    /// # 引数
    ///
    /// * `input` - Excelファイルを読み込むためのリーダー（Read + Seekトレイトを実装）
    /// * `output` - HTML出力先のライター（Writeトレイトを実装）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxhtml::ConverterBuilder;
    /// use std::io::Cursor;
    ///
    /// # fn main() -> Result<(), xlsxhtml::XlsxToHtmlError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let excel_data: Vec<u8> = vec![]; // Excelファイルのバイト列
    /// let mut html = Vec::new();
    /// converter.convert(Cursor::new(excel_data), &mut html)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert<R: Read + Seek, W: Write>(
        &self,
        input: R,
        output: W,
    ) -> Result<(), XlsxToHtmlError> {
        let rendered = self.render(input)?;

        let mut writer = BufWriter::new(output);
        writer.write_all(rendered.html.as_bytes())?;
        writer.flush()?;

        Ok(())
    }

    /// ExcelファイルをHTML文字列に変換
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use std::fs::File;
    /// use xlsxhtml::ConverterBuilder;
    ///
    /// # fn main() -> Result<(), xlsxhtml::XlsxToHtmlError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let input = File::open("example.xlsx")?;
    /// let html = converter.convert_to_string(input)?;
    /// println!("{}", html);
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert_to_string<R: Read + Seek>(&self, input: R) -> Result<String, XlsxToHtmlError> {
        Ok(self.render(input)?.html)
    }
}
