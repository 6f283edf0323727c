//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! デコーダ（`parser`）が生成し、レンダラが読み取るワークシートのデータモデルです。
//! レンダリング中はすべて不変として扱われます。

/// シートの最大行数（1,048,576行）
pub const MAX_ROWS: u32 = 1_048_576;

/// シートの最大列数（XFD列、16,384列）
pub const MAX_COLUMNS: u32 = 16_384;

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        let col_str = Self::col_index_to_letter(self.col);
        format!("{}{}", col_str, self.row + 1)
    }

    /// A1形式の文字列から座標を生成（例: "B3" -> (2, 1)）
    ///
    /// `$`による絶対参照記号は無視します。形式が不正な場合や、
    /// シートの範囲（XFD1048576）を超える場合は`None`を返します。
    pub fn from_a1_notation(reference: &str) -> Option<Self> {
        let reference = reference.replace('$', "");
        let split = reference.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = reference.split_at(split);

        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let mut col: u32 = 0;
        for ch in letters.chars() {
            let val = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
            col = col.checked_mul(26)?.checked_add(val)?;
        }

        let row: u32 = digits.parse().ok()?;
        if row == 0 || row > MAX_ROWS || col > MAX_COLUMNS {
            return None;
        }

        Some(Self::new(row - 1, col - 1))
    }

    /// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
    fn col_index_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            let remainder = col % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

/// セル範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl CellRange {
    /// 新しい範囲を生成
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        Self { start, end }
    }

    /// 指定された座標が範囲内にあるかを判定
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }

    /// 範囲のサイズ（行数 × 列数）を計算
    pub fn size(&self) -> (u32, u32) {
        let rows = self.end.row - self.start.row + 1;
        let cols = self.end.col - self.start.col + 1;
        (rows, cols)
    }
}

/// セル結合範囲の情報
///
/// 範囲同士は重ならないものとして扱います（スプレッドシート側の不変条件であり、再検証はしません）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRegion {
    /// 結合範囲
    pub range: CellRange,

    /// 親セル（左上セル）の座標
    pub parent: CellCoord,
}

impl MergedRegion {
    /// 新しい結合範囲を生成
    pub fn new(range: CellRange) -> Self {
        Self {
            parent: range.start,
            range,
        }
    }

    /// 行・列の開始/終了（いずれも含む）から結合範囲を生成
    pub fn from_bounds(row_start: u32, col_start: u32, row_end: u32, col_end: u32) -> Self {
        Self::new(CellRange::new(
            CellCoord::new(row_start, col_start),
            CellCoord::new(row_end, col_end),
        ))
    }

    /// 指定された座標が結合範囲内にあるかを判定
    pub fn contains(&self, coord: CellCoord) -> bool {
        self.range.contains(coord)
    }

    /// 結合セルの行数
    pub fn row_span(&self) -> u32 {
        self.range.end.row - self.range.start.row + 1
    }

    /// 結合セルの列数
    pub fn col_span(&self) -> u32 {
        self.range.end.col - self.range.start.col + 1
    }
}

/// 色の参照
///
/// リテラルのRGB/ARGB文字列か、テーマパレットのインデックスとティントの組のいずれかです。
#[derive(Debug, Clone, PartialEq)]
pub enum ColorRef {
    /// リテラルのRGB（6桁）またはARGB（8桁）16進文字列
    Literal(String),

    /// テーマカラー参照
    Theme {
        /// テーマパレットのインデックス（0: lt1, 1: dk1, 2: lt2, 3: dk2, 4-9: accent1-6, ...）
        index: u32,
        /// 明度の調整値（-1.0〜1.0、正で明るく、負で暗く）
        tint: f64,
    },
}

impl ColorRef {
    /// リテラル色を生成
    pub fn literal(rgb: impl Into<String>) -> Self {
        ColorRef::Literal(rgb.into())
    }

    /// テーマ色を生成
    pub fn theme(index: u32, tint: f64) -> Self {
        ColorRef::Theme { index, tint }
    }
}

/// 書式フラグの上書き指定
///
/// `None`は「指定なし（継承する）」、`Some(false)`は「明示的に無効」を意味します。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleOverrides {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strike: Option<bool>,
}

/// 実効的な書式フラグ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleFlags {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
}

impl StyleFlags {
    /// 上書き指定から実効フラグを生成（`None`は無効として扱う）
    pub fn from_overrides(overrides: &StyleOverrides) -> Self {
        Self {
            bold: overrides.bold.unwrap_or(false),
            italic: overrides.italic.unwrap_or(false),
            underline: overrides.underline.unwrap_or(false),
            strike: overrides.strike.unwrap_or(false),
        }
    }
}

/// フォント情報（セルの既定フォント、またはランの書式プロパティ）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontStyle {
    /// 太字・斜体・下線・取り消し線
    pub flags: StyleOverrides,

    /// 文字色
    pub color: Option<ColorRef>,
}

impl FontStyle {
    /// 文字色のみを持つフォントを生成
    pub fn with_color(color: ColorRef) -> Self {
        Self {
            flags: StyleOverrides::default(),
            color: Some(color),
        }
    }
}

/// リッチテキストのラン（書式付きテキスト断片）
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// テキスト内容
    pub text: String,

    /// ランの書式プロパティ（`<rPr>`が存在しない場合は`None`）
    pub font: Option<FontStyle>,
}

impl Run {
    /// 書式プロパティを持つランを生成
    pub fn new(text: impl Into<String>, font: FontStyle) -> Self {
        Self {
            text: text.into(),
            font: Some(font),
        }
    }

    /// 書式プロパティを持たないランを生成
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: None,
        }
    }
}

/// 共有文字列テーブルのエントリ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedString {
    /// 連結済みのプレーンテキスト
    pub text: String,

    /// リッチテキストのラン（プレーンな文字列の場合は空）
    pub runs: Vec<Run>,
}

impl SharedString {
    /// プレーンな文字列エントリを生成
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            runs: Vec::new(),
        }
    }

    /// ランからリッチテキストエントリを生成
    pub fn rich(runs: Vec<Run>) -> Self {
        let text = runs.iter().map(|r| r.text.as_str()).collect();
        Self { text, runs }
    }
}

/// セルの値
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 共有文字列テーブルへの参照（`t="s"`）
    SharedString(usize),

    /// インライン文字列（`t="inlineStr"`、ランを含む場合あり）
    InlineString(SharedString),

    /// リテラル値（数値・論理値・エラー値など、表示用の文字列）
    Literal(String),
}

/// ワークシートのセル
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// セル座標
    pub coord: CellCoord,

    /// セルの値（値コンテナが存在しない場合は`None`）
    pub value: Option<CellValue>,

    /// 解決済みのセルフォント
    pub font: Option<FontStyle>,

    /// 塗りつぶし色
    pub fill: Option<ColorRef>,
}

impl Cell {
    /// 書式なしのセルを生成
    pub fn new(coord: CellCoord, value: Option<CellValue>) -> Self {
        Self {
            coord,
            value,
            font: None,
            fill: None,
        }
    }

    /// フォントを設定
    pub fn with_font(mut self, font: FontStyle) -> Self {
        self.font = Some(font);
        self
    }

    /// 塗りつぶし色を設定
    pub fn with_fill(mut self, fill: ColorRef) -> Self {
        self.fill = Some(fill);
        self
    }
}

/// ワークシートの行（列インデックスで並んだスパースなセル列）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Option<Cell>>,
}

impl Row {
    /// セル列から行を生成
    pub fn new(cells: Vec<Option<Cell>>) -> Self {
        Self { cells }
    }
}

/// 埋め込み画像
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// 主アンカー（`from`）
    pub from: CellCoord,

    /// 副アンカー（2セルアンカーの`to`）
    pub to: Option<CellCoord>,

    /// 画像のバイナリ
    pub data: Vec<u8>,

    /// 形式タグ（拡張子、小文字）
    pub format: String,
}

impl Image {
    /// 新しい画像を生成
    pub fn new(from: CellCoord, to: Option<CellCoord>, data: Vec<u8>, format: impl Into<String>) -> Self {
        Self {
            from,
            to,
            data,
            format: format.into(),
        }
    }
}

/// テーマパレットの1スロット
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeColor {
    /// `srgbClr`の値
    pub rgb: Option<String>,

    /// `sysClr`の`lastClr`（`srgbClr`がない場合のフォールバック）
    pub system: Option<String>,
}

impl ThemeColor {
    /// RGB値を持つスロットを生成
    pub fn rgb(value: impl Into<String>) -> Self {
        Self {
            rgb: Some(value.into()),
            system: None,
        }
    }

    /// システムカラーのスロットを生成
    pub fn system(last_color: impl Into<String>) -> Self {
        Self {
            rgb: None,
            system: Some(last_color.into()),
        }
    }
}

/// テーマパレット
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemePalette {
    pub slots: Vec<ThemeColor>,
}

impl ThemePalette {
    /// スロット列からパレットを生成
    pub fn new(slots: Vec<ThemeColor>) -> Self {
        Self { slots }
    }

    /// インデックスでスロットを取得
    pub fn get(&self, index: u32) -> Option<&ThemeColor> {
        self.slots.get(index as usize)
    }
}

/// ワークブック全体で共有されるデータ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    /// テーマパレット
    pub theme: ThemePalette,

    /// 共有文字列テーブル
    pub shared_strings: Vec<SharedString>,
}

/// デコード済みのワークシート
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    /// シート名
    pub name: String,

    /// 行インデックスで並んだスパースな行列
    pub rows: Vec<Option<Row>>,

    /// セル結合範囲のリスト
    pub merged_regions: Vec<MergedRegion>,

    /// 埋め込み画像のリスト
    pub images: Vec<Image>,
}

impl Worksheet {
    /// 空のワークシートを生成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// 座標のセルを取得
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.rows
            .get(coord.row as usize)?
            .as_ref()?
            .cells
            .get(coord.col as usize)?
            .as_ref()
    }

    /// セルを配置する（行・列は必要に応じて拡張）
    pub fn put_cell(&mut self, cell: Cell) {
        let row_idx = cell.coord.row as usize;
        let col_idx = cell.coord.col as usize;

        if self.rows.len() <= row_idx {
            self.rows.resize(row_idx + 1, None);
        }
        let row = self.rows[row_idx].get_or_insert_with(Row::default);
        if row.cells.len() <= col_idx {
            row.cells.resize(col_idx + 1, None);
        }
        row.cells[col_idx] = Some(cell);
    }
}
