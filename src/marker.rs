//! Marker Module
//!
//! 正規化済みのRGB文字列を意味的なマーカークラス（`marker-red`など）に分類するモジュール。
//!
//! マーカーテーブルは実際の文書で観測された色の列挙であり、色距離による近似は行いません。
//! テーブルは変更不可の設定データとして`MarkerClassifier`に注入されます。

use indexmap::IndexMap;

/// 拡張マーカーテーブル（フラグメント出力の既定）
const EXTENDED_MARKERS: &[(&str, &str)] = &[
    ("F79646", "marker-orange"),
    ("E46C0A", "marker-orange"),
    ("FFC000", "marker-orange"),
    ("E6B9B8", "marker-orange"),
    ("D99694", "marker-orange"),
    ("FF9900", "marker-orange"),
    ("CC9900", "marker-orange"),
    ("CC6600", "marker-orange"),
    ("996633", "marker-brown"),
    ("984807", "marker-brown"),
    ("948A54", "marker-brown"),
    ("4A452A", "marker-terra-cota"),
    ("FFFF00", "marker-yellow"),
    ("008080", "marker-green"),
    ("006600", "marker-green"),
    ("009900", "marker-green"),
    ("00B050", "marker-green"),
    ("92D050", "marker-green"),
    ("9BBB59", "marker-green"),
    ("77933C", "marker-green"),
    ("4F6228", "marker-green"),
    ("0000FF", "marker-blue"),
    ("0070C0", "marker-blue"),
    ("00B0F0", "marker-blue"),
    ("4BACC6", "marker-blue"),
    ("558ED5", "marker-blue"),
    ("B7DEE8", "marker-blue"),
    ("93CDDD", "marker-blue"),
    ("31859C", "marker-dark-blue"),
    ("4F81BD", "marker-dark-blue"),
    ("1F497D", "marker-dark-blue"),
    ("376092", "marker-dark-blue"),
    ("002060", "marker-dark-blue"),
    ("10253F", "marker-dark-blue"),
    ("17375E", "marker-dark-blue"),
    ("215968", "marker-dark-blue"),
    ("254061", "marker-dark-blue"),
    ("6600FF", "marker-purple"),
    ("7030A0", "marker-purple"),
    ("8064A2", "marker-purple"),
    ("B3A2C7", "marker-purple"),
    ("CCC1DA", "marker-purple"),
    ("604A7B", "marker-purple"),
    ("9900FF", "marker-purple"),
    ("9933FF", "marker-purple"),
    ("FF66CC", "marker-pink"),
    ("FF00FF", "marker-pink"),
    ("C00000", "marker-red"),
    ("FF0000", "marker-red"),
    ("C0504D", "marker-red"),
    ("953735", "marker-brique"),
    ("632523", "marker-brique"),
    ("808080", "marker-grey"),
    ("A6A6A6", "marker-grey"),
    ("BFBFBF", "marker-grey"),
    ("D9D9D9", "marker-grey"),
];

/// コンパクトなマーカーテーブル（ドキュメント出力の既定）
const COMPACT_MARKERS: &[(&str, &str)] = &[
    ("F79646", "marker-orange"),
    ("E46C0A", "marker-orange"),
    ("FFC000", "marker-orange"),
    ("6600FF", "marker-purple"),
    ("7030A0", "marker-purple"),
    ("8064A2", "marker-purple"),
    ("B3A2C7", "marker-purple"),
    ("CCC1DA", "marker-purple"),
    ("996633", "marker-brown"),
    ("984807", "marker-brown"),
    ("4A452A", "marker-terra-cota"),
    ("953735", "marker-brique"),
    ("C00000", "marker-red"),
    ("FF0000", "marker-red"),
    ("0000FF", "marker-blue"),
    ("0070C0", "marker-blue"),
    ("00B0F0", "marker-blue"),
    ("31859C", "marker-blue"),
    ("4BACC6", "marker-blue"),
    ("4F81BD", "marker-blue"),
    ("558ED5", "marker-blue"),
    ("1F497D", "marker-dark-blue"),
    ("FFFF00", "marker-yellow"),
    ("008080", "marker-green"),
    ("006600", "marker-green"),
    ("009900", "marker-green"),
    ("00B050", "marker-green"),
    ("92D050", "marker-green"),
];

/// RGB文字列からマーカークラスへの対応表
///
/// キーは大文字の6桁RGBで保持し、検索は大文字小文字を区別しません。
/// エントリは登録順に保持されます。
///
/// # 使用例
///
/// ```rust
/// use xlsxhtml::MarkerTable;
///
/// let table = MarkerTable::new()
///     .with_marker("ff0000", "marker-red")
///     .with_marker("00B050", "marker-green");
///
/// assert_eq!(table.get("FF0000"), Some("marker-red"));
/// assert_eq!(table.get("00b050"), Some("marker-green"));
/// assert_eq!(table.get("123456"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerTable {
    entries: IndexMap<String, String>,
}

impl MarkerTable {
    /// 空のテーブルを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 観測された全色を含む拡張テーブル
    pub fn extended() -> Self {
        Self::from_pairs(EXTENDED_MARKERS.iter().copied())
    }

    /// 基本色のみのコンパクトなテーブル
    pub fn compact() -> Self {
        Self::from_pairs(COMPACT_MARKERS.iter().copied())
    }

    /// `(RGB, クラス名)`の組からテーブルを生成
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(rgb, class)| (rgb.as_ref().to_ascii_uppercase(), class.into()))
            .collect();
        Self { entries }
    }

    /// エントリを追加（既存のエントリは上書き）
    pub fn with_marker(mut self, rgb: &str, class: impl Into<String>) -> Self {
        self.entries.insert(rgb.to_ascii_uppercase(), class.into());
        self
    }

    /// RGBに対応するクラス名を取得
    pub fn get(&self, rgb: &str) -> Option<&str> {
        self.entries
            .get(&rgb.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// `(RGB, クラス名)`を登録順に列挙
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(rgb, class)| (rgb.as_str(), class.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// マーカー分類器
///
/// 分類できなかった色は`warn!`で1行ずつ記録し、出現順に保持します。
pub(crate) struct MarkerClassifier<'a> {
    table: &'a MarkerTable,
    unmapped: Vec<String>,
}

impl<'a> MarkerClassifier<'a> {
    pub fn new(table: &'a MarkerTable) -> Self {
        Self {
            table,
            unmapped: Vec::new(),
        }
    }

    /// 正規化済みRGBをマーカークラスに分類する
    ///
    /// `None`は常にマーカーなしです（診断は出しません）。
    pub fn classify(&mut self, rgb: Option<&str>) -> Option<&'a str> {
        let rgb = rgb?;
        let table: &'a MarkerTable = self.table;

        match table.get(rgb) {
            Some(class) => Some(class),
            None => {
                log::warn!("marker missing for: {}", rgb);
                self.unmapped.push(rgb.to_string());
                None
            }
        }
    }

    /// 分類できなかった色（出現順）
    pub fn unmapped(&self) -> &[String] {
        &self.unmapped
    }

    pub fn into_unmapped(self) -> Vec<String> {
        self.unmapped
    }
}
