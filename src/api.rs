//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// シート選択方式
///
/// 変換対象のシートを1つ選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetSelector {
    /// インデックス指定（0始まり）
    ///
    /// 例: `SheetSelector::Index(0)` は最初のシートを選択（デフォルト）
    Index(usize),

    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("Sheet1".to_string())`
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

/// HTMLの出力形式
///
/// 出力の形（フラグメント / 完全なドキュメント）と、色の正規化・マーカーテーブル・
/// 改行処理などの振る舞いをまとめて切り替えます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum HtmlProfile {
    /// 埋め込み用の`<table>`フラグメント（デフォルト）
    ///
    /// - 拡張マーカーテーブル、色は大文字化し`0D0D0D`も「色なし」
    /// - 塗りつぶし色を`background-color`として出力（`FFFFFF`を除く）
    /// - 画像をファイルに書き出して`<img>`を埋め込む
    /// - 改行は`<br>`、改行直後の空白は`&nbsp;`
    ///
    /// # 出力例
    ///
    /// ```html
    /// <table>
    ///     <tbody>
    /// <tr>
    /// <td colspan='2' rowspan='1'><mark class='marker-red'>Hello</mark></td>
    /// </tr>
    ///
    ///     </tbody>
    /// </table>
    /// ```
    #[default]
    Fragment,

    /// Bootstrapのテーブルを含む完全なHTMLドキュメント
    ///
    /// - コンパクトなマーカーテーブル
    /// - 先頭行を`<th>`として出力
    /// - 塗りつぶし色と画像は出力しない
    Document,
}

/// 画像変換に失敗した場合の方針
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ImageFailurePolicy {
    /// レンダリング全体を中断する（デフォルト）
    #[default]
    Abort,

    /// 警告を記録してその画像だけを破棄し、レンダリングを続ける
    Skip,
}
