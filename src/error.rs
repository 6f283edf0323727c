//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsxhtmlクレート全体で使用するエラー型
///
/// ワークブックの読み込み、デコード、HTMLレンダリング、画像の書き出し中に発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// 色やフォントの欠落など、スタイル情報の不備はエラーになりません。
/// レンダリングは最も近い安全な既定値（空文字列、書式なし、マーカーなし）に縮退します。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxhtml::XlsxToHtmlError;
/// use std::fs::File;
///
/// fn read_excel_file(path: &str) -> Result<(), XlsxToHtmlError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     // ... 処理 ...
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxToHtmlError {
    /// I/O操作中に発生したエラー
    ///
    /// 入力の読み込み、HTMLの書き込み、画像ファイルの保存などで
    /// `std::io::Error`が発生した場合に使用されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// calamineがワークブックを開けなかったエラー
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// パッケージ内XMLパートの解析エラー
    #[error("XML error in '{part}': {message}")]
    Xml {
        /// パート名（例: `xl/styles.xml`）
        part: String,
        /// エラーの詳細
        message: String,
    },

    /// 数値の解析エラー
    #[error("Number parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時の検証失敗、存在しないシートの指定、
    /// XLSX以外の入力などで発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use xlsxhtml::{ConverterBuilder, XlsxToHtmlError};
    ///
    /// let result = ConverterBuilder::new()
    ///     .with_image_width(0)  // 無効な幅
    ///     .build();
    ///
    /// match result {
    ///     Err(XlsxToHtmlError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb攻撃、パストラバーサル攻撃、ファイルサイズ制限などの
    /// セキュリティ制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    /// 外部コンバータによる画像変換の失敗
    ///
    /// `ImageFailurePolicy::Abort`（既定）の場合、レンダリング全体が中断されます。
    #[error("Image conversion failed for '{image}': {message}")]
    ImageConversion {
        /// 変換対象のファイル名
        image: String,
        /// エラーの詳細
        message: String,
    },
}

impl XlsxToHtmlError {
    /// XMLパートの解析エラーを生成
    pub(crate) fn xml(part: &str, message: impl std::fmt::Display) -> Self {
        XlsxToHtmlError::Xml {
            part: part.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    // Ioエラーのテスト
    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: XlsxToHtmlError = io_err.into();

        match error {
            XlsxToHtmlError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    // Parseエラーのテスト
    #[test]
    fn test_parse_error_display() {
        let parse_err = calamine::Error::Msg("Corrupted file");
        let error: XlsxToHtmlError = parse_err.into();

        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to parse Excel file"));
        assert!(error_msg.contains("Corrupted file"));
    }

    // Xmlエラーのテスト
    #[test]
    fn test_xml_error_display() {
        let error = XlsxToHtmlError::xml("xl/styles.xml", "unexpected end of file");
        let error_msg = error.to_string();

        assert!(error_msg.contains("xl/styles.xml"));
        assert!(error_msg.contains("unexpected end of file"));
    }

    // ImageConversionエラーのテスト
    #[test]
    fn test_image_conversion_error() {
        let error = XlsxToHtmlError::ImageConversion {
            image: "a1b2.emf".to_string(),
            message: "exit status: 1".to_string(),
        };

        match &error {
            XlsxToHtmlError::ImageConversion { image, message } => {
                assert_eq!(image, "a1b2.emf");
                assert_eq!(message, "exit status: 1");
            }
            _ => panic!("Expected ImageConversion error"),
        }
        assert!(error.to_string().starts_with("Image conversion failed"));
    }

    // エラー変換のテスト（?演算子の動作確認）
    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), XlsxToHtmlError> {
            let _file = std::fs::File::open("nonexistent_file.xlsx")?;
            Ok(())
        }

        match io_operation() {
            Err(XlsxToHtmlError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }

    // エラーメッセージのフォーマット確認
    #[test]
    fn test_all_error_formats() {
        let io_err: XlsxToHtmlError = io::Error::other("test io").into();
        assert!(io_err.to_string().starts_with("IO error"));

        let config_err = XlsxToHtmlError::Config("test config".to_string());
        assert!(config_err.to_string().starts_with("Configuration error"));

        let zip_err = XlsxToHtmlError::Zip("bad header".to_string());
        assert!(zip_err.to_string().starts_with("ZIP archive error"));

        let security_err = XlsxToHtmlError::SecurityViolation("too big".to_string());
        assert!(security_err.to_string().starts_with("Security violation"));
    }
}
