//! Package Module
//!
//! XLSXパッケージ（ZIPアーカイブ）を開き、パートの読み込みとリレーションシップの解決を行うモジュール。

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

use super::attribute;
use crate::error::XlsxToHtmlError;
use crate::security::{resolve_part_path, validate_zip_path, SecurityConfig};

/// XLSXパッケージ
pub(crate) struct XlsxPackage {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl XlsxPackage {
    /// パッケージを開き、セキュリティ制限を検証する
    ///
    /// # 戻り値
    ///
    /// * `Ok(XlsxPackage)` - 検証に成功した場合
    /// * `Err(XlsxToHtmlError::Zip)` - ZIPアーカイブとして読めない場合
    /// * `Err(XlsxToHtmlError::SecurityViolation)` - ファイル数・サイズ・パスの制限に違反した場合
    pub fn open(buffer: Vec<u8>, security: &SecurityConfig) -> Result<Self, XlsxToHtmlError> {
        let mut archive =
            ZipArchive::new(Cursor::new(buffer)).map_err(|e| XlsxToHtmlError::Zip(e.to_string()))?;

        // セキュリティチェック: ファイル数の上限
        if archive.len() > security.max_file_count {
            return Err(XlsxToHtmlError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                security.max_file_count
            )));
        }

        // セキュリティチェック: 各ファイルのパス検証とサイズチェック
        let mut total_decompressed_size = 0u64;
        for i in 0..archive.len() {
            let file = archive
                .by_index(i)
                .map_err(|e| XlsxToHtmlError::Zip(e.to_string()))?;

            let file_name = file.name();
            validate_zip_path(file_name).map_err(|e| {
                XlsxToHtmlError::SecurityViolation(format!("Invalid ZIP path: {}", e))
            })?;

            let file_size = file.size();
            if file_size > security.max_file_size {
                return Err(XlsxToHtmlError::SecurityViolation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    file_name, file_size, security.max_file_size
                )));
            }

            total_decompressed_size = total_decompressed_size
                .checked_add(file_size)
                .ok_or_else(|| {
                    XlsxToHtmlError::SecurityViolation(
                        "Total decompressed size calculation overflow".to_string(),
                    )
                })?;

            if total_decompressed_size > security.max_decompressed_size {
                return Err(XlsxToHtmlError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total_decompressed_size, security.max_decompressed_size
                )));
            }
        }

        Ok(Self { archive })
    }

    /// パートを読み込む（存在しない場合は`None`）
    pub fn read_part(&mut self, name: &str) -> Result<Option<Vec<u8>>, XlsxToHtmlError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(XlsxToHtmlError::Zip(e.to_string())),
        };

        let mut content = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut content)?;
        Ok(Some(content))
    }

    /// パートのリレーションシップ（Id → 解決済みパート名）を取得
    ///
    /// `.rels`が存在しない場合は空のマップを返します。外部参照（`TargetMode="External"`）は含みません。
    pub fn relationships(&mut self, part: &str) -> Result<HashMap<String, String>, XlsxToHtmlError> {
        let rels_part = rels_path(part);
        match self.read_part(&rels_part)? {
            Some(xml) => parse_relationships(&xml, &rels_part, part),
            None => Ok(HashMap::new()),
        }
    }
}

/// パートに対応する`.rels`のパス（例: `xl/workbook.xml` → `xl/_rels/workbook.xml.rels`）
fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// `.rels`を解析する
fn parse_relationships(
    xml: &[u8],
    rels_part: &str,
    owner: &str,
) -> Result<HashMap<String, String>, XlsxToHtmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut relationships = HashMap::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let external = attribute(rels_part, &e, b"TargetMode")?
                    .is_some_and(|mode| mode.eq_ignore_ascii_case("External"));
                let id = attribute(rels_part, &e, b"Id")?;
                let target = attribute(rels_part, &e, b"Target")?;

                if let (false, Some(id), Some(target)) = (external, id, target) {
                    let resolved = resolve_part_path(owner, &target).map_err(|e| {
                        XlsxToHtmlError::SecurityViolation(format!(
                            "Invalid relationship target in '{}': {}",
                            rels_part, e
                        ))
                    })?;
                    relationships.insert(id, resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxToHtmlError::xml(rels_part, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::{FileOptions, ZipWriter};

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = FileOptions::default();
            for (name, content) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }

    #[test]
    fn test_rels_path() {
        assert_eq!(rels_path("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
        assert_eq!(
            rels_path("xl/worksheets/sheet1.xml"),
            "xl/worksheets/_rels/sheet1.xml.rels"
        );
        assert_eq!(rels_path("workbook.xml"), "_rels/workbook.xml.rels");
    }

    #[test]
    fn test_relationships_are_resolved() {
        let rels = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;
        let buffer = zip_with(&[("xl/drawings/_rels/drawing1.xml.rels", rels)]);
        let mut package = XlsxPackage::open(buffer, &SecurityConfig::default()).unwrap();

        let relationships = package.relationships("xl/drawings/drawing1.xml").unwrap();
        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships["rId1"], "xl/media/image1.png");

        // .relsがないパートは空
        assert!(package.relationships("xl/workbook.xml").unwrap().is_empty());
    }

    #[test]
    fn test_relationship_escaping_package_is_rejected() {
        let rels = r#"<Relationships><Relationship Id="rId1" Target="../../../etc/passwd"/></Relationships>"#;
        let buffer = zip_with(&[("xl/drawings/_rels/drawing1.xml.rels", rels)]);
        let mut package = XlsxPackage::open(buffer, &SecurityConfig::default()).unwrap();

        match package.relationships("xl/drawings/drawing1.xml") {
            Err(XlsxToHtmlError::SecurityViolation(msg)) => assert!(msg.contains("traversal")),
            other => panic!("Expected SecurityViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_read_missing_part() {
        let buffer = zip_with(&[("xl/workbook.xml", "<workbook/>")]);
        let mut package = XlsxPackage::open(buffer, &SecurityConfig::default()).unwrap();

        assert!(package.read_part("xl/workbook.xml").unwrap().is_some());
        assert!(package.read_part("xl/styles.xml").unwrap().is_none());
    }

    #[test]
    fn test_file_count_limit() {
        let buffer = zip_with(&[("a.xml", "<a/>"), ("b.xml", "<b/>")]);
        let security = SecurityConfig {
            max_file_count: 1,
            ..SecurityConfig::default()
        };

        match XlsxPackage::open(buffer, &security) {
            Err(XlsxToHtmlError::SecurityViolation(msg)) => assert!(msg.contains("too many files")),
            _ => panic!("Expected SecurityViolation"),
        }
    }

    #[test]
    fn test_not_a_zip() {
        match XlsxPackage::open(b"not a zip".to_vec(), &SecurityConfig::default()) {
            Err(XlsxToHtmlError::Zip(_)) => {}
            _ => panic!("Expected Zip error"),
        }
    }
}
