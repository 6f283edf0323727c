//! Image Module
//!
//! 埋め込み画像をセル結合範囲の親セルへ付け替え（再アンカー）、
//! レンダリング時にファイルとして書き出すモジュール。

use crate::api::ImageFailurePolicy;
use crate::error::XlsxToHtmlError;
use crate::merge::MergeGeometry;
use crate::types::{CellCoord, Image};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 再アンカー済み画像の索引
///
/// 最終的なセル座標をキーとし、同じセルの画像は挿入順に保持します。
#[derive(Debug, Default)]
pub(crate) struct ImageIndex {
    by_cell: IndexMap<CellCoord, Vec<Image>>,
}

impl ImageIndex {
    /// セルに配置された画像（挿入順）
    pub fn images_at(&self, coord: CellCoord) -> &[Image] {
        self.by_cell
            .get(&coord)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 画像を持つセル座標と、そのセルの画像（挿入順）
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &[Image])> + '_ {
        self.by_cell
            .iter()
            .map(|(coord, images)| (*coord, images.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.by_cell.values().map(Vec::len).sum()
    }
}

/// 画像を結合範囲の親セルに付け替え、セル座標ごとにまとめる
///
/// 主アンカーが結合範囲の親セル以外にある場合、親セルとの差分を主アンカーと
/// 副アンカー（存在する場合）の両方から差し引きます。結合範囲外の画像は変更しません。
pub(crate) fn reanchor_images(images: Vec<Image>, geometry: &MergeGeometry<'_>) -> ImageIndex {
    let mut by_cell: IndexMap<CellCoord, Vec<Image>> = IndexMap::new();

    for mut image in images {
        if let Some(region) = geometry.region_containing(image.from) {
            let delta_row = image.from.row - region.parent.row;
            let delta_col = image.from.col - region.parent.col;

            if delta_row != 0 || delta_col != 0 {
                image.from = region.parent;
                image.to = image.to.map(|to| {
                    CellCoord::new(
                        to.row.saturating_sub(delta_row),
                        to.col.saturating_sub(delta_col),
                    )
                });
            }
        }

        by_cell.entry(image.from).or_default().push(image);
    }

    ImageIndex { by_cell }
}

/// ブラウザで直接表示できない形式か
fn needs_conversion(format: &str) -> bool {
    matches!(format, "emf" | "wmf")
}

/// 画像ファイルの書き出し先
///
/// 画像ごとにUUID v4のファイル名で書き出し、非対応形式は外部コンバータで
/// SVGへ変換します。書き出したファイルのパスは出現順に記録されます。
pub(crate) struct ImageStore {
    dir: PathBuf,
    width: u32,
    converter: Option<PathBuf>,
    policy: ImageFailurePolicy,
    written: Vec<PathBuf>,
}

impl ImageStore {
    pub fn new(
        dir: PathBuf,
        width: u32,
        converter: Option<PathBuf>,
        policy: ImageFailurePolicy,
    ) -> Self {
        Self {
            dir,
            width,
            converter,
            policy,
            written: Vec::new(),
        }
    }

    /// 画像を書き出し、`<img>`タグを返す
    ///
    /// # 戻り値
    ///
    /// * `Ok(Some(String))` - 埋め込み用のマークアップ
    /// * `Ok(None)` - `ImageFailurePolicy::Skip`で変換に失敗し、画像を破棄した場合
    /// * `Err(XlsxToHtmlError)` - 書き込み失敗、または`Abort`での変換失敗
    pub fn persist(&mut self, image: &Image) -> Result<Option<String>, XlsxToHtmlError> {
        let stem = uuid::Uuid::new_v4().to_string();
        let original = format!("{}.{}", stem, image.format);
        let original_path = self.dir.join(&original);

        fs::write(&original_path, &image.data)?;
        log::debug!("wrote image {}", original_path.display());

        let file_name = match (&self.converter, needs_conversion(&image.format)) {
            (Some(converter), true) => match convert_to_svg(converter, &self.dir, &stem, &original) {
                Ok(svg) => {
                    fs::remove_file(&original_path)?;
                    svg
                }
                Err(err) => {
                    // 変換できなかった元ファイルは残さない
                    if let Err(remove_err) = fs::remove_file(&original_path) {
                        log::debug!("could not remove {}: {}", original, remove_err);
                    }
                    match self.policy {
                        ImageFailurePolicy::Abort => return Err(err),
                        ImageFailurePolicy::Skip => {
                            log::warn!("skipping image {}: {}", original, err);
                            return Ok(None);
                        }
                    }
                }
            },
            _ => original,
        };

        let path = self.dir.join(&file_name);
        let markup = format!(
            "<img src='{}' style='width:{}px;'>",
            image_src(&self.dir, &file_name),
            self.width
        );
        self.written.push(path);
        Ok(Some(markup))
    }

    /// 書き出した画像ファイルのパス（出現順）
    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

/// `<img src>`に埋め込むパス（ディレクトリ区切りは常に`/`）
fn image_src(dir: &Path, file_name: &str) -> String {
    let dir = dir.to_string_lossy().replace('\\', "/");
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", dir, file_name)
    }
}

/// 外部コンバータでSVGに変換し、生成されたファイル名を返す
fn convert_to_svg(
    converter: &Path,
    dir: &Path,
    stem: &str,
    original: &str,
) -> Result<String, XlsxToHtmlError> {
    let svg = format!("{}.svg", stem);
    log::debug!("converting {} with {}", original, converter.display());

    let status = Command::new(converter)
        .current_dir(dir)
        .arg("-z")
        .arg(format!("--export-plain-svg={}", svg))
        .arg("--file")
        .arg(original)
        .status()
        .map_err(|e| XlsxToHtmlError::ImageConversion {
            image: original.to_string(),
            message: e.to_string(),
        })?;

    if !status.success() {
        return Err(XlsxToHtmlError::ImageConversion {
            image: original.to_string(),
            message: status.to_string(),
        });
    }

    Ok(svg)
}
