//! Render Module
//!
//! デコード済みワークシートをHTMLテーブルとして書き出すモジュール。
//! 行・セルを順に走査し、セル結合の判定、塗りつぶし色、セル値、画像を組み立てます。

use std::io::Write;

use crate::error::XlsxToHtmlError;
use crate::image::{reanchor_images, ImageIndex, ImageStore};
use crate::marker::{MarkerClassifier, MarkerTable};
use crate::merge::{MergeGeometry, Placement, Span};
use crate::profile::ProfileSettings;
use crate::richtext::RichTextRenderer;
use crate::types::{Cell, CellCoord, Worksheet, Workbook};

/// 塗りつぶしなしとして扱う色
const NO_FILL: &str = "FFFFFF";

/// テーブルレンダラ
pub(crate) struct TableRenderer<'a> {
    workbook: &'a Workbook,
    settings: &'a ProfileSettings,
    markers: &'a MarkerTable,
}

/// 1つのセルの描画に必要な状態
struct CellContext<'r, 'a> {
    text: &'r RichTextRenderer<'a>,
    images: &'r ImageIndex,
    markers: &'r mut MarkerClassifier<'a>,
    store: Option<&'r mut ImageStore>,
}

impl<'a> TableRenderer<'a> {
    pub fn new(
        workbook: &'a Workbook,
        settings: &'a ProfileSettings,
        markers: &'a MarkerTable,
    ) -> Self {
        Self {
            workbook,
            settings,
            markers,
        }
    }

    /// ワークシートをHTMLとして書き出す
    ///
    /// # 引数
    ///
    /// * `sheet` - デコード済みのワークシート
    /// * `store` - 画像の書き出し先（`None`の場合は画像を出力しない）
    /// * `writer` - 出力先
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<String>)` - マーカーに分類できなかった色（出現順）
    /// * `Err(XlsxToHtmlError)` - 書き込みまたは画像の書き出しに失敗した場合
    pub fn render<W: Write>(
        &self,
        sheet: &'a Worksheet,
        store: Option<&mut ImageStore>,
        writer: &mut W,
    ) -> Result<Vec<String>, XlsxToHtmlError> {
        let settings = self.settings;
        let geometry = MergeGeometry::new(&sheet.merged_regions);
        let images = if settings.images {
            reanchor_images(sheet.images.clone(), &geometry)
        } else {
            ImageIndex::default()
        };
        for coord in unrendered_anchors(&images, sheet) {
            log::warn!(
                "{} image(s) anchored at {} are not rendered: the cell has no data",
                images.images_at(coord).len(),
                coord.to_a1_notation()
            );
        }
        let text = RichTextRenderer::new(self.workbook, settings);
        let mut markers = MarkerClassifier::new(self.markers);
        let nl = settings.newline;

        let mut ctx = CellContext {
            text: &text,
            images: &images,
            markers: &mut markers,
            store: if settings.images { store } else { None },
        };

        writer.write_all(settings.header.as_bytes())?;

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let Some(row) = row else {
                continue;
            };
            if row.cells.is_empty() && settings.skip_empty_rows {
                continue;
            }

            let row_idx = row_idx as u32;
            let tag = if settings.header_row && row_idx == 0 {
                "th"
            } else {
                "td"
            };

            write!(writer, "<tr>{}", nl)?;
            for (col_idx, cell) in row.cells.iter().enumerate() {
                let coord = CellCoord::new(row_idx, col_idx as u32);
                let span = match geometry.placement(coord) {
                    Placement::Omit => continue,
                    Placement::Anchor(span) => Some(span),
                    Placement::Plain => None,
                };
                match cell {
                    Some(cell) => self.write_cell(cell, tag, span, &mut ctx, writer)?,
                    // 結合範囲の親セルは値がなくてもスパンを保つ
                    None if span.is_some() || settings.absent_cell_as_empty => {
                        let attributes = span.map(Span::to_attributes).unwrap_or_default();
                        write!(writer, "<{}{}></{}>{}", tag, attributes, tag, nl)?;
                    }
                    None => {}
                }
            }
            write!(writer, "</tr>{}", nl)?;
        }

        writer.write_all(settings.footer.as_bytes())?;
        writer.flush()?;

        log::debug!(
            "rendered sheet '{}': {} images placed, {} unmapped colors",
            sheet.name,
            images.len(),
            ctx.markers.unmapped().len()
        );

        Ok(markers.into_unmapped())
    }

    /// 1つのセルを書き出す
    fn write_cell<W: Write>(
        &self,
        cell: &Cell,
        tag: &str,
        span: Option<Span>,
        ctx: &mut CellContext<'_, 'a>,
        writer: &mut W,
    ) -> Result<(), XlsxToHtmlError> {
        let coord = cell.coord;
        let mut attributes = span.map(Span::to_attributes).unwrap_or_default();

        if self.settings.fill {
            if let Some(rgb) = ctx.text.resolve_color(cell.fill.as_ref()) {
                if !rgb.contains(NO_FILL) {
                    attributes.push_str(&format!(" style='background-color:#{};'", rgb));
                }
            }
        }

        write!(writer, "<{}{}>", tag, attributes)?;
        writer.write_all(ctx.text.render(cell, ctx.markers).as_bytes())?;

        if let Some(store) = ctx.store.as_deref_mut() {
            for image in ctx.images.images_at(coord) {
                if let Some(markup) = store.persist(image)? {
                    writer.write_all(markup.as_bytes())?;
                }
            }
        }

        write!(writer, "</{}>{}", tag, self.settings.newline)?;
        Ok(())
    }
}

/// 値を持つセルがなく、画像が出力されない座標
fn unrendered_anchors(images: &ImageIndex, sheet: &Worksheet) -> Vec<CellCoord> {
    images
        .iter()
        .map(|(coord, _)| coord)
        .filter(|coord| sheet.cell(*coord).is_none())
        .collect()
}
