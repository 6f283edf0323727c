//! Merge Geometry Module
//!
//! セル結合範囲に対する「親セル」「省略」「スパン」の判定を提供するモジュール。
//! 判定はセル座標と結合範囲の集合のみに依存する純粋関数です。

use crate::types::{CellCoord, MergedRegion};
use std::collections::HashMap;

/// 結合セルのスパン
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub colspan: u32,
    pub rowspan: u32,
}

impl Span {
    /// `<td>`に付与する属性文字列（例: ` colspan='2' rowspan='3'`）
    pub fn to_attributes(self) -> String {
        format!(" colspan='{}' rowspan='{}'", self.colspan, self.rowspan)
    }
}

/// セルの配置分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// 結合範囲の親セル（左上）
    Anchor(Span),
    /// 結合範囲内の親セル以外（出力しない）
    Omit,
    /// 結合されていないセル
    Plain,
}

/// ワークシートのセル結合ジオメトリ
///
/// 親セルの判定は座標→範囲のインデックスで行い、範囲内判定は線形走査で行います。
#[derive(Debug)]
pub struct MergeGeometry<'a> {
    regions: &'a [MergedRegion],
    anchors: HashMap<CellCoord, usize>,
}

impl<'a> MergeGeometry<'a> {
    pub fn new(regions: &'a [MergedRegion]) -> Self {
        let anchors = regions
            .iter()
            .enumerate()
            .map(|(index, region)| (region.parent, index))
            .collect();

        Self { regions, anchors }
    }

    /// 座標を含む結合範囲を取得
    pub fn region_containing(&self, coord: CellCoord) -> Option<&'a MergedRegion> {
        self.regions.iter().find(|region| region.contains(coord))
    }

    /// 座標が結合範囲の親セルか
    pub fn is_anchor(&self, coord: CellCoord) -> bool {
        self.anchors.contains_key(&coord)
    }

    /// 座標が結合範囲内の親セル以外で、出力を省略すべきか
    pub fn should_omit(&self, coord: CellCoord) -> bool {
        !self.is_anchor(coord) && self.region_containing(coord).is_some()
    }

    /// 親セルのスパン（親セル以外は`None`）
    pub fn span(&self, coord: CellCoord) -> Option<Span> {
        let region = self.regions.get(*self.anchors.get(&coord)?)?;
        Some(Span {
            colspan: region.col_span(),
            rowspan: region.row_span(),
        })
    }

    pub fn placement(&self, coord: CellCoord) -> Placement {
        if let Some(span) = self.span(coord) {
            Placement::Anchor(span)
        } else if self.should_omit(coord) {
            Placement::Omit
        } else {
            Placement::Plain
        }
    }
}
