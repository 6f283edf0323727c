//! Color Module
//!
//! 色参照（リテラル / テーマ+ティント）を6桁のRGB文字列に正規化するモジュール。
//! 黒に近い色は「色なし」として扱い、既定の黒文字・黒塗りが出力に現れないようにします。

use crate::types::{ColorRef, ThemePalette};

/// RGB文字列の正規化ルール
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColorNormalization {
    /// 大文字に正規化するか
    pub uppercase: bool,

    /// 「色なし」として扱う黒に近い色（部分一致）
    pub near_black: Option<&'static str>,
}

impl ColorNormalization {
    /// 大文字化と`0D0D0D`の抑制を行うルール
    pub fn strict() -> Self {
        Self {
            uppercase: true,
            near_black: Some("0D0D0D"),
        }
    }

    /// 純粋な黒のみを抑制するルール
    pub fn lenient() -> Self {
        Self {
            uppercase: false,
            near_black: None,
        }
    }
}

/// 色参照の解決器
///
/// テーマパレットを参照して色を解決します。データの欠落は常に`None`に縮退し、
/// エラーにはなりません。
pub(crate) struct ColorResolver<'a> {
    palette: &'a ThemePalette,
    normalization: &'a ColorNormalization,
}

impl<'a> ColorResolver<'a> {
    pub fn new(palette: &'a ThemePalette, normalization: &'a ColorNormalization) -> Self {
        Self {
            palette,
            normalization,
        }
    }

    /// 色参照を6桁のRGB文字列に解決する
    ///
    /// # 戻り値
    ///
    /// * `Some(String)` - 正規化済みのRGB（例: `"FF0000"`）
    /// * `None` - 色参照がない、テーマが解決できない、または黒に近い色の場合
    pub fn resolve(&self, color: Option<&ColorRef>) -> Option<String> {
        let raw = match color? {
            ColorRef::Literal(value) => value.clone(),
            ColorRef::Theme { index, tint } => self.theme_rgb(*index, *tint)?,
        };

        self.normalize(&raw)
    }

    /// テーマインデックスからRGBを取得し、ティントを適用する
    ///
    /// `srgbClr`がないスロットはシステムカラー（`lastClr`）にフォールバックします。
    fn theme_rgb(&self, index: u32, tint: f64) -> Option<String> {
        let slot = self.palette.get(index)?;
        let base = slot.rgb.as_deref().or(slot.system.as_deref())?;

        if tint == 0.0 {
            return Some(base.to_string());
        }

        let (r, g, b) = parse_hex_rgb(base)?;
        let (r, g, b) = apply_tint(r, g, b, tint);
        Some(format!("{:02X}{:02X}{:02X}", r, g, b))
    }

    /// RGB/ARGB文字列を正規化する
    ///
    /// 1. 先頭の`#`を除去し、必要に応じて大文字化
    /// 2. `000000` / `FF000000` および設定された黒に近い色は`None`
    /// 3. 8桁のARGBはアルファを捨てて末尾6桁にする
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let mut rgb = raw.trim().trim_start_matches('#').to_string();
        if rgb.is_empty() {
            return None;
        }

        if self.normalization.uppercase {
            rgb = rgb.to_ascii_uppercase();
        }

        if rgb == "000000" || rgb == "FF000000" {
            return None;
        }

        if let Some(near_black) = self.normalization.near_black {
            if rgb.contains(near_black) {
                return None;
            }
        }

        if rgb.len() == 8 && rgb.is_ascii() {
            return Some(rgb[2..].to_string());
        }

        Some(rgb)
    }
}

/// 6桁（または8桁ARGB）の16進文字列をRGBに分解
fn parse_hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    let hex = match hex.len() {
        6 => hex,
        8 => hex.get(2..)?,
        _ => return None,
    };

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some((r, g, b))
}

/// HLS空間でティントを適用する
///
/// tint > 0 は白に向かって明るく、tint < 0 は黒に向かって暗くします。
fn apply_tint(r: u8, g: u8, b: u8, tint: f64) -> (u8, u8, u8) {
    let (h, l, s) = rgb_to_hls(r, g, b);

    let l = if tint < 0.0 {
        l * (1.0 + tint)
    } else {
        l * (1.0 - tint) + tint
    };

    hls_to_rgb(h, l.clamp(0.0, 1.0), s)
}

#[allow(clippy::many_single_char_names)]
fn rgb_to_hls(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, l, 0.0);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, l, s)
}

#[allow(clippy::many_single_char_names)]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hls_to_rgb(h: f64, l: f64, s: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let r = hue_to_channel(p, q, h + 1.0 / 3.0);
    let g = hue_to_channel(p, q, h);
    let b = hue_to_channel(p, q, h - 1.0 / 3.0);

    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}
