//! パフォーマンスベンチマーク
//!
//! デコード済みワークシートのレンダリングと、XLSXファイルからの変換全体の処理時間を測定します。
//! フィクスチャはrust_xlsxwriterでメモリ上に生成するため、外部ファイルは不要です。

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_xlsxwriter::{Color, Format, Workbook as XlsxWriter};
use std::io::Cursor;
use xlsxhtml::{
    Cell, CellCoord, CellValue, ColorRef, ConverterBuilder, FontStyle, HtmlProfile, MergedRegion,
    Run, SharedString, Workbook, Worksheet,
};

const ROWS: u32 = 1_000;
const COLS: u32 = 10;

/// リッチテキスト・塗りつぶし・結合を含むワークシートを組み立てる
fn synthetic_sheet() -> (Workbook, Worksheet) {
    let workbook = Workbook {
        shared_strings: vec![
            SharedString::plain("plain text"),
            SharedString::rich(vec![
                Run::plain("mixed "),
                Run::new("red", FontStyle::with_color(ColorRef::literal("FFFF0000"))),
                Run::plain(" run\n  indented"),
            ]),
        ],
        ..Workbook::default()
    };

    let mut sheet = Worksheet::new("Bench");
    for row in 0..ROWS {
        for col in 0..COLS {
            let value = match col % 3 {
                0 => CellValue::SharedString(0),
                1 => CellValue::SharedString(1),
                _ => CellValue::Literal(format!("{}", row * COLS + col)),
            };
            let mut cell = Cell::new(CellCoord::new(row, col), Some(value));
            if col == 2 {
                cell = cell.with_fill(ColorRef::literal("FFFFFF00"));
            }
            sheet.put_cell(cell);
        }
        if row % 10 == 0 {
            sheet
                .merged_regions
                .push(MergedRegion::from_bounds(row, COLS - 2, row + 1, COLS - 1));
        }
    }

    (workbook, sheet)
}

/// 同等の内容を持つXLSXファイルを生成する
fn synthetic_workbook() -> Vec<u8> {
    let mut workbook = XlsxWriter::new();
    let worksheet = workbook.add_worksheet();
    let red = Format::new().set_font_color(Color::RGB(0xFF0000));
    let fill = Format::new().set_background_color(Color::RGB(0xFFFF00));

    for row in 0..ROWS {
        for col in 0..COLS as u16 {
            let result = match col % 3 {
                0 => worksheet.write_string(row, col, &format!("text {}", row)),
                1 => worksheet.write_string_with_format(row, col, "red", &red),
                _ => worksheet.write_number_with_format(row, col, row as f64, &fill),
            };
            result.expect("failed to write benchmark cell");
        }
    }

    workbook
        .save_to_buffer()
        .expect("failed to generate benchmark workbook")
}

fn benchmark_render_sheet(c: &mut Criterion) {
    let (workbook, sheet) = synthetic_sheet();

    let mut group = c.benchmark_group("render_sheet");
    group.throughput(Throughput::Elements((ROWS * COLS) as u64));

    for profile in [HtmlProfile::Fragment, HtmlProfile::Document] {
        let converter = ConverterBuilder::new()
            .with_profile(profile)
            .build()
            .unwrap();

        group.bench_function(format!("{:?}", profile), |b| {
            b.iter(|| {
                let rendered = converter
                    .render_sheet(black_box(&workbook), black_box(&sheet))
                    .unwrap();
                black_box(rendered.html)
            });
        });
    }

    group.finish();
}

fn benchmark_convert_file(c: &mut Criterion) {
    let data = synthetic_workbook();
    let converter = ConverterBuilder::new().build().unwrap();

    let mut group = c.benchmark_group("convert_file");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(20);

    group.bench_function("fragment", |b| {
        b.iter(|| {
            let input = Cursor::new(black_box(&data));
            let mut output = Vec::new();
            converter
                .convert(black_box(input), black_box(&mut output))
                .unwrap();
            black_box(output)
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(std::time::Duration::from_secs(10))
        .warm_up_time(std::time::Duration::from_secs(3));
    targets = benchmark_render_sheet, benchmark_convert_file
}

criterion_main!(benches);
