//! ESRI shapefile encoding for a single point, packed as a zip archive.
//!
//! Layout follows the ESRI Shapefile Technical Description: main file
//! (`.shp`), index (`.shx`), dBASE III attribute table (`.dbf`) and a WKT
//! projection (`.prj`). Header integers mix byte orders; the helpers below
//! name the order explicitly.

use chrono::Datelike;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{ExportError, ExportPoint, EXPORT_BASENAME};
use crate::analysis::AnalysisOutcome;

const FILE_CODE: i32 = 9994;
const VERSION: i32 = 1000;
const SHAPE_POINT: i32 = 1;
const HEADER_LEN: usize = 100;
const RECORD_HEADER_LEN: usize = 8;
/// Shape type plus X and Y
const POINT_CONTENT_LEN: usize = 4 + 8 + 8;

const NAME_WIDTH: usize = 80;
const SCORE_WIDTH: usize = 10;
const SCORE_DECIMALS: u8 = 2;

const WGS84_PRJ: &str = "GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\",\
SPHEROID[\"WGS_1984\",6378137.0,298.257223563]],\
PRIMEM[\"Greenwich\",0.0],UNIT[\"Degree\",0.0174532925199433]]";

fn push_i32_be(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

fn push_i32_le(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn push_f64_le(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Lengths in shapefile headers are counted in 16-bit words.
fn words(bytes: usize) -> i32 {
    (bytes / 2) as i32
}

/// The 100-byte header shared by `.shp` and `.shx`.
fn file_header(point: &ExportPoint, file_len: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN);
    push_i32_be(&mut buf, FILE_CODE);
    for _ in 0..5 {
        push_i32_be(&mut buf, 0);
    }
    push_i32_be(&mut buf, words(file_len));
    push_i32_le(&mut buf, VERSION);
    push_i32_le(&mut buf, SHAPE_POINT);

    // Bounding box of a single point is the point itself
    let (x, y) = (point.coordinate.lng, point.coordinate.lat);
    for v in [x, y, x, y] {
        push_f64_le(&mut buf, v);
    }
    // Z and M ranges are unused for plain points
    for _ in 0..4 {
        push_f64_le(&mut buf, 0.0);
    }
    buf
}

pub fn encode_shp(point: &ExportPoint) -> Vec<u8> {
    let file_len = HEADER_LEN + RECORD_HEADER_LEN + POINT_CONTENT_LEN;
    let mut buf = file_header(point, file_len);

    push_i32_be(&mut buf, 1); // record number, 1-based
    push_i32_be(&mut buf, words(POINT_CONTENT_LEN));
    push_i32_le(&mut buf, SHAPE_POINT);
    push_f64_le(&mut buf, point.coordinate.lng);
    push_f64_le(&mut buf, point.coordinate.lat);
    buf
}

pub fn encode_shx(point: &ExportPoint) -> Vec<u8> {
    let file_len = HEADER_LEN + RECORD_HEADER_LEN;
    let mut buf = file_header(point, file_len);

    // The only record starts right after the .shp header
    push_i32_be(&mut buf, words(HEADER_LEN));
    push_i32_be(&mut buf, words(POINT_CONTENT_LEN));
    buf
}

fn field_descriptor(name: &str, kind: u8, length: u8, decimals: u8) -> [u8; 32] {
    let mut field = [0u8; 32];
    let name = name.as_bytes();
    let n = name.len().min(10);
    field[..n].copy_from_slice(&name[..n]);
    field[11] = kind;
    field[16] = length;
    field[17] = decimals;
    field
}

/// Left-align `text` in `width` bytes, cutting on a char boundary.
fn pad_text(text: &str, width: usize) -> Vec<u8> {
    let mut end = text.len().min(width);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut bytes = text.as_bytes()[..end].to_vec();
    bytes.resize(width, b' ');
    bytes
}

/// Right-align a fixed-point number, saturating to the widest value that fits.
fn pad_number(value: f64, width: usize, decimals: usize) -> Vec<u8> {
    let mut text = format!("{:>width$.decimals$}", value, width = width, decimals = decimals);
    if text.len() > width || !value.is_finite() {
        text = "*".repeat(width);
    }
    text.into_bytes()
}

pub fn encode_dbf(point: &ExportPoint, outcome: &AnalysisOutcome) -> Vec<u8> {
    let fields = [
        field_descriptor("NAME", b'C', NAME_WIDTH as u8, 0),
        field_descriptor("SCORE", b'N', SCORE_WIDTH as u8, SCORE_DECIMALS),
    ];
    let header_len = 32 + 32 * fields.len() + 1;
    let record_len = 1 + NAME_WIDTH + SCORE_WIDTH;

    let date = outcome.completed_at.date_naive();
    let mut buf = Vec::with_capacity(header_len + record_len + 1);
    buf.push(0x03); // dBASE III without memo
    buf.push((date.year() - 1900).clamp(0, 255) as u8);
    buf.push(date.month() as u8);
    buf.push(date.day() as u8);
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&(header_len as u16).to_le_bytes());
    buf.extend_from_slice(&(record_len as u16).to_le_bytes());
    buf.extend_from_slice(&[0u8; 20]);

    for field in &fields {
        buf.extend_from_slice(field);
    }
    buf.push(0x0D);

    buf.push(b' '); // not deleted
    buf.extend_from_slice(&pad_text(&point.name, NAME_WIDTH));
    buf.extend_from_slice(&pad_number(
        point.score,
        SCORE_WIDTH,
        usize::from(SCORE_DECIMALS),
    ));
    buf.push(0x1A);
    buf
}

/// Zip the four shapefile members together.
pub fn encode_zip(point: &ExportPoint, outcome: &AnalysisOutcome) -> Result<Vec<u8>, ExportError> {
    let members = [
        ("shp", encode_shp(point)),
        ("shx", encode_shx(point)),
        ("dbf", encode_dbf(point, outcome)),
        ("prj", WGS84_PRJ.as_bytes().to_vec()),
    ];

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (ext, bytes) in &members {
        zip.start_file(format!("{}.{}", EXPORT_BASENAME, ext), options)?;
        zip.write_all(bytes)?;
    }
    Ok(zip.finish()?.into_inner())
}
