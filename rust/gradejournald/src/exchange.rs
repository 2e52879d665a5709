use crate::config::{ExportConfig, HeaderLabels};
use crate::schema::{Field, RawTable, StudentRecord, FIELDS};
use anyhow::{anyhow, Context};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const BOM: &str = "\u{feff}";

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("file contains no rows")]
    EmptyFile,
    #[error("no records to export")]
    EmptyJournal,
    #[error("{0:#}")]
    Decode(anyhow::Error),
    #[error("{0:#}")]
    Encode(anyhow::Error),
}

impl ExchangeError {
    pub fn code(&self) -> &'static str {
        match self {
            ExchangeError::UnsupportedFormat(_) => "unsupported_format",
            ExchangeError::EmptyFile => "empty_file",
            ExchangeError::EmptyJournal => "empty_journal",
            ExchangeError::Decode(_) => "import_failed",
            ExchangeError::Encode(_) => "export_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Txt,
    Xlsx,
    Xls,
    Ods,
}

impl FileFormat {
    pub fn parse(raw: &str) -> Result<Self, ExchangeError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "txt" => Ok(FileFormat::Txt),
            "xlsx" | "excel" => Ok(FileFormat::Xlsx),
            "xls" => Ok(FileFormat::Xls),
            "ods" => Ok(FileFormat::Ods),
            other => Err(ExchangeError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ExchangeError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ExchangeError::UnsupportedFormat(path.to_string_lossy().to_string()))?;
        Self::parse(ext)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Txt => "txt",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
            FileFormat::Ods => "ods",
        }
    }

    fn is_spreadsheet(self) -> bool {
        matches!(self, FileFormat::Xlsx | FileFormat::Xls | FileFormat::Ods)
    }
}

pub fn decode_file(path: &Path, format: FileFormat) -> Result<RawTable, ExchangeError> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.to_string_lossy()))
        .map_err(ExchangeError::Decode)?;
    if format.is_spreadsheet() {
        decode_spreadsheet(bytes)
    } else {
        decode_delimited(&String::from_utf8_lossy(&bytes))
    }
}

fn is_blank(rec: &csv::StringRecord) -> bool {
    rec.iter().all(|f| f.is_empty())
}

/// Comma-separated text. The first non-blank line is the header; rows whose
/// column count differs from the header's are dropped.
pub fn decode_delimited(text: &str) -> Result<RawTable, ExchangeError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for (line_no, rec) in reader.records().enumerate() {
        let rec = rec
            .with_context(|| format!("malformed record {}", line_no + 1))
            .map_err(ExchangeError::Decode)?;
        if is_blank(&rec) {
            continue;
        }
        let fields: Vec<String> = rec.iter().map(str::to_string).collect();
        match headers.as_ref() {
            None => headers = Some(fields),
            Some(h) if h.len() != fields.len() => {
                debug!(
                    record = line_no + 1,
                    expected = h.len(),
                    found = fields.len(),
                    "skipping row with mismatched column count"
                );
            }
            Some(_) => rows.push(fields),
        }
    }

    let headers = headers.ok_or(ExchangeError::EmptyFile)?;
    Ok(RawTable { headers, rows })
}

fn cell_text(cell: &calamine::Data) -> String {
    match cell {
        calamine::Data::Empty => String::new(),
        calamine::Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        other => other.to_string().trim().to_string(),
    }
}

/// First worksheet of an XLSX/XLS/ODS workbook; first row is the header.
pub fn decode_spreadsheet(bytes: Vec<u8>) -> Result<RawTable, ExchangeError> {
    use calamine::{open_workbook_auto_from_rs, Data, Reader};

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .context("failed to open workbook")
        .map_err(ExchangeError::Decode)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ExchangeError::EmptyFile)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read sheet {}", sheet_name))
        .map_err(ExchangeError::Decode)?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .ok_or(ExchangeError::EmptyFile)?
        .iter()
        .map(cell_text)
        .collect();

    let rows = sheet_rows
        .filter(|row| !row.iter().all(|c| matches!(c, Data::Empty)))
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

pub fn json_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rows handed over by the front end: either positional arrays (first row is
/// the header) or objects keyed by header label.
pub fn load_rows(raw: &serde_json::Value) -> Result<RawTable, ExchangeError> {
    let items = raw
        .as_array()
        .ok_or_else(|| ExchangeError::Decode(anyhow!("rows must be an array")))?;
    let first = items.first().ok_or(ExchangeError::EmptyFile)?;

    if let Some(header_cells) = first.as_array() {
        let headers = header_cells.iter().map(json_text).collect();
        let mut rows = Vec::new();
        for (idx, item) in items.iter().enumerate().skip(1) {
            let cells = item
                .as_array()
                .ok_or_else(|| ExchangeError::Decode(anyhow!("rows[{}] must be an array", idx)))?;
            if cells.is_empty() {
                continue;
            }
            rows.push(cells.iter().map(json_text).collect());
        }
        return Ok(RawTable { headers, rows });
    }

    if first.is_object() {
        let mut headers: Vec<String> = Vec::new();
        let mut objects = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let obj = item
                .as_object()
                .ok_or_else(|| ExchangeError::Decode(anyhow!("rows[{}] must be an object", idx)))?;
            for key in obj.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
            objects.push(obj);
        }
        let rows = objects
            .iter()
            .map(|obj| {
                headers
                    .iter()
                    .map(|h| obj.get(h).map(json_text).unwrap_or_default())
                    .collect()
            })
            .collect();
        return Ok(RawTable { headers, rows });
    }

    Err(ExchangeError::Decode(anyhow!(
        "rows must contain arrays or objects"
    )))
}

pub fn header_row(labels: HeaderLabels) -> Vec<&'static str> {
    FIELDS
        .iter()
        .map(|f| match labels {
            HeaderLabels::Canonical => f.name(),
            HeaderLabels::Localized => f.label(),
        })
        .collect()
}

pub fn encode(
    records: &[StudentRecord],
    format: FileFormat,
    cfg: &ExportConfig,
) -> Result<Vec<u8>, ExchangeError> {
    if records.is_empty() {
        return Err(ExchangeError::EmptyJournal);
    }
    match format {
        FileFormat::Csv => encode_csv(records, cfg),
        FileFormat::Txt => Ok(encode_txt(records, cfg)),
        FileFormat::Xlsx => encode_xlsx(records, cfg),
        other => Err(ExchangeError::UnsupportedFormat(other.as_str().to_string())),
    }
}

/// BOM-prefixed when configured; fields with a comma, quote, or line break
/// are quoted with inner quotes doubled.
pub fn encode_csv(records: &[StudentRecord], cfg: &ExportConfig) -> Result<Vec<u8>, ExchangeError> {
    let mut buf = Vec::new();
    if cfg.csv_bom {
        buf.extend_from_slice(BOM.as_bytes());
    }
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(buf);

    let write_all = |writer: &mut csv::Writer<Vec<u8>>| -> csv::Result<()> {
        writer.write_record(header_row(cfg.header_labels))?;
        for rec in records {
            writer.write_record(FIELDS.iter().map(|f| rec.get(*f)))?;
        }
        writer.flush()?;
        Ok(())
    };
    write_all(&mut writer)
        .context("failed to write csv")
        .map_err(ExchangeError::Encode)?;

    writer
        .into_inner()
        .map_err(|e| ExchangeError::Encode(anyhow!("failed to finish csv: {}", e.error())))
}

/// Plain comma join: no BOM, no quoting.
pub fn encode_txt(records: &[StudentRecord], cfg: &ExportConfig) -> Vec<u8> {
    let mut lines = vec![header_row(cfg.header_labels).join(",")];
    for rec in records {
        let values: Vec<&str> = FIELDS.iter().map(|f| rec.get(*f)).collect();
        lines.push(values.join(","));
    }
    lines.join("\n").into_bytes()
}

fn integral_grade(field: Field, value: &str) -> Option<f64> {
    if !field.is_subject() {
        return None;
    }
    value.trim().parse::<i64>().ok().map(|n| n as f64)
}

fn build_xlsx(records: &[StudentRecord], cfg: &ExportConfig) -> anyhow::Result<Vec<u8>> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(cfg.sheet_name.as_str())?;

    for (col, label) in header_row(cfg.header_labels).iter().enumerate() {
        let col = col as u16;
        sheet.set_column_width(col, cfg.column_width)?;
        sheet.write_string(0, col, *label)?;
    }

    for (r, rec) in records.iter().enumerate() {
        let row = r as u32 + 1;
        for (c, field) in FIELDS.iter().enumerate() {
            let col = c as u16;
            let value = rec.get(*field);
            match integral_grade(*field, value) {
                Some(n) => sheet.write_number(row, col, n)?,
                None => sheet.write_string(row, col, value)?,
            };
        }
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn encode_xlsx(records: &[StudentRecord], cfg: &ExportConfig) -> Result<Vec<u8>, ExchangeError> {
    build_xlsx(records, cfg)
        .context("failed to build workbook")
        .map_err(ExchangeError::Encode)
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExchangeError> {
    let write = || -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory {}", parent.to_string_lossy())
            })?;
        }
        std::fs::write(path, bytes)
            .with_context(|| format!("failed to write {}", path.to_string_lossy()))
    };
    write().map_err(ExchangeError::Encode)
}
