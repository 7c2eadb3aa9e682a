use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::export::workbook::Workbook;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// `Quote Overview` -> `quote-overview`
fn sheet_slug(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

pub fn sheet_file_name(index: usize, name: &str) -> String {
    format!("{:02}-{}.csv", index + 1, sheet_slug(name))
}

fn sheet_csv(rows: &[Vec<String>]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    for row in rows {
        if row.is_empty() {
            // csv refuses zero-field records
            writer.write_record([""])?;
        } else {
            writer.write_record(row)?;
        }
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(std::io::Error::other(e.to_string())))
}

/// Writes every sheet as its own CSV entry of a deflated ZIP archive.
pub fn write_archive(workbook: &Workbook) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (index, sheet) in workbook.sheets.iter().enumerate() {
        zip.start_file(sheet_file_name(index, &sheet.name), options)?;
        zip.write_all(&sheet_csv(&sheet.rows)?)?;
    }
    Ok(zip.finish()?.into_inner())
}
