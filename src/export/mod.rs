pub mod archive;
pub mod workbook;

use chrono::{DateTime, Utc};

use crate::export::archive::{write_archive, ExportError};
use crate::model::quote::Quote;

pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// A ready-to-download export.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Archive of the three sheets describing one quote, named `Quote_{id}_{YYYY-MM-DD}.zip`.
pub fn export_quote(quote: &Quote, today: DateTime<Utc>) -> Result<ExportFile, ExportError> {
    let bytes = write_archive(&workbook::quote_workbook(quote))?;
    Ok(ExportFile {
        file_name: format!("Quote_{}_{}.zip", quote.id, today.format("%Y-%m-%d")),
        content_type: ARCHIVE_CONTENT_TYPE,
        bytes,
    })
}

pub fn export_quotes(quotes: &[Quote], today: DateTime<Utc>) -> Result<ExportFile, ExportError> {
    let bytes = write_archive(&workbook::quotes_workbook(quotes))?;
    Ok(ExportFile {
        file_name: format!("quotes_{}.zip", today.format("%Y-%m-%d")),
        content_type: ARCHIVE_CONTENT_TYPE,
        bytes,
    })
}
