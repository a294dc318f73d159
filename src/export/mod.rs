//! Report export to DOCX and PDF
//!
//! Both renderers consume the same [`ReportDocument`], so the exported files
//! carry identical content and ordering.

use std::str::FromStr;
use strum::{Display, EnumString};

pub mod document;
pub mod docx;
pub mod pdf;
pub mod transliterate;

pub use document::{Block, ReportDocument};

use crate::analysis::models::AnalysisReport;
use crate::errors::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    Docx,
    Pdf,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Result<Self, ExportError> {
        Self::from_str(value.trim()).map_err(|_| ExportError::UnsupportedFormat {
            format: value.to_string(),
        })
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }

    pub fn filename(self, analysis_id: &str) -> String {
        format!("trademark_analysis_{}.{}", analysis_id, self.extension())
    }
}

/// A rendered export ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub format: ExportFormat,
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub fn export_report(report: &AnalysisReport, format: ExportFormat) -> Result<ExportedFile, ExportError> {
    let document = ReportDocument::from_report(report);
    let bytes = match format {
        ExportFormat::Docx => docx::render(&document)?,
        ExportFormat::Pdf => pdf::render(&document)?,
    };

    Ok(ExportedFile {
        format,
        filename: format.filename(&report.analysis_id),
        bytes,
    })
}
