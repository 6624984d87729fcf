use crate::errors::AppError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentType {
    Contract,
    Payslip,
    Invoice,
    Policy,
    Procedure,
    Template,
    Report,
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 8] = [
        DocumentType::Contract,
        DocumentType::Payslip,
        DocumentType::Invoice,
        DocumentType::Policy,
        DocumentType::Procedure,
        DocumentType::Template,
        DocumentType::Report,
        DocumentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Contract => "Contract",
            DocumentType::Payslip => "Payslip",
            DocumentType::Invoice => "Invoice",
            DocumentType::Policy => "Policy",
            DocumentType::Procedure => "Procedure",
            DocumentType::Template => "Template",
            DocumentType::Report => "Report",
            DocumentType::Other => "Other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::InvalidDocumentType(wanted.to_string()))
    }
}

/// Stored document metadata (⇔ `documents` row).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub doc_type: DocumentType,
    pub description: Option<String>,
    pub storage_path: String,
    pub created_at: String,
}

/// Metadata for a document about to be stored.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub doc_type: DocumentType,
    pub description: Option<String>,
    pub storage_path: String,
}
