//! Document type and its default extraction method.

use serde::{Deserialize, Serialize};

/// Document container format recognized by the ingestion core. Closed set,
/// matching the extractor map the worker fleet understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Docx,
    Pptx,
    Html,
    Xml,
    Excel,
    Csv,
    Parquet,
}

impl DocumentType {
    /// The extraction method used when a task doesn't specify one.
    pub fn default_method(self) -> &'static str {
        match self {
            DocumentType::Pdf => "pymupdf",
            DocumentType::Docx => "python_docx",
            DocumentType::Pptx => "python_pptx",
            DocumentType::Html => "beautifulsoup",
            DocumentType::Xml => "lxml",
            DocumentType::Excel => "openpyxl",
            DocumentType::Csv => "pandas",
            DocumentType::Parquet => "pandas",
        }
    }

    /// The allow-list of extraction methods valid for this document type.
    ///
    /// `pdf` and `docx` carry a full allow-list of alternative methods; the
    /// remaining types only support their single default extractor (the
    /// original schema never defined an allow-list for them).
    pub fn allowed_methods(self) -> &'static [&'static str] {
        match self {
            DocumentType::Pdf => &[
                "pymupdf",
                "eclair",
                "haystack",
                "tika",
                "unstructured_local",
                "unstructured_service",
                "llama_parse",
            ],
            DocumentType::Docx => &[
                "python_docx",
                "haystack",
                "unstructured_local",
                "unstructured_service",
            ],
            DocumentType::Pptx => &["python_pptx"],
            DocumentType::Html => &["beautifulsoup"],
            DocumentType::Xml => &["lxml"],
            DocumentType::Excel => &["openpyxl"],
            DocumentType::Csv => &["pandas"],
            DocumentType::Parquet => &["pandas"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Docx => "docx",
            DocumentType::Pptx => "pptx",
            DocumentType::Html => "html",
            DocumentType::Xml => "xml",
            DocumentType::Excel => "excel",
            DocumentType::Csv => "csv",
            DocumentType::Parquet => "parquet",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pdf" => Some(DocumentType::Pdf),
            "docx" => Some(DocumentType::Docx),
            "pptx" => Some(DocumentType::Pptx),
            "html" => Some(DocumentType::Html),
            "xml" => Some(DocumentType::Xml),
            "excel" => Some(DocumentType::Excel),
            "csv" => Some(DocumentType::Csv),
            "parquet" => Some(DocumentType::Parquet),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_method_matches_extractor_map() {
        assert_eq!(DocumentType::Pdf.default_method(), "pymupdf");
        assert_eq!(DocumentType::Docx.default_method(), "python_docx");
        assert_eq!(DocumentType::Csv.default_method(), "pandas");
    }

    #[test]
    fn pdf_allows_eclair() {
        assert!(DocumentType::Pdf.allowed_methods().contains(&"eclair"));
    }

    #[test]
    fn docx_rejects_eclair() {
        assert!(!DocumentType::Docx.allowed_methods().contains(&"eclair"));
    }

    #[test]
    fn round_trip_via_str() {
        for dt in [
            DocumentType::Pdf,
            DocumentType::Docx,
            DocumentType::Pptx,
            DocumentType::Html,
            DocumentType::Xml,
            DocumentType::Excel,
            DocumentType::Csv,
            DocumentType::Parquet,
        ] {
            assert_eq!(DocumentType::parse(dt.as_str()), Some(dt));
        }
    }
}
