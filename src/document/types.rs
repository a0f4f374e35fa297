//! Core document types

use serde::{Deserialize, Serialize};

/// Document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
}

impl DocumentFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Detect format from magic bytes
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PDF magic: %PDF
        if bytes.starts_with(b"%PDF") {
            return Some(Self::Pdf);
        }

        None
    }

    /// File extension used for stored uploads
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
        }
    }

    /// MIME type understood by MuPDF
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
        }
    }
}

/// A rasterized page, PNG encoded
#[derive(Debug, Clone)]
pub struct PageBitmap {
    /// PNG bytes
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl PageBitmap {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_magic_bytes() {
        assert_eq!(
            DocumentFormat::from_magic_bytes(b"%PDF-1.7\n..."),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(DocumentFormat::from_magic_bytes(b"PK\x03\x04rest"), None);
        assert_eq!(DocumentFormat::from_magic_bytes(b"%P"), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("epub"), None);
    }

    #[test]
    fn test_empty_bitmap() {
        let bitmap = PageBitmap {
            data: Vec::new(),
            width: 10,
            height: 10,
        };
        assert!(bitmap.is_empty());
    }
}
