use std::fmt;

/// Upload formats the extractor understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Pptx,
}

impl DocumentKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "pptx" => Some(DocumentKind::Pptx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::Pptx => "pptx",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Raw upload bytes plus the extension declared by the filename.
/// Lives only for the duration of a single extraction.
#[derive(Clone)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub extension: String,
}

impl Document {
    pub fn new(bytes: Vec<u8>, extension: impl Into<String>) -> Self {
        Self {
            bytes,
            extension: extension.into().to_ascii_lowercase(),
        }
    }

    pub fn from_upload(filename: &str, bytes: Vec<u8>) -> Self {
        Self::new(bytes, extension_of(filename))
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_extension(&self.extension)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("extension", &self.extension)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Lowercased suffix after the last `.` of a filename, or `""` when there is none.
pub fn extension_of(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}
