use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("Failed to read archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Package is missing part: {0}")]
    MissingPart(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid text encoding in {0}")]
    Encoding(String),
}

impl DocxError {
    /// True when the error came from a file that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocxError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
