use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid DOCX container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Missing package part: {0}")]
    MissingPart(String),

    #[error("Package part {0} is not valid UTF-8")]
    Encoding(String),

    #[error("Malformed document XML at byte {position}: {message}")]
    Xml { position: usize, message: String },
}

pub type Result<T> = std::result::Result<T, DocxError>;
