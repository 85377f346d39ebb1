use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, FormatError>;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Submesh `{0}` holds a partial triangle")]
    UnalignedSubmesh(String),
}
