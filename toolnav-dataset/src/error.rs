use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No tool entries found in {0}")]
    EmptyDataset(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
