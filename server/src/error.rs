use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("placed {placed} of {target} items; no clear spot found after {attempts} attempts")]
    ItemPlacement {
        placed: usize,
        target: usize,
        attempts: u32,
    },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("world generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),
}
