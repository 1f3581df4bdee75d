use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhiteboardError {
    #[error("Room ID must be a 4-digit code.")]
    InvalidRoomId(String),

    #[error("Display name cannot be empty.")]
    EmptyDisplayName,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid drawing action: {0}")]
    InvalidAction(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
}

impl WhiteboardError {
    /// Errors that are reported back to the client that caused them.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WhiteboardError::InvalidRoomId(_) | WhiteboardError::EmptyDisplayName
        )
    }
}

impl From<serde_json::Error> for WhiteboardError {
    fn from(err: serde_json::Error) -> Self {
        WhiteboardError::ParseError(err.to_string())
    }
}
