/// Error type shared by asset loading, snapshots, export and the gallery.
///
/// None of these are fatal to a painting session: callers log them and keep
/// the surface in its last valid state.
#[derive(Debug)]
pub enum PaintError {
    Io(std::io::Error),
    Image(image::ImageError),
    /// Gallery value could not be encoded or decoded.
    Storage(String),
    /// Asset key not present in the asset source.
    AssetMissing(String),
    /// Malformed user input (hex color, script line, settings value).
    InvalidInput(String),
}

impl std::fmt::Display for PaintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaintError::Io(e) => write!(f, "I/O error: {}", e),
            PaintError::Image(e) => write!(f, "Image error: {}", e),
            PaintError::Storage(e) => write!(f, "Storage error: {}", e),
            PaintError::AssetMissing(key) => write!(f, "Asset not found: {}", key),
            PaintError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
        }
    }
}

impl std::error::Error for PaintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaintError::Io(e) => Some(e),
            PaintError::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PaintError {
    fn from(e: std::io::Error) -> Self {
        PaintError::Io(e)
    }
}

impl From<image::ImageError> for PaintError {
    fn from(e: image::ImageError) -> Self {
        PaintError::Image(e)
    }
}

impl From<Box<bincode::ErrorKind>> for PaintError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        PaintError::Storage(e.to_string())
    }
}
