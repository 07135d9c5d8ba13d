use std::path::PathBuf;

/// Errors raised when configuring the editor
///
/// Gesture handling and annotation commands never fail; a missing page,
/// annotation or redo entry is a silent no-op. Only settings and
/// configuration input is validated.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("stroke width must be positive, got {0}")]
    InvalidStrokeWidth(f64),
    #[error("alpha must be within 0..=1, got {0}")]
    InvalidAlpha(f32),
    #[error("invalid value for configuration key {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },
    #[error("failed to read configuration {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("configuration serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type EditorResult<T> = Result<T, EditorError>;
