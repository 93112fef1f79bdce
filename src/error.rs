//! Error types for the editor core.

use thiserror::Error;

/// Errors raised by the editor core.
///
/// Live gestures never produce these: everything that can fail is validated
/// before a gesture begins.
#[derive(Error, Debug)]
pub enum EditorError {
    /// An operation referenced an element that is not in the scene or sheet.
    #[error("unknown element `{0}`")]
    UnknownElement(String),

    /// Resize limits that cannot describe any box.
    #[error("malformed resize limits: {0}")]
    MalformedLimits(String),

    /// No page with this number.
    #[error("unknown page {0}")]
    UnknownPage(u32),

    /// No diagram with this id.
    #[error("unknown diagram `{0}`")]
    UnknownDiagram(String),

    /// Two features on one page would share a scene id.
    #[error("id `{id}` is used more than once on page {page}")]
    DuplicateId {
        /// Page holding the clash
        page: u32,
        /// The reused id
        id: String,
    },

    /// Paste with an empty clipboard.
    #[error("nothing to paste")]
    EmptyClipboard,

    /// The shared scene was already borrowed when an operation needed it.
    #[error("scene is busy")]
    SceneBusy,

    /// A configuration file that is not valid TOML for [`crate::EditorConfig`].
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A sheet or clipboard payload that is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
