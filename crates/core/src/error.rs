#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Ambiguous remote match: {count} remote scripts are named '{name}'")]
    AmbiguousRemote { name: String, count: usize },

    #[error("Failed to read {file_name}: {reason}")]
    Io { file_name: String, reason: String },

    #[error("{file_name} is not valid UTF-8 text: {reason}")]
    Encoding { file_name: String, reason: String },
}
