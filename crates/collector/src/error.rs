#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read configuration: {0}")]
    Config(#[from] config::Error),

    /// The rotating log target could not be created, opened, or written.
    /// Fatal for the owning collector: without a writable target every
    /// further event would be dropped silently.
    #[error("Failed to write audit log: {0}")]
    Io(#[from] std::io::Error),

    #[error("Collector task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
