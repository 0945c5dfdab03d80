use quire_tasks::CommandError;

/// Errors raised by release tasks.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("Specify option(s) of {}.", .0.join(", "))]
    MissingEnv(Vec<String>),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid user config {path}: {message}")]
    UserConfig { path: String, message: String },

    #[error("No upload user: set [publish] user or create {0}")]
    MissingUser(String),

    #[error("No upload host: set [publish] host")]
    MissingHost,

    #[error(transparent)]
    Command(#[from] CommandError),
}
