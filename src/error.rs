use thiserror::Error;

/// Errors surfaced by the Ketra N4 client.
#[derive(Debug, Error)]
pub enum KetraError {
    /// An entity with this id was already registered within its command class.
    #[error("id exists: {0}")]
    IdExists(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Discovery gave up after the bounded number of broadcast attempts.
    #[error("no N4 device found for serial {0}")]
    DeviceNotFound(String),

    #[error("unexpected HTTP status {0} from controller")]
    HttpStatus(u16),

    #[error("invalid request URI: {0}")]
    Uri(#[from] hyper::http::uri::InvalidUri),

    #[error(transparent)]
    Request(#[from] hyper::http::Error),

    #[error(transparent)]
    Http(#[from] hyper::Error),

    #[error(transparent)]
    Tls(#[from] native_tls::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Decode(#[from] serde_path_to_error::Error<serde_json::Error>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
