pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{backend} backend unavailable: {message}")]
	BackendUnavailable { backend: &'static str, message: String },
	#[error("Invalid value for {field}: {message}")]
	InvalidFieldValue { field: String, message: String },
	#[error("Constraint selector did not answer within {timeout_ms} ms.")]
	ClassifierTimeout { timeout_ms: u64 },
	#[error("Search was cancelled.")]
	Cancelled,
	#[error("Configuration error: {message}")]
	Config { message: String },
	#[error("Internal error: {message}")]
	Internal { message: String },
}
impl From<carlot_config::Error> for Error {
	fn from(err: carlot_config::Error) -> Self {
		Self::Config { message: err.to_string() }
	}
}

impl From<carlot_storage::Error> for Error {
	fn from(err: carlot_storage::Error) -> Self {
		Self::Config { message: err.to_string() }
	}
}
