use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Http(#[from] reqwest::Error),
	#[error(transparent)]
	Qdrant(#[from] Box<qdrant_client::QdrantError>),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Invalid backend response: {0}")]
	InvalidResponse(String),
	#[error("Failed to read inventory at {path:?}.")]
	ReadInventory {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("Failed to parse inventory at {path:?}.")]
	ParseInventory {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},
}
impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Qdrant(Box::new(err))
	}
}
