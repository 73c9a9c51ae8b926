use thiserror::Error;

/// Failures that callers outside the crate need to tell apart.
///
/// They travel inside `anyhow::Error`; use `downcast_ref::<GeostoreError>()` to recover them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeostoreError {
	#[error("{kind} '{id}' not found")]
	NotFound { kind: &'static str, id: String },

	#[error("storage failure: {0}")]
	StorageFailure(String),

	#[error("validation failure: {0}")]
	ValidationFailure(String),

	#[error("a request host or configured tile hostnames are required to build tile URLs")]
	MissingHost,
}

impl GeostoreError {
	pub fn not_found(kind: &'static str, id: &str) -> GeostoreError {
		GeostoreError::NotFound {
			kind,
			id: id.to_string(),
		}
	}

	/// HTTP status for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			GeostoreError::NotFound { .. } => 404,
			GeostoreError::ValidationFailure(_) | GeostoreError::MissingHost => 400,
			GeostoreError::StorageFailure(_) => 500,
		}
	}

	/// Finds a `GeostoreError` anywhere in the chain of `err`.
	pub fn find(err: &anyhow::Error) -> Option<&GeostoreError> {
		err.chain().find_map(|cause| cause.downcast_ref::<GeostoreError>())
	}
}
