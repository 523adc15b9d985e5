use serde_json::Value;

/// Upstream message the discovery service sends once the monthly free-query quota is used up.
pub const QUOTA_EXCEEDED_MESSAGE: &str = "Number of free queries per month exceeded";

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// `body` is the upstream error payload, `Null` when it was not JSON.
	#[error("{message}")]
	RateLimited { message: String, body: Value },
	#[error("Discovery service error {status}: {message}")]
	Upstream { status: u16, message: String, body: Value },
	#[error("Discovery service unavailable: {message}")]
	Unavailable { message: String },
	#[error("Startup failed during {stage}: {message}")]
	Startup { stage: &'static str, message: String },
}
impl Error {
	/// HTTP status the error maps to when surfaced to a client.
	pub fn status(&self) -> u16 {
		match self {
			Self::RateLimited { .. } => 429,
			Self::Upstream { status, .. } => *status,
			Self::Unavailable { .. } => 502,
			Self::Startup { .. } => 503,
		}
	}

	/// Upstream error payload, if the service sent one.
	pub fn body(&self) -> Option<&Value> {
		match self {
			Self::RateLimited { body, .. } | Self::Upstream { body, .. } if !body.is_null() =>
				Some(body),
			_ => None,
		}
	}

	pub fn message(&self) -> String {
		match self {
			Self::RateLimited { message, .. }
			| Self::Upstream { message, .. }
			| Self::Unavailable { message }
			| Self::Startup { message, .. } => message.clone(),
		}
	}
}

impl From<disco_providers::Error> for Error {
	fn from(err: disco_providers::Error) -> Self {
		match err {
			disco_providers::Error::Upstream { status, message, body }
				if status == 429 || message == QUOTA_EXCEEDED_MESSAGE =>
				Self::RateLimited { message, body },
			disco_providers::Error::Upstream { status, message, body } =>
				Self::Upstream { status, message, body },
			other => Self::Unavailable { message: other.to_string() },
		}
	}
}
