pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Configuration error: {message}")]
	Configuration { message: String },
	#[error("Validation error: {message}")]
	Validation { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Search error: {message}")]
	Search { message: String },
	#[error("Rerank parse error: {message}")]
	RerankParse { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}

impl From<sba_search::Error> for Error {
	fn from(err: sba_search::Error) -> Self {
		match err {
			sba_search::Error::InvalidConfig { message } => Self::Configuration { message },
			sba_search::Error::Dimension { .. } => Self::Validation { message: err.to_string() },
			sba_search::Error::VectorFieldNotFound { .. } => {
				Self::NotFound { message: err.to_string() }
			},
			sba_search::Error::Reqwest(_)
			| sba_search::Error::Cluster { .. }
			| sba_search::Error::Search { .. }
			| sba_search::Error::Ping { .. } => Self::Search { message: err.to_string() },
		}
	}
}

impl From<sba_providers::Error> for Error {
	fn from(err: sba_providers::Error) -> Self {
		match err {
			sba_providers::Error::InvalidConfig { message } => Self::Configuration { message },
			sba_providers::Error::Dimension { .. } => {
				Self::Validation { message: err.to_string() }
			},
			_ => Self::Provider { message: err.to_string() },
		}
	}
}

impl From<sba_config::Error> for Error {
	fn from(err: sba_config::Error) -> Self {
		Self::Configuration { message: err.to_string() }
	}
}
