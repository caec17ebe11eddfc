pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("Cluster returned {status} for {index}: {message}")]
	Cluster { index: String, status: u16, message: String },
	#[error("No knn_vector field found in index {index:?}. Tried {tried:?}.")]
	VectorFieldNotFound { index: String, tried: Vec<String> },
	#[error(
		"Vector dimension mismatch on {index}: mapping declares {expected}, query has {actual}."
	)]
	Dimension { index: String, expected: usize, actual: usize },
	#[error(
		"k-NN failed on {index}. query.knn error: {nested_cause}; top-level knn error: {top_level_cause}"
	)]
	Search { index: String, nested_cause: String, top_level_cause: String },
	#[error("Cluster liveness check failed at {endpoint}.")]
	Ping { endpoint: String },
}
