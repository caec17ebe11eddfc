use serde_json::Value;

use crate::{Error, Result};

/// Resolve the search cluster's basic-auth pair.
///
/// Inline credentials win; otherwise the configured environment variable must
/// hold a JSON payload with `username` and `password` keys. Every failure here
/// is a configuration error, never a network one.
pub fn cluster_basic_auth(cluster: &sba_config::Cluster) -> Result<(String, String)> {
	if let (Some(username), Some(password)) = (&cluster.username, &cluster.password) {
		return Ok((username.clone(), password.clone()));
	}

	let Some(env_name) = cluster.secret_env.as_deref() else {
		return Err(Error::InvalidConfig {
			message: "Cluster auth requires secret_env or an inline username and password."
				.to_string(),
		});
	};
	let payload = std::env::var(env_name).map_err(|_| Error::InvalidConfig {
		message: format!("Basic-auth secret environment variable {env_name} is not set."),
	})?;

	parse_basic_auth(&payload)
}

pub fn parse_basic_auth(payload: &str) -> Result<(String, String)> {
	let value: Value = serde_json::from_str(payload).map_err(|_| Error::InvalidConfig {
		message: "Basic-auth secret payload is not valid JSON.".to_string(),
	})?;
	let field = |key: &str| {
		value.get(key).and_then(|v| v.as_str()).map(str::to_string).ok_or_else(|| {
			Error::InvalidConfig {
				message: format!("Basic-auth secret payload is missing {key}."),
			}
		})
	};

	Ok((field("username")?, field("password")?))
}
