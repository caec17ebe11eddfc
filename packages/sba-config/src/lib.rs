mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Audit, Cluster, Config, EmbeddingProviderConfig, Providers, ReasoningProviderConfig, Retrieval,
	Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.cluster.endpoint.trim().is_empty() {
		return Err(Error::Validation {
			message: "cluster.endpoint must be non-empty.".to_string(),
		});
	}
	if cfg.cluster.secret_env.is_none()
		&& (cfg.cluster.username.is_none() || cfg.cluster.password.is_none())
	{
		return Err(Error::Validation {
			message: "cluster auth requires secret_env or an inline username and password."
				.to_string(),
		});
	}
	if cfg.retrieval.index_a.trim().is_empty() || cfg.retrieval.index_b.trim().is_empty() {
		return Err(Error::Validation {
			message: "retrieval.index_a and retrieval.index_b must be non-empty.".to_string(),
		});
	}
	if cfg.retrieval.vector_dim == 0 {
		return Err(Error::Validation {
			message: "retrieval.vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.retrieval.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match retrieval.vector_dim.".to_string(),
		});
	}
	if cfg.retrieval.top_k_per_index == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k_per_index must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.rerank_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.rerank_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.vector_field_candidates.is_empty() {
		return Err(Error::Validation {
			message: "retrieval.vector_field_candidates must be non-empty.".to_string(),
		});
	}
	for (label, chars) in [
		("retrieval.snippet_max_chars", cfg.retrieval.snippet_max_chars),
		("retrieval.rerank_snippet_chars", cfg.retrieval.rerank_snippet_chars),
		("retrieval.rerank_tags_chars", cfg.retrieval.rerank_tags_chars),
	] {
		if chars == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}
	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("reasoning", &cfg.providers.reasoning.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}
	if let Some(audit) = cfg.audit.as_ref() {
		if audit.endpoint.trim().is_empty() {
			return Err(Error::Validation {
				message: "audit.endpoint must be non-empty when audit is configured.".to_string(),
			});
		}
		if audit.bucket.trim().is_empty() {
			return Err(Error::Validation {
				message: "audit.bucket must be non-empty when audit is configured.".to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	while cfg.cluster.endpoint.ends_with('/') {
		cfg.cluster.endpoint.pop();
	}
	if cfg.cluster.secret_env.as_deref().map(|env| env.trim().is_empty()).unwrap_or(false) {
		cfg.cluster.secret_env = None;
	}
	if cfg.cluster.username.as_deref().map(|user| user.trim().is_empty()).unwrap_or(false) {
		cfg.cluster.username = None;
	}
	if cfg.cluster.password.as_deref().map(|pass| pass.trim().is_empty()).unwrap_or(false) {
		cfg.cluster.password = None;
	}
}
