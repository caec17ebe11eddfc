use std::{
	collections::HashMap,
	sync::Mutex,
};

use serde_json::{Map, Value};

use crate::{Error, Result, SearchBackend};

/// Reserved field type the cluster declares for dense vector fields.
pub const DENSE_VECTOR_TYPE: &str = "knn_vector";

/// A resolved vector field on one index: name, declared type, and declared
/// dimensionality when the mapping carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorField {
	pub name: String,
	pub field_type: String,
	pub dims: Option<u32>,
}

/// Process-lifetime caches for mapping lookups.
///
/// Both maps are write-once per key and monotonic; concurrent callers may race
/// to populate the same key with identical content, which is harmless. The
/// lock is scoped to single reads and inserts. `clear` exists for test
/// isolation only.
#[derive(Debug, Default)]
pub struct MappingCache {
	/// Raw nested field-spec lookups, keyed `index:field`. Misses are cached
	/// as empty objects; only the resolved pick below is required to exist.
	field_specs: Mutex<HashMap<String, Value>>,
	/// Resolved vector-field choice, keyed by index.
	picks: Mutex<HashMap<String, VectorField>>,
}

impl MappingCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn clear(&self) {
		self.field_specs.lock().unwrap_or_else(|err| err.into_inner()).clear();
		self.picks.lock().unwrap_or_else(|err| err.into_inner()).clear();
	}

	fn cached_pick(&self, index: &str) -> Option<VectorField> {
		self.picks.lock().unwrap_or_else(|err| err.into_inner()).get(index).cloned()
	}

	fn store_pick(&self, index: &str, pick: VectorField) {
		self.picks
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.insert(index.to_string(), pick);
	}

	fn cached_spec(&self, key: &str) -> Option<Value> {
		self.field_specs.lock().unwrap_or_else(|err| err.into_inner()).get(key).cloned()
	}

	fn store_spec(&self, key: String, spec: Value) {
		self.field_specs.lock().unwrap_or_else(|err| err.into_inner()).insert(key, spec);
	}
}

/// Identify which field of `index` holds dense vector embeddings.
///
/// Conventional names are probed first, in order; if none is declared as
/// `knn_vector` the full mapping is scanned for any dense vector field. A miss
/// is a hard error and is never cached, so a later mapping change can still
/// succeed.
pub async fn resolve_vector_field(
	backend: &dyn SearchBackend,
	cache: &MappingCache,
	index: &str,
	candidates: &[String],
) -> Result<VectorField> {
	if let Some(pick) = cache.cached_pick(index) {
		return Ok(pick);
	}

	for candidate in candidates {
		let spec = field_spec(backend, cache, index, candidate).await?;
		if spec.get("type").and_then(|v| v.as_str()) == Some(DENSE_VECTOR_TYPE) {
			let pick = VectorField {
				name: candidate.clone(),
				field_type: DENSE_VECTOR_TYPE.to_string(),
				dims: declared_dims(&spec),
			};

			cache.store_pick(index, pick.clone());

			return Ok(pick);
		}
	}

	// None of the conventional names matched; scan the whole schema for any
	// dense vector field. Iteration order is deterministic for identical
	// mappings.
	let mapping = backend.get_mapping(index).await?;
	for spec in mapping.as_object().into_iter().flat_map(Map::values) {
		let props = spec
			.get("mappings")
			.and_then(|v| v.get("properties"))
			.and_then(|v| v.as_object());
		for (name, def) in props.into_iter().flatten() {
			if def.get("type").and_then(|v| v.as_str()) == Some(DENSE_VECTOR_TYPE) {
				let pick = VectorField {
					name: name.clone(),
					field_type: DENSE_VECTOR_TYPE.to_string(),
					dims: declared_dims(def),
				};

				cache.store_pick(index, pick.clone());

				return Ok(pick);
			}
		}
	}

	Err(Error::VectorFieldNotFound { index: index.to_string(), tried: candidates.to_vec() })
}

/// Fetch the nested field-type declaration for `field` on `index`, walking
/// dotted paths through `properties` sub-objects. Lookup results, including
/// misses, are cached per `index:field`.
async fn field_spec(
	backend: &dyn SearchBackend,
	cache: &MappingCache,
	index: &str,
	field: &str,
) -> Result<Value> {
	let key = format!("{index}:{field}");
	if let Some(spec) = cache.cached_spec(&key) {
		return Ok(spec);
	}

	let mapping = backend.get_mapping(index).await?;
	let spec = lookup_field(&mapping, field);

	cache.store_spec(key, spec.clone());

	Ok(spec)
}

fn lookup_field(mapping: &Value, field: &str) -> Value {
	let parts = field.split('.').collect::<Vec<_>>();

	for spec in mapping.as_object().into_iter().flat_map(Map::values) {
		let Some(props) = spec.get("mappings").and_then(|v| v.get("properties")) else {
			continue;
		};
		let mut cur = props;
		let mut ok = true;
		for (i, part) in parts.iter().enumerate() {
			match cur.get(part) {
				Some(next) => {
					cur = next;
					if i < parts.len() - 1
						&& let Some(nested) = cur.get("properties")
					{
						cur = nested;
					}
				},
				None => {
					ok = false;

					break;
				},
			}
		}
		if ok && cur.is_object() && cur.get("type").is_some() {
			return cur.clone();
		}
	}

	Value::Object(Map::new())
}

fn declared_dims(spec: &Value) -> Option<u32> {
	["dimension", "dims", "dimensions"]
		.into_iter()
		.find_map(|key| spec.get(key))
		.and_then(|v| v.as_u64())
		.map(|dims| dims as u32)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn walks_dotted_field_paths() {
		let mapping = serde_json::json!({
			"business_chunks_v2": {
				"mappings": {
					"properties": {
						"nested": {
							"properties": {
								"embedding": { "type": "knn_vector", "dimension": 1024 }
							}
						}
					}
				}
			}
		});
		let spec = lookup_field(&mapping, "nested.embedding");

		assert_eq!(spec.get("type").and_then(|v| v.as_str()), Some("knn_vector"));
		assert_eq!(declared_dims(&spec), Some(1_024));
	}

	#[test]
	fn missing_field_yields_empty_spec() {
		let mapping = serde_json::json!({
			"business_chunks_v2": { "mappings": { "properties": {} } }
		});

		assert_eq!(lookup_field(&mapping, "embedding"), serde_json::json!({}));
	}

	#[test]
	fn reads_alternate_dims_keys() {
		assert_eq!(declared_dims(&serde_json::json!({ "dims": 256 })), Some(256));
		assert_eq!(declared_dims(&serde_json::json!({ "dimensions": 512 })), Some(512));
		assert_eq!(declared_dims(&serde_json::json!({ "type": "keyword" })), None);
	}
}
