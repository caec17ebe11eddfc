use serde_json::Value;

const SECRET_KEY_FRAGMENTS: [&str; 7] =
	["password", "secret", "token", "authorization", "api_key", "apikey", "auth"];

/// Default predicate: does this key name look like it holds a secret?
pub fn secret_like_key(key: &str) -> bool {
	let lowered = key.to_lowercase();

	SECRET_KEY_FRAGMENTS.iter().any(|fragment| lowered.contains(fragment))
}

/// Replace values under secret-like keys, recursively. The predicate is
/// pluggable; values themselves are never inspected.
pub fn redact(value: Value, is_secret: &dyn Fn(&str) -> bool) -> Value {
	match value {
		Value::Object(map) => Value::Object(
			map.into_iter()
				.map(|(key, inner)| {
					if is_secret(&key) {
						(key, Value::String("***REDACTED***".to_string()))
					} else {
						(key, redact(inner, is_secret))
					}
				})
				.collect(),
		),
		Value::Array(items) => {
			Value::Array(items.into_iter().map(|item| redact(item, is_secret)).collect())
		},
		other => other,
	}
}
