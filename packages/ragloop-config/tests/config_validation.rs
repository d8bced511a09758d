use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use ragloop_config::Error;

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_with(section: &[&str], key: &str, value: Value) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let mut table = root.as_table_mut().expect("Sample config must be a table.");

	for name in section {
		table = table
			.get_mut(*name)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Sample config must include [{name}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("ragloop_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn expect_validation(payload: String, expected: &str) {
	let err = ragloop_config::from_toml_str(&payload).expect_err("Expected validation error.");
	let message = err.to_string();

	assert!(matches!(err, Error::Validation { .. }), "Unexpected error kind: {err:?}");
	assert!(message.contains(expected), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads_from_disk() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML.to_string());
	let result = ragloop_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Sample config should load.");

	assert_eq!(cfg.retrieval.top_k, 10);
	assert_eq!(cfg.retrieval.context_limit, 5);
	assert_eq!(cfg.orchestrator.max_retries, 2);
	assert_eq!(cfg.orchestrator.judge, "model");
	assert_eq!(cfg.normalizer.noise_phrases, vec!["zur Behandlung".to_string()]);
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("ragloop_config_test_missing_file.toml");
	let err = ragloop_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error kind: {err:?}");
}

#[test]
fn malformed_toml_reports_path() {
	let path = write_temp_config("[service\nhttp_bind = ".to_string());
	let result = ragloop_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	match result.expect_err("Expected parse error.") {
		Error::ParseConfig { path: reported, .. } => assert_eq!(reported, path),
		other => panic!("Unexpected error kind: {other:?}"),
	}
}

#[test]
fn max_retries_must_be_positive() {
	expect_validation(
		sample_with(&["orchestrator"], "max_retries", Value::Integer(0)),
		"orchestrator.max_retries must be greater than zero.",
	);
}

#[test]
fn judge_mode_must_be_known() {
	expect_validation(
		sample_with(&["orchestrator"], "judge", Value::String("oracle".to_string())),
		"orchestrator.judge must be one of model or evidence.",
	);
}

#[test]
fn judge_mode_is_normalized() {
	let payload = sample_with(&["orchestrator"], "judge", Value::String(" Evidence ".to_string()));
	let cfg = ragloop_config::from_toml_str(&payload).expect("Config should load.");

	assert_eq!(cfg.orchestrator.judge, "evidence");
}

#[test]
fn top_k_must_be_positive() {
	expect_validation(
		sample_with(&["retrieval"], "top_k", Value::Integer(0)),
		"retrieval.top_k must be greater than zero.",
	);
}

#[test]
fn context_limit_must_be_positive() {
	expect_validation(
		sample_with(&["retrieval"], "context_limit", Value::Integer(0)),
		"retrieval.context_limit must be greater than zero.",
	);
}

#[test]
fn embedding_dimensions_must_match_qdrant() {
	expect_validation(
		sample_with(&["storage", "qdrant"], "vector_dim", Value::Integer(768)),
		"providers.embedding.dimensions must match storage.qdrant.vector_dim.",
	);
}

#[test]
fn llm_api_key_must_be_present() {
	expect_validation(
		sample_with(&["providers", "llm"], "api_key", Value::String("  ".to_string())),
		"Provider llm api_key must be non-empty.",
	);
}

#[test]
fn temperature_must_be_in_range() {
	expect_validation(
		sample_with(&["providers", "llm"], "temperature", Value::Float(3.5)),
		"providers.llm.temperature must be in the range 0.0-2.0.",
	);
}

#[test]
fn blank_noise_phrases_are_dropped() {
	let payload = sample_with(
		&["normalizer"],
		"noise_phrases",
		Value::Array(vec![
			Value::String("  bitte   sehr ".to_string()),
			Value::String("   ".to_string()),
		]),
	);
	let cfg = ragloop_config::from_toml_str(&payload).expect("Config should load.");

	assert_eq!(cfg.normalizer.noise_phrases, vec!["bitte sehr".to_string()]);
}

#[test]
fn normalizer_section_is_optional() {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");

	root.as_table_mut().expect("Sample config must be a table.").remove("normalizer");

	let payload = toml::to_string(&root).expect("Failed to render sample config.");
	let cfg = ragloop_config::from_toml_str(&payload).expect("Config should load.");

	assert!(cfg.normalizer.noise_phrases.is_empty());
}
