use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

const FALLBACK_LOG_LEVEL: &str = "info";

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

/// Installs the global `tracing` subscriber.
///
/// An unparsable `log_level` falls back to `info` instead of failing startup. Logs go to stderr
/// so interactive answers on stdout stay clean.
pub fn init_tracing(log_level: &str) {
	let filter = log_filter(log_level);

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

pub fn log_filter(log_level: &str) -> EnvFilter {
	EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LOG_LEVEL))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invalid_log_level_falls_back_to_info() {
		let filter = log_filter("ragloop=loud");

		assert_eq!(filter.to_string(), FALLBACK_LOG_LEVEL);
	}

	#[test]
	fn directives_are_kept() {
		let filter = log_filter("ragloop_service=debug");

		assert_eq!(filter.to_string(), "ragloop_service=debug");
	}
}
