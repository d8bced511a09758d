use std::sync::LazyLock;

use regex::Regex;

/// Search-noise phrases stripped from every query.
pub const BUILTIN_NOISE_PHRASES: [&str; 1] = ["zur Behandlung"];

// `5.E12`, `5. e 12`, `5.E 12`.
static DOTTED_CODE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)(\d)\.\s*E\s*(\d+)").expect("dotted code pattern is valid")
});
// `5 E12`, `5 e 12`.
static SPACED_CODE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)(\d)\s+E\s*(\d+)").expect("spaced code pattern is valid")
});
static WHITESPACE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static DEFAULT_NORMALIZER: LazyLock<Normalizer> = LazyLock::new(Normalizer::default);

/// Ordered, case-insensitive query rewrites applied before retrieval.
#[derive(Clone, Debug)]
pub struct Normalizer {
	noise: Vec<Regex>,
}
impl Normalizer {
	/// Builds a normalizer that strips `extra_noise_phrases` after the built-in phrases.
	pub fn new<S>(extra_noise_phrases: &[S]) -> Result<Self, regex::Error>
	where
		S: AsRef<str>,
	{
		let mut noise = Vec::new();

		for phrase in BUILTIN_NOISE_PHRASES.iter().copied() {
			noise.push(noise_pattern(phrase)?);
		}
		for phrase in extra_noise_phrases {
			let phrase = phrase.as_ref();

			if phrase.split_whitespace().next().is_none() {
				continue;
			}

			noise.push(noise_pattern(phrase)?);
		}

		Ok(Self { noise })
	}

	/// Rewrites `raw` to its canonical search form.
	///
	/// The rule list is re-applied until the text stops changing. Every effective rewrite
	/// shortens the text or turns whitespace or a lowercase `e` inside a code token into its
	/// canonical form, so the loop reaches a fixed point and the result is idempotent.
	pub fn normalize(&self, raw: &str) -> String {
		let mut current = self.apply_once(raw);

		loop {
			let next = self.apply_once(&current);

			if next == current {
				return current;
			}

			current = next;
		}
	}

	fn apply_once(&self, text: &str) -> String {
		let mut out = DOTTED_CODE.replace_all(text, "$1.E$2").into_owned();

		out = SPACED_CODE.replace_all(&out, "$1.E$2").into_owned();

		for pattern in &self.noise {
			out = pattern.replace_all(&out, "").into_owned();
		}

		WHITESPACE.replace_all(&out, " ").trim().to_string()
	}
}
impl Default for Normalizer {
	fn default() -> Self {
		let noise = BUILTIN_NOISE_PHRASES
			.iter()
			.map(|phrase| noise_pattern(phrase).expect("built-in noise phrase is valid"))
			.collect();

		Self { noise }
	}
}

/// Normalizes with the built-in rules only.
pub fn normalize(raw: &str) -> String {
	DEFAULT_NORMALIZER.normalize(raw)
}

// The phrase must start the text or follow whitespace. A phrase ending in a word character must
// also end on a word boundary, so `Behandlungsdauer` survives while `Behandlung?` is stripped.
fn noise_pattern(phrase: &str) -> Result<Regex, regex::Error> {
	let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
	let tail = match phrase.trim_end().chars().last() {
		Some(ch) if ch.is_alphanumeric() || ch == '_' => r"\b",
		_ => "",
	};

	Regex::new(&format!(r"(?i)(?:^|\s+){}{tail}", words.join(r"\s+")))
}
