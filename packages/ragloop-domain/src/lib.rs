pub mod evidence;
pub mod markers;
pub mod normalize;

pub use evidence::{EvidencePassage, Location, format_context, format_sources};
pub use markers::{Route, Sufficiency, parse_judgment, parse_rewrite, parse_route};
pub use normalize::{Normalizer, normalize};
