use regex::Regex;

/// Stems of words that only express filters ("from 2 million", "newer than 2018").
const FILTER_STEMS: &[&str] = &[
	"from", "to", "up", "under", "over", "below", "above", "between", "within", "less", "more",
	"than", "max", "min", "million", "mln", "thousand", "k", "price", "budget", "cost", "year",
	"old", "new", "mileage", "km", "power", "hp", "engine", "volume", "litre", "liter", "discount",
	"most", "cheap", "expens", "afford", "show",
];

const KNOWN_BRANDS: &[&str] = &[
	"toyota",
	"bmw",
	"mercedes",
	"audi",
	"volkswagen",
	"hyundai",
	"kia",
	"lada",
	"skoda",
	"nissan",
	"mazda",
	"honda",
];

const FULL_IDENTIFIER_CODE: &str = r"^[A-HJ-NPR-Z0-9]{11,17}$";
const PARTIAL_IDENTIFIER_CODE: &str = r"^[A-HJ-NPR-Z0-9]{4,17}$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierCodeKind {
	Full,
	Partial,
	Invalid,
}

pub fn tokenize(text: &str) -> Vec<String> {
	text.split(|ch: char| !ch.is_alphanumeric())
		.filter(|token| !token.is_empty())
		.map(str::to_lowercase)
		.collect()
}

/// True when the text only restates filters, so it must not contribute relevance scoring.
///
/// At least one filter word must appear, no brand may be named, and every alphabetic word longer
/// than three characters must belong to the filter vocabulary.
pub fn is_pure_filter_text(text: &str, brands: &[&str]) -> bool {
	let tokens = tokenize(text);

	if !tokens.iter().any(|token| is_filter_word(token)) {
		return false;
	}
	if tokens.iter().any(|token| is_brand_like(token, brands)) {
		return false;
	}

	tokens.iter().all(|token| {
		token.chars().any(|ch| ch.is_numeric()) || token.chars().count() <= 3 || is_filter_word(token)
	})
}

/// Natural-language projection for similarity search: numeric tokens removed, whitespace
/// collapsed, and at most three preference phrases appended.
pub fn semantic_projection(parts: &[&str], preferences: &[String]) -> String {
	parts
		.iter()
		.copied()
		.chain(preferences.iter().map(String::as_str).filter(|text| !text.trim().is_empty()).take(3))
		.flat_map(str::split_whitespace)
		.filter(|token| !token.chars().any(|ch| ch.is_ascii_digit()))
		.collect::<Vec<_>>()
		.join(" ")
}

/// Share of query tokens found in `text`, in [0, 1].
pub fn lexical_overlap(query: &str, text: &str) -> f32 {
	let query_tokens = tokenize(query);

	if query_tokens.is_empty() {
		return 0.0;
	}

	let text_tokens = tokenize(text);
	let hits = query_tokens.iter().filter(|token| text_tokens.contains(token)).count();

	hits as f32 / query_tokens.len() as f32
}

pub fn identifier_code_kind(code: &str) -> IdentifierCodeKind {
	let code = code.trim().to_ascii_uppercase();

	if matches_pattern(FULL_IDENTIFIER_CODE, &code) {
		IdentifierCodeKind::Full
	} else if matches_pattern(PARTIAL_IDENTIFIER_CODE, &code) {
		IdentifierCodeKind::Partial
	} else {
		IdentifierCodeKind::Invalid
	}
}

fn matches_pattern(pattern: &str, text: &str) -> bool {
	Regex::new(pattern).map(|re| re.is_match(text)).unwrap_or(false)
}

fn is_filter_word(token: &str) -> bool {
	FILTER_STEMS
		.iter()
		.any(|stem| if stem.len() <= 2 { token == *stem } else { token.starts_with(stem) })
}

fn is_brand_like(token: &str, brands: &[&str]) -> bool {
	KNOWN_BRANDS.contains(&token)
		|| brands.iter().any(|brand| brand.trim().eq_ignore_ascii_case(token))
}
