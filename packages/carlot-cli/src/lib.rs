use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

/// Package version, shown by `--version` on every binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

#[cfg(test)]
mod tests {
	use crate::VERSION;

	#[test]
	fn version_is_not_empty() {
		assert!(!VERSION.is_empty());
	}
}
