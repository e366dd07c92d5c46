use clap::ValueEnum;

/// Output format for operator command results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// TOON output (default, compact)
	#[default]
	Toon,
	/// Pretty-printed JSON
	Json,
	/// One JSON object per line
	Ndjson,
	/// Human-readable text
	Text,
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			OutputFormat::Toon => "toon",
			OutputFormat::Json => "json",
			OutputFormat::Ndjson => "ndjson",
			OutputFormat::Text => "text",
		})
	}
}
