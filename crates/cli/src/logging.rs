use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` overrides the verbosity flag.
pub fn init_logging(verbose: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(verbose > 1)
		.with_writer(std::io::stderr)
		.try_init();
}

fn default_directives(verbose: u8) -> &'static str {
	match verbose {
		0 => "warn,rdp=info,rdp_runtime=info,rdp_bot=info",
		1 => "info",
		_ => "info,rdp=debug,rdp_runtime=debug,rdp_bot=debug",
	}
}
