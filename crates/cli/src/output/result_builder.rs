use std::fmt::Write as _;
use std::time::Instant;

use serde::Serialize;

use crate::output::format::OutputFormat;
use crate::output::model::{
	CommandError, CommandInputs, CommandResult, Diagnostic, DiagnosticLevel, EffectiveConfig, ErrorCode, SCHEMA_VERSION,
};

/// Builder for constructing command results.
pub struct ResultBuilder<T: Serialize> {
	command: String,
	inputs: Option<CommandInputs>,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
	diagnostics: Vec<Diagnostic>,
	config: Option<EffectiveConfig>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			inputs: None,
			data: None,
			error: None,
			start_time: Instant::now(),
			diagnostics: Vec::new(),
			config: None,
		}
	}

	pub fn inputs(mut self, inputs: CommandInputs) -> Self {
		self.inputs = Some(inputs);
		self
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
		});
		self
	}

	pub fn diagnostic_with_source(mut self, level: DiagnosticLevel, message: impl Into<String>, source: impl Into<String>) -> Self {
		self.diagnostics.push(Diagnostic {
			level,
			message: message.into(),
			source: Some(source.into()),
		});
		self
	}

	pub fn config(mut self, config: EffectiveConfig) -> Self {
		self.config = Some(config);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();
		CommandResult {
			schema_version: Some(SCHEMA_VERSION),
			ok,
			command: self.command,
			inputs: self.inputs,
			data: self.data,
			error: self.error,
			duration_ms: Some(self.start_time.elapsed().as_millis() as u64),
			diagnostics: self.diagnostics,
			config: self.config,
		}
	}
}

/// Renders a command result in the specified format.
pub fn render_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) -> String {
	match format {
		OutputFormat::Toon => serde_json::to_value(result).map(|value| toon::encode(&value, None)).unwrap_or_default(),
		OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_default(),
		OutputFormat::Ndjson => serde_json::to_string(result).unwrap_or_default(),
		OutputFormat::Text => render_text(result),
	}
}

/// Print a command result to stdout in the specified format.
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	let rendered = render_result(result, format);
	if format == OutputFormat::Text {
		print!("{rendered}");
	} else {
		println!("{rendered}");
	}
}

fn render_text<T: Serialize>(result: &CommandResult<T>) -> String {
	let mut out = String::new();

	if result.ok {
		if let Some(ref data) = result.data {
			if let Ok(json) = serde_json::to_string_pretty(data) {
				let _ = writeln!(out, "{json}");
			}
		}
	} else if let Some(ref error) = result.error {
		let _ = writeln!(out, "Error [{}]: {}", error.code, error.message);
	}

	for diag in &result.diagnostics {
		let prefix = match diag.level {
			DiagnosticLevel::Info => "info",
			DiagnosticLevel::Warning => "warning",
			DiagnosticLevel::Error => "error",
		};
		match diag.source {
			Some(ref source) => {
				let _ = writeln!(out, "[{prefix}:{source}] {}", diag.message);
			}
			None => {
				let _ = writeln!(out, "[{prefix}] {}", diag.message);
			}
		}
	}

	if let Some(duration_ms) = result.duration_ms {
		let _ = writeln!(out, "Completed in {duration_ms}ms");
	}
	out
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn result_without_data_is_not_ok() {
		let result: CommandResult<()> = ResultBuilder::new("status").build();
		assert!(!result.ok);
		assert_eq!(result.schema_version, Some(SCHEMA_VERSION));
	}

	#[test]
	fn json_output_uses_camel_case_and_error_codes() {
		let result: CommandResult<()> = ResultBuilder::new("reset")
			.inputs(CommandInputs {
				caller: Some("42".into()),
				..Default::default()
			})
			.error(ErrorCode::NotOwner, "the active session belongs to 7")
			.build();

		let value: serde_json::Value = serde_json::from_str(&render_result(&result, OutputFormat::Json)).unwrap();
		assert_eq!(value["ok"], json!(false));
		assert_eq!(value["command"], json!("reset"));
		assert_eq!(value["inputs"], json!({ "caller": "42" }));
		assert_eq!(value["error"]["code"], json!("NOT_OWNER"));
		assert!(value.get("schemaVersion").is_some());
		assert!(value.get("durationMs").is_some());
	}

	#[test]
	fn ndjson_is_a_single_line() {
		let result = ResultBuilder::new("status").data(json!({ "status": "stopped" })).build();
		let rendered = render_result(&result, OutputFormat::Ndjson);
		assert!(!rendered.contains('\n'));
		assert!(rendered.contains("\"ok\":true"));
	}

	#[test]
	fn text_output_reports_error_and_diagnostics() {
		let result: CommandResult<()> = ResultBuilder::new("reset")
			.error(ErrorCode::RaceLost, "another request took the session lock first")
			.diagnostic_with_source(DiagnosticLevel::Warning, "retry shortly", "lock")
			.build();

		let text = render_result(&result, OutputFormat::Text);
		assert!(text.starts_with("Error [RACE_LOST]: another request took the session lock first\n"));
		assert!(text.contains("[warning:lock] retry shortly"));
		assert!(text.contains("Completed in"));
	}
}
