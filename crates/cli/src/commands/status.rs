use rdp::SessionBroker;

use crate::error::Result;
use crate::output::{DiagnosticLevel, ResultBuilder, StatusData};

pub async fn execute(broker: &SessionBroker) -> Result<StatusData> {
	let doc = broker.query().await?;
	Ok(StatusData::from(&doc))
}

/// Flags an active session the workflow has not reported back on yet.
pub fn diagnose(builder: ResultBuilder<StatusData>, data: &StatusData) -> ResultBuilder<StatusData> {
	if data.active && data.endpoint.is_none() && data.web.is_none() {
		builder.diagnostic_with_source(
			DiagnosticLevel::Info,
			"session is active but the workflow has not published connection details yet",
			"workflow",
		)
	} else {
		builder
	}
}
