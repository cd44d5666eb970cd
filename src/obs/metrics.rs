// self
use crate::{obs::CallOutcome, rpc::Method};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(method: Method, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"laptop_catalog_call_total",
			"method" => method.name(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (method, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_call_outcome_without_recorder_is_noop() {
		record_call_outcome(Method::CreateLaptop, CallOutcome::Failure);
	}
}
