// crates.io
use tracing::{Instrument, instrument::Instrumented};
// self
use crate::{_prelude::*, rpc::Method};

/// A span tagging all work done on behalf of one call.
#[derive(Clone, Debug)]
pub struct CallSpan {
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided method + stage.
	pub fn new(method: Method, stage: &'static str) -> Self {
		Self { span: tracing::info_span!("laptop_catalog.call", method = method.name(), stage) }
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> tracing::span::EnteredSpan {
		self.span.entered()
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}
