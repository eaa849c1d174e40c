use std::borrow::Cow;

use opentelemetry::trace::{Span as _, SpanKind, Status, TraceContextExt, Tracer as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::{Span, Tracer};
use tierchain_core::ids::Correlation;

/// Instrumentation scope for every handler span.
pub const INSTRUMENTATION_NAME: &str = "tierchain";

/// Owns one handler span and ends it when dropped, so early returns,
/// errors and cancelled futures all close the span exactly once.
pub struct SpanGuard {
    span: Span,
}

impl SpanGuard {
    pub fn start(tracer: &Tracer, name: &'static str, parent: &Context) -> Self {
        let span = tracer
            .span_builder(name)
            .with_kind(SpanKind::Server)
            .start_with_context(tracer, parent);
        Self { span }
    }

    pub fn correlation(&self) -> Correlation {
        let sc = self.span.span_context();
        if !sc.is_valid() {
            return Correlation::default();
        }
        Correlation::from_hex(&sc.trace_id().to_string(), &sc.span_id().to_string())
    }

    /// Context to forward to the next hop.
    pub fn context(&self) -> Context {
        Context::new().with_remote_span_context(self.span.span_context().clone())
    }

    pub fn record_request(&mut self, method: &'static str, route: &'static str, status: u16) {
        self.span.set_attributes([
            KeyValue::new("http.method", method),
            KeyValue::new("http.route", route),
            KeyValue::new("http.status_code", i64::from(status)),
        ]);
    }

    pub fn succeed(&mut self) {
        self.span.set_status(Status::Ok);
    }

    pub fn fail(&mut self, message: impl Into<Cow<'static, str>>) {
        self.span.set_status(Status::error(message));
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        self.span.end();
    }
}
