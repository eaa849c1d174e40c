use std::io::Write;
use std::sync::Arc;

use serde_json::{Map, Value};
use tierchain_core::ids::Correlation;
use tierchain_core::time::now_timestamp;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;

/// Logger for one request, bound to the ids of that request's span.
#[derive(Debug, Clone)]
pub struct RequestLog {
    service: Arc<str>,
    correlation: Correlation,
}

impl RequestLog {
    pub fn new(service: Arc<str>, correlation: Correlation) -> Self {
        Self {
            service,
            correlation,
        }
    }

    pub fn info(&self, message: &str) {
        tracing::info!(
            target: "tierchain::request",
            service = &*self.service,
            trace_id = self.correlation.trace_id(),
            span_id = self.correlation.span_id(),
            "{message}"
        );
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(
            target: "tierchain::request",
            service = &*self.service,
            trace_id = self.correlation.trace_id(),
            span_id = self.correlation.span_id(),
            "{message}"
        );
    }

    pub fn error(&self, message: &str) {
        tracing::error!(
            target: "tierchain::request",
            service = &*self.service,
            trace_id = self.correlation.trace_id(),
            span_id = self.correlation.span_id(),
            "{message}"
        );
    }
}

/// Writes every event as a single JSON line:
/// `{timestamp, level, message, service, trace_id, span_id, ...fields}`.
/// `trace_id` and `span_id` are `null` for events logged outside a request.
pub struct JsonLogLayer<W> {
    service: String,
    make_writer: W,
}

impl<W> JsonLogLayer<W>
where
    W: for<'a> MakeWriter<'a> + 'static,
{
    pub fn new(service: impl Into<String>, make_writer: W) -> Self {
        Self {
            service: service.into(),
            make_writer,
        }
    }
}

impl<S, W> Layer<S> for JsonLogLayer<W>
where
    S: Subscriber,
    W: for<'a> MakeWriter<'a> + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut fields = visitor.fields;
        let mut line = Map::new();
        line.insert("timestamp".to_string(), Value::String(now_timestamp()));
        line.insert(
            "level".to_string(),
            Value::String(level_name(*event.metadata().level()).to_string()),
        );
        line.insert(
            "message".to_string(),
            Value::String(
                visitor
                    .message
                    .unwrap_or_else(|| event.metadata().name().to_string()),
            ),
        );
        line.insert(
            "service".to_string(),
            fields
                .remove("service")
                .unwrap_or_else(|| Value::String(self.service.clone())),
        );
        line.insert(
            "trace_id".to_string(),
            fields.remove("trace_id").unwrap_or(Value::Null),
        );
        line.insert(
            "span_id".to_string(),
            fields.remove("span_id").unwrap_or(Value::Null),
        );
        line.extend(fields);

        let Ok(mut rendered) = serde_json::to_vec(&line) else {
            return;
        };
        rendered.push(b'\n');
        let mut writer = self.make_writer.make_writer();
        let _ = writer.write_all(&rendered);
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(rendered);
            return;
        }
        self.fields
            .insert(field.name().to_string(), Value::String(rendered));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
            return;
        }
        self.fields
            .insert(field.name().to_string(), Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[test]
    fn request_lines_carry_correlation() {
        let capture = testkit::CaptureWriter::default();
        let subscriber =
            tracing_subscriber::registry().with(JsonLogLayer::new("fallback", capture.clone()));
        let log = RequestLog::new(
            Arc::from("service-a"),
            Correlation::from_hex("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7"),
        );

        tracing::subscriber::with_default(subscriber, || {
            log.warn("Bad request received");
        });

        let lines = capture.json_lines();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["level"], "warn");
        assert_eq!(line["message"], "Bad request received");
        assert_eq!(line["service"], "service-a");
        assert_eq!(line["trace_id"], "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(line["span_id"], "00f067aa0ba902b7");
        assert!(line["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn plain_events_get_null_ids_and_default_service() {
        let capture = testkit::CaptureWriter::default();
        let subscriber =
            tracing_subscriber::registry().with(JsonLogLayer::new("service-c", capture.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(port = 3002u64, "service-c started on port 3002");
        });

        let lines = capture.json_lines();
        let line = &lines[0];
        assert_eq!(line["level"], "info");
        assert_eq!(line["service"], "service-c");
        assert!(line["trace_id"].is_null());
        assert!(line["span_id"].is_null());
        assert_eq!(line["port"], 3002);
    }
}
