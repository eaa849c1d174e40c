use serde::{Deserialize, Serialize};

use crate::error::{Result, TierError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanId(String);

impl TraceId {
    pub fn parse(input: &str) -> Result<Self> {
        if input.len() != 32 || !is_nonzero_hex(input) {
            return Err(TierError::Parse(format!("invalid trace id: {input}")));
        }
        Ok(Self(input.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SpanId {
    pub fn parse(input: &str) -> Result<Self> {
        if input.len() != 16 || !is_nonzero_hex(input) {
            return Err(TierError::Parse(format!("invalid span id: {input}")));
        }
        Ok(Self(input.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// All-zero ids are the W3C "invalid" sentinel.
fn is_nonzero_hex(input: &str) -> bool {
    input.chars().all(|c| c.is_ascii_hexdigit()) && input.chars().any(|c| c != '0')
}

/// Identifiers that tie a log line to the span it was emitted under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correlation {
    pub trace_id: Option<TraceId>,
    pub span_id: Option<SpanId>,
}

impl Correlation {
    /// Builds a correlation from hex ids. Both must be valid, otherwise the
    /// result is empty.
    pub fn from_hex(trace_id: &str, span_id: &str) -> Self {
        match (TraceId::parse(trace_id), SpanId::parse(span_id)) {
            (Ok(trace_id), Ok(span_id)) => Self {
                trace_id: Some(trace_id),
                span_id: Some(span_id),
            },
            _ => Self::default(),
        }
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_ref().map(TraceId::as_str)
    }

    pub fn span_id(&self) -> Option<&str> {
        self.span_id.as_ref().map(SpanId::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids() {
        let trace = TraceId::parse("4BF92F3577B34DA6A3CE929D0E0E4736").unwrap();
        let span = SpanId::parse("00f067aa0ba902b7").unwrap();
        assert_eq!(trace.as_str(), "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(span.as_str(), "00f067aa0ba902b7");
    }

    #[test]
    fn rejects_bad_ids() {
        assert!(TraceId::parse("abc").is_err());
        assert!(SpanId::parse("zzzzzzzzzzzzzzzz").is_err());
        assert!(TraceId::parse("00000000000000000000000000000000").is_err());
        assert!(SpanId::parse("0000000000000000").is_err());
    }

    #[test]
    fn correlation_is_empty_unless_both_ids_valid() {
        let full = Correlation::from_hex("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7");
        assert_eq!(full.trace_id(), Some("4bf92f3577b34da6a3ce929d0e0e4736"));
        assert_eq!(full.span_id(), Some("00f067aa0ba902b7"));

        let partial =
            Correlation::from_hex("4bf92f3577b34da6a3ce929d0e0e4736", "0000000000000000");
        assert_eq!(partial, Correlation::default());
        assert_eq!(partial.trace_id(), None);
    }
}
