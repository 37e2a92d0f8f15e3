//! In-memory event capture for logging assertions in tests.
//!
//! [`init_test_capture`] installs a global subscriber whose only layer pushes
//! every event into a shared buffer. Integration tests run in parallel inside
//! one process, so the buffer is shared too: filter on a unique `op` name or
//! on the `run_id` an analyzer stamps on its boundary events.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use super::schema::{
    FIELD_COMPONENT, FIELD_DURATION_MS, FIELD_ERR_CODE, FIELD_ERR_KIND, FIELD_EVENT, FIELD_OP,
    FIELD_RUN_ID,
};

/// One recorded event, fields rendered as text.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn from_fields(level: Level, fields: HashMap<String, String>) -> Self {
        // boundary fields stay in `fields` too so predicates can use either
        let component = fields.get(FIELD_COMPONENT).cloned();
        let op = fields.get(FIELD_OP).cloned();
        let event = fields.get(FIELD_EVENT).cloned();
        Self {
            level,
            component,
            op,
            event,
            fields,
        }
    }

    /// True if this is the `event` boundary of `op`.
    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn run_id(&self) -> Option<&str> {
        self.field(FIELD_RUN_ID)
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.field(FIELD_DURATION_MS).and_then(|d| d.parse().ok())
    }

    /// Stable `ERR_*` code of an `end_error` event.
    pub fn err_code(&self) -> Option<&str> {
        self.field(FIELD_ERR_CODE)
    }

    pub fn err_kind(&self) -> Option<&str> {
        self.field(FIELD_ERR_KIND)
    }
}

#[derive(Default)]
struct TextFields(HashMap<String, String>);

impl TextFields {
    fn put(&mut self, field: &Field, text: String) {
        self.0.insert(field.name().to_string(), text);
    }
}

impl Visit for TextFields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

/// Subscriber layer feeding a [`TestCapture`] buffer.
pub struct TestCaptureLayer {
    buffer: Buffer,
}

impl TestCaptureLayer {
    /// A fresh layer and the handle that reads what it records.
    pub fn new() -> (Self, TestCapture) {
        let buffer = Buffer::default();
        (
            Self {
                buffer: Arc::clone(&buffer),
            },
            TestCapture { buffer },
        )
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = TextFields::default();
        event.record(&mut fields);
        let captured = CapturedEvent::from_fields(*event.metadata().level(), fields.0);
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(captured);
        }
    }
}

/// Read handle over captured events.
#[derive(Clone)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    /// Snapshot of everything captured so far.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Events stamped with `run_id`, in emission order.
    pub fn events_for_run(&self, run_id: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.run_id() == Some(run_id))
            .collect()
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// # Panics
    ///
    /// Panics if no captured event is the `event` boundary of `op`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "Expected event op={} event={} not found in {} captured events",
            op,
            event,
            events.len()
        );
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture subscriber once and return the shared handle.
///
/// # Example
///
/// ```
/// use autrace_core::logging_facility::test_capture::init_test_capture;
/// use autrace_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op");
/// capture.assert_event_exists("doc_capture_op", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            tracing_subscriber::registry().with(layer).init();
            capture
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_boundary_fields_are_lifted() {
        let event = CapturedEvent::from_fields(
            Level::INFO,
            fields(&[
                ("component", "autrace_engine::analyzer"),
                ("op", "take_snapshot"),
                ("event", "end"),
                ("run_id", "r-1"),
                ("duration_ms", "7"),
                ("err.code", "ERR_IO"),
            ]),
        );
        assert!(event.is("take_snapshot", "end"));
        assert!(!event.is("take_snapshot", "start"));
        assert_eq!(event.component.as_deref(), Some("autrace_engine::analyzer"));
        assert_eq!(event.run_id(), Some("r-1"));
        assert_eq!(event.field("op"), Some("take_snapshot"));
        assert_eq!(event.duration_ms(), Some(7));
        assert_eq!(event.err_code(), Some("ERR_IO"));
        assert_eq!(event.err_kind(), None);
    }

    #[test]
    fn test_layer_handle_shares_buffer() {
        let (layer, capture) = TestCaptureLayer::new();
        layer
            .buffer
            .lock()
            .unwrap()
            .push(CapturedEvent::from_fields(Level::DEBUG, fields(&[("run_id", "r-2")])));
        assert_eq!(capture.events_for_run("r-2").len(), 1);
        capture.clear();
        assert!(capture.events().is_empty());
    }
}
