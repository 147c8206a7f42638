//! Scripted store and log capture shared by the unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use crate::error::StoreError;
use crate::record::Record;
use crate::store::RecordStore;

/// Replays a fixed list of outcomes, then succeeds.
#[derive(Default)]
pub struct ScriptedStore {
    outcomes: Mutex<VecDeque<Result<(), StoreError>>>,
    puts: Mutex<Vec<(String, Record)>>,
}

impl ScriptedStore {
    pub fn new(outcomes: Vec<Result<(), StoreError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            puts: Mutex::default(),
        }
    }

    /// Every (table, record) passed to `put_record`, in call order.
    pub fn puts(&self) -> Vec<(String, Record)> {
        self.puts.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.puts.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for ScriptedStore {
    async fn put_record(&self, table: &str, record: &Record) -> Result<(), StoreError> {
        self.puts
            .lock()
            .unwrap()
            .push((table.to_string(), record.clone()));
        self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn name(&self) -> Option<&str> {
        self.field("event")
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedEvents {
    pub fn all(&self) -> Vec<CapturedEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn named(&self, name: &str) -> Vec<CapturedEvent> {
        self.all()
            .into_iter()
            .filter(|event| event.name() == Some(name))
            .collect()
    }

    /// Event names in emission order.
    pub fn names(&self) -> Vec<String> {
        self.all()
            .iter()
            .filter_map(|event| event.name().map(str::to_string))
            .collect()
    }
}

struct CaptureLayer(CapturedEvents);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.0 .0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0,
        });
    }
}

#[derive(Default)]
struct FieldVisitor(BTreeMap<String, String>);

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

/// Captures every event emitted on this thread until the guard is dropped.
pub fn capture_events() -> (CapturedEvents, DefaultGuard) {
    let events = CapturedEvents::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer(events.clone()));
    let guard = tracing::subscriber::set_default(subscriber);
    (events, guard)
}
