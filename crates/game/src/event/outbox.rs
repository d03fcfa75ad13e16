use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::time::Clock;

pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Outbound half of the socket connection to the relay.
pub trait Transport {
    fn send(&mut self, event_name: &str, payload: Value);

    fn is_connected(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvent {
    pub event_name: String,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub groups: usize,
    pub events: usize,
}

type Buffer = Rc<RefCell<Vec<PendingEvent>>>;

/// Cheap handle that appends to the outbox buffer.
#[derive(Clone)]
pub struct Emitter {
    buffer: Buffer,
    clock: Rc<dyn Clock>,
}

impl Emitter {
    pub fn emit<T: Serialize + ?Sized>(&self, event_name: &str, data: &T) {
        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Dropping `{}` event that failed to serialize: {}", event_name, e);
                return;
            }
        };

        let data = stamp(value, self.clock.now_ms());
        self.buffer.borrow_mut().push(PendingEvent {
            event_name: event_name.to_string(),
            data,
        });
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("pending", &self.buffer.borrow().len())
            .finish()
    }
}

pub struct Outbox {
    buffer: Buffer,
    clock: Rc<dyn Clock>,
}

impl Outbox {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(Vec::new())),
            clock,
        }
    }

    pub fn emitter(&self) -> Emitter {
        Emitter {
            buffer: Rc::clone(&self.buffer),
            clock: Rc::clone(&self.clock),
        }
    }

    pub fn emit<T: Serialize + ?Sized>(&self, event_name: &str, data: &T) {
        self.emitter().emit(event_name, data);
    }

    pub fn len(&self) -> usize {
        self.buffer.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.borrow().is_empty()
    }

    pub fn pending(&self) -> Vec<PendingEvent> {
        self.buffer.borrow().clone()
    }

    pub fn pending_count(&self, event_name: &str) -> usize {
        self.buffer
            .borrow()
            .iter()
            .filter(|e| e.event_name == event_name)
            .count()
    }

    /// Drains the whole buffer and hands one payload per event name to the
    /// transport: the bare object for a single event, an array otherwise.
    /// Events emitted while the transport runs land in the next cycle.
    pub fn flush(&mut self, transport: &mut dyn Transport) -> FlushReport {
        let drained = std::mem::take(&mut *self.buffer.borrow_mut());
        if drained.is_empty() {
            return FlushReport::default();
        }

        if !transport.is_connected() {
            log::debug!("Flushing {} events while transport is disconnected", drained.len());
        }

        let events = drained.len();
        let groups = group_by_name(drained);
        let report = FlushReport {
            groups: groups.len(),
            events,
        };

        for (event_name, mut payloads) in groups {
            let payload = if payloads.len() == 1 {
                payloads.remove(0)
            } else {
                Value::Array(payloads)
            };
            transport.send(&event_name, payload);
        }

        report
    }
}

fn group_by_name(events: Vec<PendingEvent>) -> Vec<(String, Vec<Value>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<Value>)> = Vec::new();

    for event in events {
        match index.get(&event.event_name) {
            Some(&i) => groups[i].1.push(event.data),
            None => {
                index.insert(event.event_name.clone(), groups.len());
                groups.push((event.event_name, vec![event.data]));
            }
        }
    }

    groups
}

fn stamp(value: Value, timestamp: u64) -> Value {
    match value {
        Value::Object(mut map) => {
            map.insert(TIMESTAMP_FIELD.to_string(), Value::from(timestamp));
            Value::Object(map)
        }
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map.insert(TIMESTAMP_FIELD.to_string(), Value::from(timestamp));
            Value::Object(map)
        }
    }
}

/// Transport that keeps every send, for tests and offline hosts.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub sent: Vec<(String, Value)>,
    pub disconnected: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<(String, Value)> {
        std::mem::take(&mut self.sent)
    }

    pub fn sends_for(&self, event_name: &str) -> Vec<&Value> {
        self.sent
            .iter()
            .filter(|(name, _)| name == event_name)
            .map(|(_, payload)| payload)
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, event_name: &str, payload: Value) {
        self.sent.push((event_name.to_string(), payload));
    }

    fn is_connected(&self) -> bool {
        !self.disconnected
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::time::ManualClock;

    fn outbox() -> (Outbox, ManualClock) {
        let clock = ManualClock::new(5_000);
        (Outbox::new(Rc::new(clock.clone())), clock)
    }

    #[test]
    fn same_name_events_coalesce_into_ordered_array() {
        let (mut outbox, clock) = outbox();

        for i in 0..4 {
            outbox.emit("weapon.switch", &json!({ "weaponType": format!("w{}", i) }));
            clock.advance(10);
        }

        let mut transport = RecordingTransport::new();
        let report = outbox.flush(&mut transport);

        assert_eq!(report, FlushReport { groups: 1, events: 4 });
        assert_eq!(transport.sent.len(), 1);

        let (name, payload) = &transport.sent[0];
        assert_eq!(name, "weapon.switch");
        let items = payload.as_array().expect("batched payload");
        assert_eq!(items.len(), 4);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item["weaponType"], format!("w{}", i));
            assert_eq!(item["timestamp"], 5_000 + 10 * i as u64);
        }
    }

    #[test]
    fn single_event_is_sent_unwrapped() {
        let (mut outbox, _) = outbox();
        outbox.emit("player.position", &json!({ "rotation": 1.5 }));

        let mut transport = RecordingTransport::new();
        outbox.flush(&mut transport);

        let (_, payload) = &transport.sent[0];
        assert!(payload.is_object());
        assert_eq!(payload["rotation"], 1.5);
        assert_eq!(payload["timestamp"], 5_000);
    }

    #[test]
    fn flush_clears_buffer_and_empty_flush_is_noop() {
        let (mut outbox, _) = outbox();
        outbox.emit("a", &json!({}));
        outbox.emit("b", &json!({}));
        outbox.emit("a", &json!({}));

        let mut transport = RecordingTransport::new();
        let report = outbox.flush(&mut transport);
        assert_eq!(report.groups, 2);
        assert!(outbox.is_empty());

        let report = outbox.flush(&mut transport);
        assert_eq!(report, FlushReport::default());
        assert_eq!(transport.sent.len(), 2);
    }

    struct EchoingTransport {
        emitter: Emitter,
        sent: Vec<String>,
    }

    impl Transport for EchoingTransport {
        fn send(&mut self, event_name: &str, _payload: Value) {
            self.sent.push(event_name.to_string());
            self.emitter.emit("late", &json!({}));
        }
    }

    #[test]
    fn events_emitted_during_flush_belong_to_next_cycle() {
        let (mut outbox, _) = outbox();
        outbox.emit("first", &json!({}));

        let mut transport = EchoingTransport {
            emitter: outbox.emitter(),
            sent: Vec::new(),
        };

        outbox.flush(&mut transport);
        assert_eq!(transport.sent, vec!["first".to_string()]);
        assert_eq!(outbox.pending_count("late"), 1);

        outbox.flush(&mut transport);
        assert_eq!(transport.sent, vec!["first".to_string(), "late".to_string()]);
    }

    #[test]
    fn non_object_payloads_are_wrapped() {
        let (outbox, _) = outbox();
        outbox.emit("ping", &42);

        let pending = outbox.pending();
        assert_eq!(pending[0].data["value"], 42);
        assert_eq!(pending[0].data["timestamp"], 5_000);
    }
}
