//! Unrecognized element kinds are reported with one warning each.

use drawport_core::{AnnotationKind, DrawingElement, derive_annotations};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;

struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

#[test]
fn test_one_warning_per_unknown_kind() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let elements = [
        DrawingElement::new("text", 0.0, 0.0),
        DrawingElement::new("rectangle", 10.0, 10.0).with_size(20.0, 20.0),
        DrawingElement::new("frame", 50.0, 50.0),
    ];
    let records = derive_annotations(&elements);

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].kind, AnnotationKind::Unknown);
    assert_eq!(records[1].kind, AnnotationKind::Rectangle);
    assert_eq!(records[2].kind, AnnotationKind::Unknown);

    let logged = LOGGER.records.lock().unwrap();
    let warnings: Vec<&str> = logged
        .iter()
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, message)| message.as_str())
        .collect();
    assert_eq!(
        warnings,
        vec!["Unknown element type: text", "Unknown element type: frame"]
    );
}
