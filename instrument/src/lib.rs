//! Event capture for auction runs.
//!
//! Installs a `tracing` subscriber that turns every info-level event into a
//! row of the table named after the event's target. Columns are whatever
//! fields the events carry, so the schema of each table follows from the
//! events the mechanism emits.
//!
//! # Usage
//!
//! ```ignore
//! // In mechanism code:
//! tracing::info!(target: "clock_round", round, unit = ?unit, price, demand);
//!
//! // In a test:
//! let mut capture = instrument::Capture::start();
//! // ... run the auction ...
//! let rounds = capture.table("clock_round");
//! let prices = rounds.f64_column("price");
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use polars::prelude::*;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

/// One recorded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    U64(u64),
    I64(i64),
    F64(f64),
    Bool(bool),
    Str(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::U64(v) => Some(*v as f64),
            Cell::I64(v) => Some(*v as f64),
            Cell::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Cell::U64(v) => Some(*v),
            Cell::I64(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s),
            _ => None,
        }
    }
}

pub type Row = HashMap<String, Cell>;

/// All rows recorded under one tracing target, in emission order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of a numeric field, skipping rows that lack it.
    pub fn f64_column(&self, name: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(name).and_then(Cell::as_f64))
            .collect()
    }

    pub fn u64_column(&self, name: &str) -> Vec<u64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(name).and_then(Cell::as_u64))
            .collect()
    }

    pub fn str_column(&self, name: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.get(name).and_then(Cell::as_str).map(str::to_string))
            .collect()
    }

    /// Rows whose string field `name` equals `value`.
    pub fn filter_eq(&self, name: &str, value: &str) -> Table {
        Table {
            rows: self
                .rows
                .iter()
                .filter(|row| row.get(name).and_then(Cell::as_str) == Some(value))
                .cloned()
                .collect(),
        }
    }

    /// Convert to a polars DataFrame. Column types come from the first row
    /// that carries the field; rows missing a field get a null.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut names: Vec<&String> = self.rows.iter().flat_map(|row| row.keys()).collect();
        names.sort();
        names.dedup();

        let mut columns: Vec<Column> = Vec::with_capacity(names.len());
        for name in names {
            let first = self.rows.iter().find_map(|row| row.get(name));
            let column = match first {
                Some(Cell::U64(_)) => Column::new(
                    name.as_str().into(),
                    self.rows
                        .iter()
                        .map(|row| row.get(name).and_then(Cell::as_u64))
                        .collect::<Vec<Option<u64>>>(),
                ),
                Some(Cell::I64(_)) | Some(Cell::F64(_)) => Column::new(
                    name.as_str().into(),
                    self.rows
                        .iter()
                        .map(|row| row.get(name).and_then(Cell::as_f64))
                        .collect::<Vec<Option<f64>>>(),
                ),
                Some(Cell::Bool(_)) => Column::new(
                    name.as_str().into(),
                    self.rows
                        .iter()
                        .map(|row| match row.get(name) {
                            Some(Cell::Bool(b)) => Some(*b),
                            _ => None,
                        })
                        .collect::<Vec<Option<bool>>>(),
                ),
                Some(Cell::Str(_)) | None => Column::new(
                    name.as_str().into(),
                    self.rows
                        .iter()
                        .map(|row| row.get(name).and_then(Cell::as_str).map(str::to_string))
                        .collect::<Vec<Option<String>>>(),
                ),
            };
            columns.push(column);
        }

        DataFrame::new(columns)
    }
}

/// Tables keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: BTreeMap<String, Table>,
}

impl Recorder {
    pub fn table(&self, target: &str) -> Table {
        self.tables.get(target).cloned().unwrap_or_default()
    }

    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

struct RowVisitor<'a> {
    row: &'a mut Row,
}

impl RowVisitor<'_> {
    fn put(&mut self, field: &Field, cell: Cell) {
        self.row.insert(field.name().to_string(), cell);
    }
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Cell::U64(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Cell::I64(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, Cell::F64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Cell::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Cell::Str(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, Cell::Str(format!("{:?}", value)));
    }
}

/// Subscriber that appends info-level events to the thread-local recorder.
/// Spans are ignored.
pub struct TableSubscriber;

impl Subscriber for TableSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut row = Row::new();
        event.record(&mut RowVisitor { row: &mut row });
        // `message` is the formatted text of events with a format string; it
        // carries no column data.
        row.remove("message");

        let target = event.metadata().target().to_string();
        RECORDER.with(|r| {
            r.borrow_mut()
                .tables
                .entry(target)
                .or_default()
                .rows
                .push(row);
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install the table subscriber as the global default. Later calls are no-ops.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(TableSubscriber);
}

/// Take everything recorded on this thread so far.
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

/// Scoped capture: clears this thread's recorder on start and again on drop,
/// so one test's events never leak into the next test run on the same thread.
pub struct Capture {
    recorder: Option<Recorder>,
}

impl Capture {
    pub fn start() -> Self {
        install_subscriber();
        clear();
        Self { recorder: None }
    }

    /// Drain on first call; later calls return the cached recorder.
    pub fn recorder(&mut self) -> &Recorder {
        self.recorder.get_or_insert_with(drain)
    }

    pub fn table(&mut self, target: &str) -> Table {
        self.recorder().table(target)
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        clear();
    }
}
