//! Rendering targets for bill views.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::view::{RenderedView, TableRow, ViewFooter, ViewKind};

/// Something that displays bill views (a DOM table, a print preview).
///
/// Every sync replaces the whole table; sinks never patch rows.
pub trait ViewSink: Send + Sync {
    fn replace_rows(&self, kind: ViewKind, headers: &[String], rows: &[TableRow]);
    fn set_footer(&self, kind: ViewKind, footer: &ViewFooter);
}

impl<S> ViewSink for Arc<S>
where
    S: ViewSink + ?Sized,
{
    fn replace_rows(&self, kind: ViewKind, headers: &[String], rows: &[TableRow]) {
        (**self).replace_rows(kind, headers, rows)
    }

    fn set_footer(&self, kind: ViewKind, footer: &ViewFooter) {
        (**self).set_footer(kind, footer)
    }
}

/// In-memory sink that keeps the last pushed state of every view.
#[derive(Debug, Default)]
pub struct RecordingSink {
    views: RwLock<HashMap<ViewKind, RenderedView>>,
    pushes: RwLock<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self, kind: ViewKind) -> Option<RenderedView> {
        self.views.read().ok()?.get(&kind).cloned()
    }

    /// Number of `replace_rows` calls received.
    pub fn push_count(&self) -> usize {
        self.pushes.read().map(|n| *n).unwrap_or(0)
    }

    fn entry(&self, kind: ViewKind, f: impl FnOnce(&mut RenderedView)) {
        if let Ok(mut views) = self.views.write() {
            let view = views.entry(kind).or_insert_with(|| RenderedView {
                kind,
                headers: Vec::new(),
                rows: Vec::new(),
                footer: ViewFooter::default(),
            });
            f(view);
        }
    }
}

impl ViewSink for RecordingSink {
    fn replace_rows(&self, kind: ViewKind, headers: &[String], rows: &[TableRow]) {
        self.entry(kind, |view| {
            view.headers = headers.to_vec();
            view.rows = rows.to_vec();
        });
        if let Ok(mut n) = self.pushes.write() {
            *n += 1;
        }
    }

    fn set_footer(&self, kind: ViewKind, footer: &ViewFooter) {
        self.entry(kind, |view| view.footer = footer.clone());
    }
}
