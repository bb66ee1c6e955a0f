//! Keeps every registered view consistent with the latest computation.

use std::sync::Arc;

use forgebill_core::{DomainError, DomainResult};
use forgebill_pricing::BillComputation;

use crate::sink::ViewSink;
use crate::view::{BillView, GstTableView, InputTableView, PrintCopyView, RenderedView};

/// Renders every view from one `BillComputation` and pushes the result to
/// all sinks.
///
/// Nothing reaches a sink unless all footers agree with the computation, so
/// the input table, print copy and GST table never show different totals.
pub struct ViewSynchronizer {
    views: Vec<Box<dyn BillView>>,
    sinks: Vec<Arc<dyn ViewSink>>,
    last: Option<BillComputation>,
}

impl Default for ViewSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSynchronizer {
    /// Synchronizer with the input, print-copy and GST views and no sinks.
    pub fn new() -> Self {
        Self {
            views: vec![
                Box::new(InputTableView),
                Box::new(PrintCopyView),
                Box::new(GstTableView),
            ],
            sinks: Vec::new(),
            last: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ViewSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn add_sink(&mut self, sink: Arc<dyn ViewSink>) {
        self.sinks.push(sink);
    }

    /// Render without pushing anywhere.
    pub fn render_all(&self, computation: &BillComputation) -> DomainResult<Vec<RenderedView>> {
        self.views
            .iter()
            .map(|view| {
                let rendered = view.render(computation);
                let expected = view.expected_total(computation);
                if rendered.footer.total != expected {
                    return Err(DomainError::invariant(format!(
                        "{:?} view total {:?} disagrees with computed {:?}",
                        rendered.kind, rendered.footer.total, expected
                    )));
                }
                Ok(rendered)
            })
            .collect()
    }

    /// Push `computation` to every sink.
    ///
    /// Returns `Ok(false)` when it equals the last synced computation and
    /// nothing was pushed.
    pub fn sync(&mut self, computation: &BillComputation) -> DomainResult<bool> {
        if self.last.as_ref() == Some(computation) {
            tracing::trace!("views already in sync");
            return Ok(false);
        }

        let rendered = self.render_all(computation)?;
        for sink in &self.sinks {
            for view in &rendered {
                sink.replace_rows(view.kind, &view.headers, &view.rows);
                sink.set_footer(view.kind, &view.footer);
            }
        }

        tracing::debug!(
            views = rendered.len(),
            sinks = self.sinks.len(),
            grand_total = %computation.grand_total,
            "bill views synced"
        );
        self.last = Some(computation.clone());
        Ok(true)
    }

    /// Forget the last synced state so the next `sync` always pushes.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
