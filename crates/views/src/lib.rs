//! Bill views (input table, print copy, GST table) and their synchronizer.
//!
//! Views are projections: each one is rebuilt from a single
//! `BillComputation` and holds no state of its own. Rendering targets
//! (the DOM, a printer, a test recorder) sit behind [`ViewSink`].

pub mod format;
pub mod sink;
pub mod sync;
pub mod view;

pub use format::{format_inr, format_quantity};
pub use sink::{RecordingSink, ViewSink};
pub use sync::ViewSynchronizer;
pub use view::{BillView, GstTableView, InputTableView, PrintCopyView, RenderedView, TableRow, ViewFooter, ViewKind};
