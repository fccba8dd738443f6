//! # Teadesk Report Library
//!
//! This crate recomposes aggregated auction metrics into an ordered,
//! paginated report document. It defines a universal `SectionBuilder` trait,
//! one concrete builder per report section, the composer that assembles the
//! selected sections into a `ReportDocument`, and the two-phase renderer
//! contract that turns the document into a byte artifact.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Logic:** Builders and the composer are pure over their inputs.
//!   They consume the aggregation engine and emit value types; no I/O, no
//!   drawing primitives.
//! - **Section Agnostic Composer:** By using the `SectionBuilder` trait, the
//!   composer can assemble any selection of sections without knowing their
//!   internals.
//! - **Two-Phase Rendering:** Page totals are only known after layout, so the
//!   `DocumentRenderer` contract is an explicit `layout()` then
//!   `stamp(page_count)` pair, with a footerless fallback when stamping
//!   fails.
//!
//! ## Public API
//!
//! - `ReportTable` / `ReportSection` / `ReportDocument`: the document model.
//! - `SectionBuilder`, `selected_builders`: the builder trait and factory.
//! - `DocumentComposer`, `ReportSelection`, `CancelFlag`: composition.
//! - `DocumentRenderer`, `render_document`, `TextRenderer`: rendering.
//! - `ReportError`: the specific error types returned from this crate.

pub mod builders;
pub mod composer;
pub mod document;
pub mod error;
pub mod format;
pub mod render;
pub mod section;
pub mod table;

// Re-export the key components to create a clean, public-facing API.
pub use builders::{selected_builders, top_share_broker, BuildContext, SectionBuilder};
pub use composer::{CancelFlag, ComposeRequest, DocumentComposer};
pub use document::{FooterTemplate, ReportDocument, TitleInfo};
pub use error::ReportError;
pub use render::{render_document, DocumentRenderer, TextRenderer};
pub use section::{PageBreakPolicy, ReportSection, SectionBlock, SectionId};
pub use table::{HighlightRule, ReportTable, Severity, SeverityBands, TableRow};

// Re-export the configuration types callers pair with the composer.
pub use configuration::{ReportSelection, Thresholds};

// Cells are always formatted strings; LABEL_WIDTH is the display cap.
pub use format::LABEL_WIDTH;
