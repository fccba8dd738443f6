use crate::document::{FooterTemplate, ReportDocument};
use crate::error::ReportError;
use crate::table::{HighlightRule, ReportTable};
use comfy_table::{presets, CellAlignment, Table};
use tracing::warn;

/// The rendering contract between the composer and any renderer backend.
///
/// Page totals only exist after a full layout, so rendering is an explicit
/// two-phase exchange: `layout` paginates the document and reports the page
/// count, `stamp` then produces the artifact with "Page X of Y" footers.
/// `render_plain` is the degraded single-pass path used when stamping fails.
pub trait DocumentRenderer {
    type Artifact;

    /// Paginates the document and returns the total page count.
    fn layout(&mut self, document: &ReportDocument) -> Result<usize, ReportError>;

    /// Produces the final artifact with footers stamped on every page.
    /// Requires a prior `layout` call.
    fn stamp(&mut self, page_count: usize) -> Result<Self::Artifact, ReportError>;

    /// Produces the document body without footers, in a single pass.
    fn render_plain(&mut self, document: &ReportDocument) -> Result<Self::Artifact, ReportError>;
}

/// Runs the two-phase render; on failure it degrades to the footerless body
/// instead of failing the whole operation.
pub fn render_document<R: DocumentRenderer>(
    renderer: &mut R,
    document: &ReportDocument,
) -> Result<R::Artifact, ReportError> {
    let two_pass = renderer
        .layout(document)
        .and_then(|count| renderer.stamp(count));
    match two_pass {
        Ok(artifact) => Ok(artifact),
        Err(error) => {
            warn!(%error, "footer stamping failed, returning document without footers");
            renderer.render_plain(document)
        }
    }
}

/// A fixed-geometry plain-text renderer: A4-equivalent pages of
/// `lines_per_page` lines, tables laid out with comfy-table, pages separated
/// by form feeds.
#[derive(Debug)]
pub struct TextRenderer {
    pub lines_per_page: usize,
    pub page_width: usize,
    pages: Vec<Vec<String>>,
    footer: Option<FooterTemplate>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            lines_per_page: 54,
            page_width: 96,
            pages: Vec::new(),
            footer: None,
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn paginate(&self, document: &ReportDocument) -> Vec<Vec<String>> {
        let mut paginator = Paginator::new(self.lines_per_page);

        // Title page.
        paginator.push_line(document.title.company.clone());
        paginator.push_line(document.title.report_title.clone());
        paginator.push_line(String::new());
        if let Some(sale_no) = document.title.sale_no {
            paginator.push_line(format!("Sale Number:  Sale {sale_no}"));
        }
        paginator.push_line(format!(
            "Report Date:  {}",
            document.title.generated_at.format("%B %d, %Y at %H:%M")
        ));
        paginator.push_line(format!("Report Type:  {}", document.title.report_type_line()));
        if let Some((first, last)) = document.title.period {
            paginator.push_line(format!("Data Period:  Sales {first} - {last}"));
        }
        paginator.page_break();

        for (index, section) in document.sections.iter().enumerate() {
            if index > 0 || section.breaks.break_before {
                paginator.page_break();
            }
            paginator.push_line(section.heading.clone());
            paginator.push_line(String::new());

            if section.blocks.is_empty() {
                if let Some(note) = &section.empty_note {
                    paginator.push_line(note.clone());
                }
            }

            for (block_index, block) in section.blocks.iter().enumerate() {
                if block_index > 0 && section.breaks.break_between_blocks {
                    paginator.page_break();
                }
                paginator.push_line(block.heading.clone());
                paginator.push_line(String::new());
                for table in &block.tables {
                    if let Some(title) = &table.title {
                        paginator.push_line(title.clone());
                    }
                    for line in render_table(table) {
                        paginator.push_line(line);
                    }
                    paginator.push_line(String::new());
                }
            }

            if section.breaks.break_after {
                paginator.page_break();
            }
        }

        paginator.finish()
    }

    fn footer_line(&self, footer: &FooterTemplate, page: usize, page_count: usize) -> String {
        let left = footer.left().to_string();
        let center = footer.center();
        let right = footer.right(page, page_count);

        let gap1 = (self.page_width / 2)
            .saturating_sub(left.chars().count() + center.chars().count() / 2)
            .max(1);
        let used = left.chars().count() + gap1 + center.chars().count() + right.chars().count();
        let gap2 = self.page_width.saturating_sub(used).max(1);
        format!(
            "{left}{}{center}{}{right}",
            " ".repeat(gap1),
            " ".repeat(gap2)
        )
    }
}

impl DocumentRenderer for TextRenderer {
    type Artifact = String;

    fn layout(&mut self, document: &ReportDocument) -> Result<usize, ReportError> {
        self.pages = self.paginate(document);
        self.footer = Some(document.footer.clone());
        Ok(self.pages.len())
    }

    fn stamp(&mut self, page_count: usize) -> Result<String, ReportError> {
        let footer = self
            .footer
            .clone()
            .ok_or_else(|| ReportError::Render("stamp called before layout".to_string()))?;
        if page_count != self.pages.len() {
            return Err(ReportError::Render(format!(
                "page count mismatch: laid out {}, asked to stamp {page_count}",
                self.pages.len()
            )));
        }

        let mut output = String::new();
        for (index, page) in self.pages.iter().enumerate() {
            if index > 0 {
                output.push_str("\u{0c}\n");
            }
            for line in page {
                output.push_str(line);
                output.push('\n');
            }
            // Pad so the footer sits at the bottom of the physical page.
            for _ in page.len()..self.lines_per_page {
                output.push('\n');
            }
            output.push_str(&self.footer_line(&footer, index + 1, page_count));
            output.push('\n');
        }
        Ok(output)
    }

    fn render_plain(&mut self, document: &ReportDocument) -> Result<String, ReportError> {
        let pages = self.paginate(document);
        let mut output = String::new();
        for (index, page) in pages.iter().enumerate() {
            if index > 0 {
                output.push_str("\u{0c}\n");
            }
            for line in page {
                output.push_str(line);
                output.push('\n');
            }
        }
        Ok(output)
    }
}

/// Lays one report table out as text lines. A banded table gains a trailing
/// severity column; the top-entity row is marked with a leading asterisk.
fn render_table(table: &ReportTable) -> Vec<String> {
    let mut layout = Table::new();
    layout.load_preset(presets::ASCII_MARKDOWN);

    let banded = matches!(table.highlight, Some(HighlightRule::Band { .. }));
    let mut header = table.columns.clone();
    if banded {
        header.push("Band".to_string());
    }
    if !header.is_empty() {
        layout.set_header(header);
    }

    for row in &table.rows {
        let mut cells = row.cells.clone();
        if banded {
            cells.push(
                table
                    .row_severity(row)
                    .map(|severity| severity.as_str().to_string())
                    .unwrap_or_default(),
            );
        }
        if table.is_top_entity(row) {
            if let Some(first) = cells.first_mut() {
                *first = format!("* {first}");
            }
        }
        layout.add_row(cells);
    }

    for (index, column) in layout.column_iter_mut().enumerate() {
        if index > 0 {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    layout.to_string().lines().map(str::to_string).collect()
}

/// Accumulates lines into pages, splitting on explicit break requests and on
/// page overflow. Consecutive break requests collapse: a break onto an empty
/// page is a no-op, so no blank pages are emitted.
struct Paginator {
    lines_per_page: usize,
    pages: Vec<Vec<String>>,
    current: Vec<String>,
}

impl Paginator {
    fn new(lines_per_page: usize) -> Self {
        Self {
            lines_per_page: lines_per_page.max(1),
            pages: Vec::new(),
            current: Vec::new(),
        }
    }

    fn push_line(&mut self, line: String) {
        if self.current.len() >= self.lines_per_page {
            self.flush();
        }
        self.current.push(line);
    }

    fn page_break(&mut self) {
        if !self.current.is_empty() {
            self.flush();
        }
    }

    fn flush(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
    }

    fn finish(mut self) -> Vec<Vec<String>> {
        if !self.current.is_empty() {
            self.flush();
        }
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::testutil::rich_fixture;
    use crate::composer::{CancelFlag, ComposeRequest, DocumentComposer};
    use configuration::{ReportSelection, Thresholds};
    use analytics::{AggregationCache, AggregationEngine};
    use chrono::Utc;
    use core_types::DataScope;
    use dataset::LotDataset;

    fn compose(data: &LotDataset, selection: ReportSelection) -> ReportDocument {
        let slice = data.slice(DataScope::AllSales);
        let engine = AggregationEngine::new();
        let cache = AggregationCache::new();
        let request = ComposeRequest {
            slice: &slice,
            period: data.sale_range(),
            selection,
            highlight_broker: None,
            generated_at: Utc::now(),
        };
        DocumentComposer::new("Mercantile Produce Brokers Pvt Ltd", "MPBL IT", Thresholds::default())
            .compose(&engine, &cache, &request, &CancelFlag::new())
            .unwrap()
    }

    #[test]
    fn two_pass_render_stamps_every_page() {
        let mut selection = ReportSelection::none();
        selection.report1_sold_pct = true;
        let document = compose(&rich_fixture(), selection);

        let mut renderer = TextRenderer::new();
        let page_count = renderer.layout(&document).unwrap();
        let artifact = renderer.stamp(page_count).unwrap();

        let pages: Vec<&str> = artifact.split("\u{0c}\n").collect();
        assert_eq!(pages.len(), page_count);
        for (index, page) in pages.iter().enumerate() {
            let expected = format!("Page {} of {page_count}", index + 1);
            assert!(page.contains(&expected), "page {} lacks '{expected}'", index + 1);
            assert!(page.contains("MPBL IT"));
            assert!(page.contains("Generated: "));
        }
    }

    #[test]
    fn each_broker_block_starts_a_new_page() {
        let mut selection = ReportSelection::none();
        selection.report1_sold_pct = true;
        let document = compose(&rich_fixture(), selection);

        let mut renderer = TextRenderer::new();
        let page_count = renderer.layout(&document).unwrap();
        let artifact = renderer.stamp(page_count).unwrap();
        let pages: Vec<&str> = artifact.split("\u{0c}\n").collect();

        // Title page, FW page, MPB page.
        assert_eq!(pages.len(), 3);
        assert!(pages[0].contains("MAIN AUCTION DETAILED REPORT"));
        assert!(pages[1].contains("BROKER: FW"));
        assert!(!pages[1].contains("BROKER: MPB"));
        assert!(pages[2].contains("BROKER: MPB"));
    }

    #[test]
    fn overflowing_content_spills_onto_new_pages() {
        let mut selection = ReportSelection::none();
        selection.report1_sold_pct = true;
        let document = compose(&rich_fixture(), selection);

        let mut renderer = TextRenderer {
            lines_per_page: 8,
            ..TextRenderer::new()
        };
        let short_pages = renderer.layout(&document).unwrap();

        let mut tall = TextRenderer::new();
        let tall_pages = tall.layout(&document).unwrap();
        assert!(short_pages > tall_pages);
    }

    #[test]
    fn stamp_requires_a_prior_layout() {
        let mut renderer = TextRenderer::new();
        assert!(matches!(renderer.stamp(3), Err(ReportError::Render(_))));
    }

    #[test]
    fn failed_stamping_falls_back_to_the_plain_body() {
        struct FailingStamp(TextRenderer);

        impl DocumentRenderer for FailingStamp {
            type Artifact = String;

            fn layout(&mut self, document: &ReportDocument) -> Result<usize, ReportError> {
                self.0.layout(document)
            }

            fn stamp(&mut self, _page_count: usize) -> Result<String, ReportError> {
                Err(ReportError::Render("footer pass exploded".to_string()))
            }

            fn render_plain(&mut self, document: &ReportDocument) -> Result<String, ReportError> {
                self.0.render_plain(document)
            }
        }

        let mut selection = ReportSelection::none();
        selection.report1_sold_pct = true;
        let document = compose(&rich_fixture(), selection);

        let mut renderer = FailingStamp(TextRenderer::new());
        let artifact = render_document(&mut renderer, &document).unwrap();
        // The body survives; the footers do not.
        assert!(artifact.contains("BROKER: MPB"));
        assert!(!artifact.contains("Page 1 of"));
    }

    #[test]
    fn top_entity_rows_are_marked_in_the_text_layout() {
        let mut selection = ReportSelection::none();
        selection.summary_market = true;
        let document = compose(&rich_fixture(), selection);

        let mut renderer = TextRenderer::new();
        let artifact = render_document(&mut renderer, &document).unwrap();
        // MPB holds the higher total value in the fixture.
        assert!(artifact.contains("* MPB (MPB)"));
    }
}
