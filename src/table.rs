//! Transaction listing rendered as a table spanning as many pages as needed.
//!
//! The column header is drawn once on every page the table touches: the
//! renderer reacts to the [`PageBreak`](crate::canvas::PageBreak) signal returned by
//! [`DocumentCanvas::ensure_space`] before each row.

use crate::canvas::{DocumentCanvas, PageGeometry, TextAlign, TextStyle};
use crate::format::{sign_color, truncate_text, NumericFormatter, MUTED_COLOR};
use crate::model::Transaction;
use crate::sections::{section_title, ROW_HEIGHT, SECTION_SPACING};

/// Default number of rows printed before the remainder is summarized.
pub const DEFAULT_MAX_ROWS: usize = 50;
/// Default number of description characters kept per row.
pub const DEFAULT_DESCRIPTION_CHARS: usize = 40;
/// Label printed for transactions without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
/// Title written above the table.
pub const TABLE_TITLE: &str = "Transactions";

/// Height of the column header row, including the rule below it.
pub const HEADER_HEIGHT: f64 = 8.0;

const CATEGORY_CHARS: usize = 18;
const HEADER_STYLE: TextStyle = TextStyle::new(9).bold().colored(MUTED_COLOR);
const ROW_STYLE: TextStyle = TextStyle::new(9);
const OMITTED_STYLE: TextStyle = TextStyle::new(9).colored(MUTED_COLOR);

/// Layout limits of the transaction table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableOptions {
    pub max_rows: usize,
    pub description_chars: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            description_chars: DEFAULT_DESCRIPTION_CHARS,
        }
    }
}

/// Bookkeeping about a rendered table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableSummary {
    /// Number of transaction rows written.
    pub rows_rendered: usize,
    /// Number of transactions left out because of the row cap.
    pub omitted: usize,
    /// How many times the column header was drawn.
    pub header_count: usize,
    /// Number of distinct pages the table wrote to.
    pub pages_touched: usize,
    /// 1-based page holding the first column header.
    pub start_page: usize,
}

/// x positions of the table columns. The amount column is right-aligned on
/// its position.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Columns {
    date: f64,
    category: f64,
    description: f64,
    amount: f64,
}

impl Columns {
    fn new(geometry: &PageGeometry) -> Self {
        let left = geometry.margin;
        let width = geometry.content_width();
        Self {
            date: left,
            category: left + width * 0.15,
            description: left + width * 0.38,
            amount: geometry.right_edge(),
        }
    }
}

/// Renders transactions in their given order with header repetition and
/// truncation.
#[derive(Clone, Debug, Default)]
pub struct TableRenderer {
    options: TableOptions,
}

impl TableRenderer {
    pub fn new(options: TableOptions) -> Self {
        Self { options }
    }

    /// Number of rows that fit below the column header on an otherwise empty page.
    pub fn rows_per_page(geometry: &PageGeometry) -> usize {
        let available = geometry.usable_height() - HEADER_HEIGHT;
        if available < ROW_HEIGHT {
            0
        } else {
            (available / ROW_HEIGHT).floor() as usize
        }
    }

    /// Writes the table title, the column header and the rows.
    pub fn render(
        &self,
        canvas: &mut DocumentCanvas,
        transactions: &[Transaction],
        formatter: &NumericFormatter,
    ) -> TableSummary {
        section_title(canvas, TABLE_TITLE, HEADER_HEIGHT + ROW_HEIGHT);
        self.render_rows(canvas, transactions, formatter)
    }

    /// Writes the column header and the rows starting at the cursor, without a title.
    pub fn render_rows(
        &self,
        canvas: &mut DocumentCanvas,
        transactions: &[Transaction],
        formatter: &NumericFormatter,
    ) -> TableSummary {
        let columns = Columns::new(canvas.geometry());
        let mut summary = TableSummary::default();

        let _ = canvas.ensure_space(HEADER_HEIGHT + ROW_HEIGHT);
        let first_page = canvas.page_index();
        summary.start_page = first_page + 1;
        self.render_header(canvas, &columns);
        summary.header_count += 1;

        let shown = transactions.len().min(self.options.max_rows);
        summary.omitted = transactions.len() - shown;
        for (index, transaction) in transactions[..shown].iter().enumerate() {
            // The last row stays on the page of the omitted-count line.
            let needed = if summary.omitted > 0 && index + 1 == shown {
                2.0 * ROW_HEIGHT
            } else {
                ROW_HEIGHT
            };
            if canvas.ensure_space(needed).occurred() {
                self.render_header(canvas, &columns);
                summary.header_count += 1;
            }
            self.render_row(canvas, &columns, transaction, formatter);
            summary.rows_rendered += 1;
        }

        if summary.omitted > 0 {
            if canvas.ensure_space(ROW_HEIGHT).occurred() {
                self.render_header(canvas, &columns);
                summary.header_count += 1;
            }
            let noun = if summary.omitted == 1 {
                "transaction"
            } else {
                "transactions"
            };
            let left = canvas.left();
            canvas.write_styled(
                format!("... {} more {} not shown", summary.omitted, noun),
                left,
                OMITTED_STYLE,
            );
            let _ = canvas.advance(ROW_HEIGHT);
            log::debug!(
                "table: rendered {} of {} transactions",
                shown,
                transactions.len()
            );
        }

        summary.pages_touched = canvas.page_index() - first_page + 1;
        canvas.gap(SECTION_SPACING);
        summary
    }

    fn render_header(&self, canvas: &mut DocumentCanvas, columns: &Columns) {
        canvas.write_styled("Date", columns.date, HEADER_STYLE);
        canvas.write_styled("Category", columns.category, HEADER_STYLE);
        canvas.write_styled("Description", columns.description, HEADER_STYLE);
        canvas.write_styled(
            "Amount",
            columns.amount,
            HEADER_STYLE.aligned(TextAlign::Right),
        );
        let _ = canvas.advance(HEADER_HEIGHT - 1.0);
        canvas.rule(columns.date, columns.amount);
        let _ = canvas.advance(1.0);
    }

    fn render_row(
        &self,
        canvas: &mut DocumentCanvas,
        columns: &Columns,
        transaction: &Transaction,
        formatter: &NumericFormatter,
    ) {
        let category = transaction
            .category
            .as_ref()
            .map_or(UNCATEGORIZED_LABEL, |category| category.name.as_str());
        let description = single_line(transaction.description.as_deref().unwrap_or_default());

        canvas.write_styled(formatter.format_date(transaction.date), columns.date, ROW_STYLE);
        canvas.write_styled(
            truncate_text(&single_line(category), CATEGORY_CHARS),
            columns.category,
            ROW_STYLE,
        );
        canvas.write_styled(
            truncate_text(&description, self.options.description_chars),
            columns.description,
            ROW_STYLE,
        );
        canvas.write_styled(
            formatter.format_signed_currency(transaction.amount, transaction.kind),
            columns.amount,
            ROW_STYLE
                .aligned(TextAlign::Right)
                .colored(sign_color(transaction.signed_amount())),
        );
        let _ = canvas.advance(ROW_HEIGHT);
    }
}

/// Replaces line breaks, tabs and other control characters with spaces so a
/// cell never spans more than one line.
fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawCommand;
    use crate::format::{NEGATIVE_COLOR, POSITIVE_COLOR};
    use crate::model::{CategoryRef, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn transactions(count: usize) -> Vec<Transaction> {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        (0..count)
            .map(|index| {
                Transaction::new(format!("t{index}"), TransactionKind::Expense, dec!(12.34), date)
                    .with_description(format!("Purchase {index}"))
            })
            .collect()
    }

    fn count_text(canvas_pages: &[crate::canvas::Page], needle: &str) -> usize {
        canvas_pages
            .iter()
            .flat_map(|page| page.texts())
            .filter(|text| *text == needle)
            .count()
    }

    #[test]
    fn rows_per_page_matches_geometry() {
        // 257 mm usable, 8 mm header, 7 mm rows.
        assert_eq!(TableRenderer::rows_per_page(&PageGeometry::A4), 35);
    }

    #[test]
    fn header_is_repeated_on_every_page() {
        let mut canvas = DocumentCanvas::default();
        let renderer = TableRenderer::new(TableOptions {
            max_rows: 200,
            ..TableOptions::default()
        });
        let summary = renderer.render_rows(&mut canvas, &transactions(80), &NumericFormatter::default());

        assert_eq!(summary.rows_rendered, 80);
        assert_eq!(summary.pages_touched, 3);
        assert_eq!(summary.header_count, 3);

        let pages = canvas.into_pages();
        for page in &pages {
            assert_eq!(page.texts().filter(|text| *text == "Description").count(), 1);
            assert_eq!(page.texts().next(), Some("Date"));
        }
    }

    #[test]
    fn truncates_to_cap_and_reports_omitted() {
        let mut canvas = DocumentCanvas::default();
        let summary = TableRenderer::default().render(
            &mut canvas,
            &transactions(120),
            &NumericFormatter::default(),
        );

        assert_eq!(summary.rows_rendered, 50);
        assert_eq!(summary.omitted, 70);
        let pages = canvas.into_pages();
        assert_eq!(count_text(&pages, "-12,34 €"), 50);
        assert_eq!(count_text(&pages, "... 70 more transactions not shown"), 1);
        assert_eq!(count_text(&pages, "Purchase 50"), 0);
    }

    #[test]
    fn keeps_given_order_and_labels_missing_category() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let rows = vec![
            Transaction::new("b", TransactionKind::Revenue, dec!(900), date)
                .with_category(CategoryRef::new("Salaire")),
            Transaction::new("a", TransactionKind::Expense, dec!(5), date),
        ];
        let mut canvas = DocumentCanvas::default();
        TableRenderer::default().render_rows(&mut canvas, &rows, &NumericFormatter::default());

        let pages = canvas.into_pages();
        let texts: Vec<_> = pages[0].texts().skip(4).collect();
        assert_eq!(
            texts,
            [
                "02/05/2024",
                "Salaire",
                "",
                "+900,00 €",
                "02/05/2024",
                UNCATEGORIZED_LABEL,
                "",
                "-5,00 €",
            ]
        );
    }

    #[test]
    fn long_descriptions_are_cut() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let rows = vec![Transaction::new("a", TransactionKind::Expense, dec!(5), date)
            .with_description("x".repeat(500))];
        let mut canvas = DocumentCanvas::default();
        TableRenderer::new(TableOptions {
            description_chars: 12,
            ..TableOptions::default()
        })
        .render_rows(&mut canvas, &rows, &NumericFormatter::default());

        let pages = canvas.into_pages();
        assert_eq!(count_text(&pages, "xxxxxxxxx..."), 1);
    }

    #[test]
    fn empty_listing_draws_header_only() {
        let mut canvas = DocumentCanvas::default();
        let summary =
            TableRenderer::default().render_rows(&mut canvas, &[], &NumericFormatter::default());
        assert_eq!(summary.rows_rendered, 0);
        assert_eq!(summary.header_count, 1);
        assert_eq!(summary.pages_touched, 1);
    }

    #[test]
    fn omitted_line_never_lands_on_a_page_without_header() {
        let geometry = PageGeometry::A4;
        let per_page = TableRenderer::rows_per_page(&geometry);
        let mut canvas = DocumentCanvas::new(geometry);
        let summary = TableRenderer::new(TableOptions {
            max_rows: per_page,
            ..TableOptions::default()
        })
        .render_rows(&mut canvas, &transactions(per_page + 1), &NumericFormatter::default());

        assert_eq!(summary.rows_rendered, per_page);
        assert_eq!(summary.omitted, 1);
        assert_eq!(summary.pages_touched, 2);
        assert_eq!(summary.header_count, 2);

        let pages = canvas.into_pages();
        for page in &pages {
            assert_eq!(page.texts().next(), Some("Date"));
        }
        let last: Vec<_> = pages[1].texts().collect();
        assert!(last.contains(&"-12,34 €"));
        assert_eq!(last.last(), Some(&"... 1 more transaction not shown"));
    }

    #[test]
    fn amount_cell_is_right_aligned_and_sign_colored() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let rows = vec![
            Transaction::new("b", TransactionKind::Revenue, dec!(900), date),
            Transaction::new("a", TransactionKind::Expense, dec!(5), date),
        ];
        let mut canvas = DocumentCanvas::default();
        TableRenderer::default().render_rows(&mut canvas, &rows, &NumericFormatter::default());

        let pages = canvas.into_pages();
        let style_of = |needle: &str| {
            pages[0]
                .commands()
                .iter()
                .find_map(|command| match command {
                    DrawCommand::Text { text, style, .. } if text == needle => Some(*style),
                    _ => None,
                })
                .unwrap_or_else(|| panic!("no cell `{needle}`"))
        };

        let revenue = style_of("+900,00 €");
        assert_eq!(revenue.align, TextAlign::Right);
        assert_eq!(revenue.color, Some(POSITIVE_COLOR));

        let expense = style_of("-5,00 €");
        assert_eq!(expense.align, TextAlign::Right);
        assert_eq!(expense.color, Some(NEGATIVE_COLOR));
    }

    #[test]
    fn long_category_names_are_cut() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let rows = vec![Transaction::new("a", TransactionKind::Expense, dec!(5), date)
            .with_category(CategoryRef::new("Home improvement and garden supplies"))];
        let mut canvas = DocumentCanvas::default();
        TableRenderer::default().render_rows(&mut canvas, &rows, &NumericFormatter::default());

        let pages = canvas.into_pages();
        assert_eq!(count_text(&pages, "Home improvemen..."), 1);
        assert_eq!("Home improvemen...".chars().count(), CATEGORY_CHARS);
    }

    #[test]
    fn control_characters_in_cells_become_spaces() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let rows = vec![Transaction::new("a", TransactionKind::Expense, dec!(5), date)
            .with_description("line one\nline two\tend")
            .with_category(CategoryRef::new("Food\r\n"))];
        let mut canvas = DocumentCanvas::default();
        TableRenderer::default().render_rows(&mut canvas, &rows, &NumericFormatter::default());

        let pages = canvas.into_pages();
        assert_eq!(count_text(&pages, "line one line two end"), 1);
        assert_eq!(count_text(&pages, "Food  "), 1);
    }
}
