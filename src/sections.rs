//! Renderers for the document header, the per-variant summary sections and the
//! footer.
//!
//! Category and budget sections check for overflow before every row but do not
//! repeat their title or column header on continuation pages; only the
//! transaction table does that (see [`crate::table`]).

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::canvas::{DocumentCanvas, TextAlign, TextStyle};
use crate::format::{sign_color, truncate_text, NumericFormatter, MUTED_COLOR};
use crate::model::{BudgetLine, CategoryTotal, MonthlySummary, OrderedMap, Period, ReportType};

/// Height of a regular body row.
pub const ROW_HEIGHT: f64 = 7.0;
/// Height reserved for a section title.
pub const SECTION_TITLE_HEIGHT: f64 = 10.0;
/// Vertical gap after a section.
pub const SECTION_SPACING: f64 = 6.0;
/// Distance between the footer line and the bottom edge of the page.
pub const FOOTER_OFFSET: f64 = 10.0;

/// Label printed for budget lines without a configured budget.
pub const BUDGET_NOT_SET_LABEL: &str = "Not set";

const TITLE_STYLE: TextStyle = TextStyle::new(18).bold();
const SUBTITLE_STYLE: TextStyle = TextStyle::new(13).bold();
const SECTION_TITLE_STYLE: TextStyle = TextStyle::new(14).bold();
const BODY_STYLE: TextStyle = TextStyle::new(10);
const MUTED_STYLE: TextStyle = TextStyle::new(9).colored(MUTED_COLOR);
const COLUMN_HEADER_STYLE: TextStyle = TextStyle::new(9).bold().colored(MUTED_COLOR);
const FOOTER_STYLE: TextStyle = TextStyle::new(8)
    .colored(MUTED_COLOR)
    .aligned(TextAlign::Center);

const BUDGET_CATEGORY_CHARS: usize = 24;

/// Content of the document header.
#[derive(Clone, Debug)]
pub struct HeaderInfo<'a> {
    pub title: &'a str,
    pub report_type: ReportType,
    pub period: Period,
    pub generated_at: NaiveDateTime,
}

/// Writes the title block at the top of the first page.
pub fn render_header(canvas: &mut DocumentCanvas, header: &HeaderInfo<'_>, formatter: &NumericFormatter) {
    debug_assert_eq!(canvas.page_index(), 0, "header must start on the first page");

    let left = canvas.left();
    let right = canvas.geometry().right_edge();

    canvas.write_styled(header.title, left, TITLE_STYLE);
    let _ = canvas.advance(10.0);
    canvas.write_styled(header.report_type.label(), left, SUBTITLE_STYLE);
    let _ = canvas.advance(7.0);
    canvas.write_styled(
        format!(
            "Period: {} - {}",
            formatter.format_date(header.period.start_date),
            formatter.format_date(header.period.end_date)
        ),
        left,
        BODY_STYLE,
    );
    let _ = canvas.advance(6.0);
    canvas.write_styled(
        format!("Generated on {}", formatter.format_timestamp(header.generated_at)),
        left,
        MUTED_STYLE,
    );
    let _ = canvas.advance(6.0);
    canvas.rule(left, right);
    let _ = canvas.advance(8.0);
}

/// Writes the totals block of a monthly summary. The block has a fixed height.
///
/// Returns the 1-based page the section starts on.
pub fn render_monthly_summary(
    canvas: &mut DocumentCanvas,
    summary: &MonthlySummary,
    formatter: &NumericFormatter,
) -> usize {
    let start_page = section_title(canvas, "Summary", 5.0 * ROW_HEIGHT);

    let lines: [(&str, String, Option<Decimal>); 4] = [
        (
            "Total revenue",
            formatter.format_currency(summary.total_revenue),
            None,
        ),
        (
            "Total expenses",
            formatter.format_currency(summary.total_expenses),
            None,
        ),
        (
            "Net income",
            formatter.format_currency(summary.net_income),
            Some(summary.net_income),
        ),
        ("Transactions", summary.transaction_count.to_string(), None),
    ];

    let label_x = canvas.left();
    let value_x = label_x + 100.0;
    for (label, value, signed) in lines {
        canvas.write_styled(label, label_x, BODY_STYLE);
        let mut style = BODY_STYLE.aligned(TextAlign::Right);
        if let Some(signed) = signed {
            style = style.bold().colored(sign_color(signed));
        }
        canvas.write_styled(value, value_x, style);
        let _ = canvas.advance(ROW_HEIGHT);
    }

    canvas.gap(SECTION_SPACING);
    start_page
}

/// Writes one row per category in the order received and returns the page the
/// section starts on.
pub fn render_category_breakdown(
    canvas: &mut DocumentCanvas,
    categories: &OrderedMap<CategoryTotal>,
    formatter: &NumericFormatter,
) -> usize {
    let start_page = section_title(canvas, "Breakdown by category", ROW_HEIGHT);

    let left = canvas.left();
    for (name, category) in categories.iter() {
        if canvas.will_overflow(ROW_HEIGHT) {
            canvas.new_page();
        }
        let noun = if category.count == 1 {
            "transaction"
        } else {
            "transactions"
        };
        canvas.write_styled(
            format!(
                "{}: {} ({} {})",
                name,
                formatter.format_currency(category.total),
                category.count,
                noun
            ),
            left,
            BODY_STYLE.colored(sign_color(category.kind.signed(category.total))),
        );
        let _ = canvas.advance(ROW_HEIGHT);
    }

    canvas.gap(SECTION_SPACING);
    start_page
}

/// Writes the budget comparison as fixed columns and returns the page the
/// section starts on.
pub fn render_budget_vs_actual(
    canvas: &mut DocumentCanvas,
    budgets: &OrderedMap<BudgetLine>,
    formatter: &NumericFormatter,
) -> usize {
    let start_page = section_title(canvas, "Budget vs actual", 2.0 * ROW_HEIGHT);

    let columns = BudgetColumns::new(canvas);
    let right_header = COLUMN_HEADER_STYLE.aligned(TextAlign::Right);
    canvas.write_styled("Category", columns.category, COLUMN_HEADER_STYLE);
    canvas.write_styled("Budget", columns.budget, right_header);
    canvas.write_styled("Actual", columns.actual, right_header);
    canvas.write_styled("Difference", columns.difference, right_header);
    canvas.write_styled("Used", columns.percentage, right_header);
    let _ = canvas.advance(ROW_HEIGHT);

    let right = BODY_STYLE.aligned(TextAlign::Right);
    for (name, line) in budgets.iter() {
        if canvas.will_overflow(ROW_HEIGHT) {
            canvas.new_page();
        }

        let budget = match line.budget {
            Some(amount) => formatter.format_currency(amount),
            None => BUDGET_NOT_SET_LABEL.to_owned(),
        };
        let percentage = match line.budget {
            Some(_) => formatter.format_percentage(line.percentage_used),
            None => "-".to_owned(),
        };

        canvas.write_styled(truncate_text(name, BUDGET_CATEGORY_CHARS), columns.category, BODY_STYLE);
        canvas.write_styled(budget, columns.budget, right);
        canvas.write_styled(formatter.format_currency(line.actual), columns.actual, right);
        canvas.write_styled(
            formatter.format_currency(line.difference),
            columns.difference,
            right.colored(sign_color(line.difference)),
        );
        canvas.write_styled(percentage, columns.percentage, right);
        let _ = canvas.advance(ROW_HEIGHT);
    }

    canvas.gap(SECTION_SPACING);
    start_page
}

/// Writes the footer line on the last page only.
pub fn render_footer(canvas: &mut DocumentCanvas, text: &str) {
    let page_count = canvas.page_count();
    let x = canvas.geometry().width / 2.0;
    canvas.write_at_bottom(
        format!("{} | Page {} of {}", text, page_count, page_count),
        x,
        FOOTER_OFFSET,
        FOOTER_STYLE,
    );
}

/// Writes a section title, first moving to a new page if the title and `keep_with`
/// millimetres of following content would not fit. Returns the 1-based page
/// the title landed on.
pub(crate) fn section_title(canvas: &mut DocumentCanvas, title: &str, keep_with: f64) -> usize {
    let _ = canvas.ensure_space(SECTION_TITLE_HEIGHT + keep_with);
    let page = canvas.page_index() + 1;
    let left = canvas.left();
    canvas.write_styled(title, left, SECTION_TITLE_STYLE);
    let _ = canvas.advance(SECTION_TITLE_HEIGHT);
    page
}

/// Right edges (left edge for the category) of the budget columns.
struct BudgetColumns {
    category: f64,
    budget: f64,
    actual: f64,
    difference: f64,
    percentage: f64,
}

impl BudgetColumns {
    fn new(canvas: &DocumentCanvas) -> Self {
        let geometry = canvas.geometry();
        let left = geometry.margin;
        let width = geometry.content_width();
        Self {
            category: left,
            budget: left + width * 0.47,
            actual: left + width * 0.64,
            difference: left + width * 0.82,
            percentage: geometry.right_edge(),
        }
    }
}
