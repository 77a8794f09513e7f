use chrono::NaiveDate;
use proptest::prelude::*;
use proptest::test_runner::Config;
use rust_decimal::Decimal;

use finreport::canvas::{DocumentCanvas, PageGeometry};
use finreport::format::{sign_color, truncate_text, Locale, NumericFormatter, NEGATIVE_COLOR, POSITIVE_COLOR};
use finreport::model::{Transaction, TransactionKind};
use finreport::table::{TableOptions, TableRenderer};

fn listing(count: usize) -> Vec<Transaction> {
    let day = NaiveDate::from_ymd_opt(2024, 5, 14).unwrap();
    (0..count)
        .map(|index| {
            Transaction::new(format!("t{}", index), TransactionKind::Revenue, Decimal::from(index), day)
        })
        .collect()
}

fn cents() -> impl Strategy<Value = Decimal> {
    (-100_000_000_i64..100_000_000_i64).prop_map(|value| Decimal::new(value, 2))
}

proptest! {
    #![proptest_config(Config::with_cases(64))]
    #[test]
    fn table_repeats_header_on_every_page(count in 1_usize..200) {
        let geometry = PageGeometry::A4;
        let per_page = TableRenderer::rows_per_page(&geometry);
        let renderer = TableRenderer::new(TableOptions { max_rows: count, ..TableOptions::default() });
        let mut canvas = DocumentCanvas::new(geometry);

        let summary = renderer.render_rows(&mut canvas, &listing(count), &NumericFormatter::default());

        prop_assert_eq!(per_page, 35);
        prop_assert_eq!(summary.rows_rendered, count);
        prop_assert_eq!(summary.pages_touched, (count + per_page - 1) / per_page);
        prop_assert_eq!(summary.header_count, summary.pages_touched);
        prop_assert_eq!(canvas.page_count(), summary.pages_touched);
    }

    #[test]
    fn row_cap_bounds_rendered_rows(count in 0_usize..150, max_rows in 0_usize..80) {
        let renderer = TableRenderer::new(TableOptions { max_rows, ..TableOptions::default() });
        let mut canvas = DocumentCanvas::new(PageGeometry::A4);

        let summary = renderer.render_rows(&mut canvas, &listing(count), &NumericFormatter::default());

        prop_assert_eq!(summary.rows_rendered, count.min(max_rows));
        prop_assert_eq!(summary.rows_rendered + summary.omitted, count);
        prop_assert_eq!(summary.header_count, summary.pages_touched);
    }

    #[test]
    fn sign_color_follows_sign(value in cents()) {
        let expected = if value < Decimal::ZERO { NEGATIVE_COLOR } else { POSITIVE_COLOR };
        prop_assert_eq!(sign_color(value), expected);
    }

    #[test]
    fn currency_formatting_is_deterministic(value in cents()) {
        for locale in [Locale::fr_fr(), Locale::en_us()] {
            let formatter = NumericFormatter::new(locale.clone());
            let first = formatter.format_currency(value);
            prop_assert_eq!(&first, &NumericFormatter::new(locale).format_currency(value));
            prop_assert_eq!(first.starts_with('-'), value < Decimal::ZERO);
        }
    }

    #[test]
    fn truncation_respects_limit(text in "[a-zA-Zéü ]{0,80}", max_chars in 0_usize..60) {
        let truncated = truncate_text(&text, max_chars);
        prop_assert!(truncated.chars().count() <= max_chars);
        if text.chars().count() <= max_chars {
            prop_assert_eq!(truncated, text);
        }
    }
}
