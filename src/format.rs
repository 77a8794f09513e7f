//! Locale-aware formatting of amounts, percentages and dates, plus the color
//! tokens used to highlight signed values.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::TransactionKind;

/// Plain RGB color token, independent of the PDF backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl From<Rgb> for genpdf::style::Color {
    fn from(color: Rgb) -> Self {
        genpdf::style::Color::Rgb(color.0, color.1, color.2)
    }
}

/// Color used for values greater than or equal to zero.
pub const POSITIVE_COLOR: Rgb = Rgb(22, 163, 74);
/// Color used for values below zero.
pub const NEGATIVE_COLOR: Rgb = Rgb(220, 38, 38);
/// Secondary text such as timestamps and column headers.
pub const MUTED_COLOR: Rgb = Rgb(100, 116, 139);

/// Where the currency symbol is placed relative to the number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolPosition {
    Prefix,
    /// Placed after the number, separated by a space.
    Suffix,
}

/// Number and date conventions of a locale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locale {
    tag: &'static str,
    group_separator: char,
    decimal_separator: char,
    currency_symbol: &'static str,
    symbol_position: SymbolPosition,
    percent_spacing: bool,
    date_format: &'static str,
    timestamp_format: &'static str,
}

impl Locale {
    /// French conventions with euro amounts: `1 000,00 €`.
    pub fn fr_fr() -> Self {
        Self {
            tag: "fr-FR",
            group_separator: ' ',
            decimal_separator: ',',
            currency_symbol: "€",
            symbol_position: SymbolPosition::Suffix,
            percent_spacing: true,
            date_format: "%d/%m/%Y",
            timestamp_format: "%d/%m/%Y %H:%M",
        }
    }

    /// US conventions with dollar amounts: `$1,000.00`.
    pub fn en_us() -> Self {
        Self {
            tag: "en-US",
            group_separator: ',',
            decimal_separator: '.',
            currency_symbol: "$",
            symbol_position: SymbolPosition::Prefix,
            percent_spacing: false,
            date_format: "%m/%d/%Y",
            timestamp_format: "%m/%d/%Y %I:%M %p",
        }
    }

    /// BCP 47 tag of the locale.
    pub fn tag(&self) -> &'static str {
        self.tag
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::fr_fr()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag)
    }
}

/// Error returned when parsing an unsupported locale tag.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale `{0}`; expected `fr-FR` or `en-US`")]
pub struct UnknownLocale(String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().replace('_', "-").as_str() {
            "fr" | "fr-fr" => Ok(Self::fr_fr()),
            "en" | "en-us" => Ok(Self::en_us()),
            _ => Err(UnknownLocale(value.to_owned())),
        }
    }
}

/// Formats amounts, percentages and dates for a [`Locale`].
#[derive(Clone, Debug, Default)]
pub struct NumericFormatter {
    locale: Locale,
}

impl NumericFormatter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Formats `amount` with two decimals, digit grouping and the currency
    /// symbol. Negative amounts get a leading `-`.
    pub fn format_currency(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let number = self.format_unsigned(rounded.abs());
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        match self.locale.symbol_position {
            SymbolPosition::Prefix => format!("{}{}{}", sign, self.locale.currency_symbol, number),
            SymbolPosition::Suffix => format!("{}{} {}", sign, number, self.locale.currency_symbol),
        }
    }

    /// Formats a transaction amount with an explicit `+` or `-` derived from
    /// the transaction kind.
    pub fn format_signed_currency(&self, amount: Decimal, kind: TransactionKind) -> String {
        let sign = match kind {
            TransactionKind::Revenue => '+',
            TransactionKind::Expense => '-',
        };
        format!("{}{}", sign, self.format_currency(amount.abs()))
    }

    /// Formats a percentage with one decimal place.
    pub fn format_percentage(&self, value: Decimal) -> String {
        let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{:.1}", rounded).replace('.', &self.locale.decimal_separator.to_string());
        if self.locale.percent_spacing {
            format!("{} %", text)
        } else {
            format!("{}%", text)
        }
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(self.locale.date_format).to_string()
    }

    pub fn format_timestamp(&self, timestamp: NaiveDateTime) -> String {
        timestamp.format(self.locale.timestamp_format).to_string()
    }

    fn format_unsigned(&self, value: Decimal) -> String {
        let text = format!("{:.2}", value);
        let (units, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(units.len() + units.len() / 3 + cents.len() + 1);
        for (index, digit) in units.chars().enumerate() {
            if index > 0 && (units.len() - index) % 3 == 0 {
                grouped.push(self.locale.group_separator);
            }
            grouped.push(digit);
        }
        grouped.push(self.locale.decimal_separator);
        grouped.push_str(cents);
        grouped
    }
}

/// Shortens `text` to at most `max_chars` characters, replacing the tail with
/// `...` when something was cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    const ELLIPSIS: &str = "...";

    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    if max_chars <= ELLIPSIS.len() {
        return text.chars().take(max_chars).collect();
    }
    let mut truncated: String = text.chars().take(max_chars - ELLIPSIS.len()).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Picks the highlight color for a signed value: positive for `value >= 0`.
pub fn sign_color(value: Decimal) -> Rgb {
    if value.is_sign_negative() && !value.is_zero() {
        NEGATIVE_COLOR
    } else {
        POSITIVE_COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn french_currency_groups_thousands() {
        let formatter = NumericFormatter::default();
        assert_eq!(formatter.format_currency(dec!(1000)), "1 000,00 €");
        assert_eq!(formatter.format_currency(dec!(400)), "400,00 €");
        assert_eq!(formatter.format_currency(dec!(1234567.891)), "1 234 567,89 €");
        assert_eq!(formatter.format_currency(dec!(-600)), "-600,00 €");
        assert_eq!(formatter.format_currency(dec!(0.005)), "0,01 €");
    }

    #[test]
    fn us_currency_prefixes_symbol() {
        let formatter = NumericFormatter::new(Locale::en_us());
        assert_eq!(formatter.format_currency(dec!(1000)), "$1,000.00");
        assert_eq!(formatter.format_currency(dec!(-12.5)), "-$12.50");
        assert_eq!(formatter.format_currency(dec!(999)), "$999.00");
    }

    #[test]
    fn negative_zero_has_no_sign() {
        let formatter = NumericFormatter::default();
        assert_eq!(formatter.format_currency(dec!(-0.001)), "0,00 €");
        assert_eq!(sign_color(dec!(-0.00)), POSITIVE_COLOR);
    }

    #[test]
    fn signed_currency_follows_kind() {
        let formatter = NumericFormatter::default();
        assert_eq!(
            formatter.format_signed_currency(dec!(25), TransactionKind::Revenue),
            "+25,00 €"
        );
        assert_eq!(
            formatter.format_signed_currency(dec!(1500), TransactionKind::Expense),
            "-1 500,00 €"
        );
    }

    #[test]
    fn percentage_uses_locale_separator() {
        assert_eq!(NumericFormatter::default().format_percentage(dec!(75)), "75,0 %");
        assert_eq!(
            NumericFormatter::new(Locale::en_us()).format_percentage(dec!(112.46)),
            "112.5%"
        );
    }

    #[test]
    fn dates_follow_locale_pattern() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(NumericFormatter::default().format_date(date), "09/03/2024");
        assert_eq!(NumericFormatter::new(Locale::en_us()).format_date(date), "03/09/2024");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_text("Café", 4), "Café");
        assert_eq!(truncate_text("Abonnement téléphone", 10), "Abonnem...");
        assert_eq!(truncate_text("abcdef", 2), "ab");
    }

    #[test]
    fn locale_tags_parse() {
        assert_eq!("fr".parse::<Locale>().unwrap(), Locale::fr_fr());
        assert_eq!("en_US".parse::<Locale>().unwrap(), Locale::en_us());
        assert!("de-DE".parse::<Locale>().is_err());
    }
}
