//! Data structures describing the computed report handed to the generator.
//!
//! The types mirror the JSON payload returned by the report-data endpoint of the
//! dashboard backend (camelCase field names). Category and budget mappings keep
//! the order in which the backend emitted them, so they are stored as ordered
//! vectors of `(name, value)` pairs rather than hash or tree maps.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// The three mutually exclusive report shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// Totals for revenue, expenses and net income over the period.
    MonthlySummary,
    /// Totals grouped per category.
    CategoryBreakdown,
    /// Budgeted amounts compared to actual spending per category.
    BudgetVsActual,
}

impl ReportType {
    /// Stable identifier used in file names and serialized payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MonthlySummary => "monthly_summary",
            Self::CategoryBreakdown => "category_breakdown",
            Self::BudgetVsActual => "budget_vs_actual",
        }
    }

    /// Human-readable label printed in the document header.
    pub fn label(self) -> &'static str {
        match self {
            Self::MonthlySummary => "Monthly summary",
            Self::CategoryBreakdown => "Category breakdown",
            Self::BudgetVsActual => "Budget vs actual",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive date range covered by a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Period {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }
}

/// Direction of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Revenue,
    Expense,
}

impl TransactionKind {
    /// Applies the kind's sign to an unsigned amount.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Revenue => amount,
            Self::Expense => -amount,
        }
    }
}

/// Category attached to a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl CategoryRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
            icon: None,
        }
    }
}

/// A single booked transaction. `amount` is always positive; the sign comes
/// from `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub category: Option<CategoryRef>,
}

impl Transaction {
    /// Creates an uncategorized transaction without description.
    pub fn new(
        id: impl Into<String>,
        kind: TransactionKind,
        amount: Decimal,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            amount,
            description: None,
            date,
            category: None,
        }
    }

    /// Sets the description and returns the updated transaction.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category and returns the updated transaction.
    pub fn with_category(mut self, category: CategoryRef) -> Self {
        self.category = Some(category);
        self
    }

    /// The amount carrying the sign implied by the transaction kind.
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

/// Totals of a monthly summary report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    pub transaction_count: u32,
}

/// Aggregate for a single category of a category breakdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub total: Decimal,
    pub count: u32,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// Budget comparison for a single category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLine {
    /// `None` when no budget was configured for the category.
    pub budget: Option<Decimal>,
    pub actual: Decimal,
    /// `budget - actual`; positive values mean the category stayed under budget.
    pub difference: Decimal,
    pub percentage_used: Decimal,
}

/// Mapping from category display name to a value that preserves insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry and returns the updated map. Existing keys are replaced
    /// in place so the original position is kept.
    pub fn with_entry(mut self, name: impl Into<String>, value: V) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(std::marker::PhantomData<V>);

        impl<'de, V: Deserialize<'de>> serde::de::Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map keyed by category name")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut access: A,
            ) -> Result<Self::Value, A::Error> {
                let mut map = OrderedMap::new();
                while let Some((name, value)) = access.next_entry::<String, V>()? {
                    map.insert(name, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(std::marker::PhantomData))
    }
}

/// Variant-specific report content. The tag must match [`ReportData::report_type`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ReportVariant {
    MonthlySummary(MonthlySummary),
    CategoryBreakdown(OrderedMap<CategoryTotal>),
    BudgetVsActual(OrderedMap<BudgetLine>),
}

impl ReportVariant {
    /// The report type this content belongs to.
    pub fn report_type(&self) -> ReportType {
        match self {
            Self::MonthlySummary(_) => ReportType::MonthlySummary,
            Self::CategoryBreakdown(_) => ReportType::CategoryBreakdown,
            Self::BudgetVsActual(_) => ReportType::BudgetVsActual,
        }
    }
}

/// A fully computed report ready to be turned into a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub report_type: ReportType,
    pub period: Period,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(rename = "data")]
    pub variant: ReportVariant,
}

impl ReportData {
    /// Creates a report whose type is derived from the variant content.
    pub fn new(period: Period, variant: ReportVariant) -> Self {
        Self {
            report_type: variant.report_type(),
            period,
            transactions: Vec::new(),
            variant,
        }
    }

    /// Replaces the transaction listing and returns the updated report.
    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = transactions;
        self
    }

    /// Parses a report from the JSON payload produced by the backend.
    pub fn from_json(input: &str) -> Result<Self, ReportError> {
        let report: Self = serde_json::from_str(input)?;
        report.validate()?;
        Ok(report)
    }

    /// Checks that the declared report type matches the variant content.
    pub fn validate(&self) -> Result<(), ReportError> {
        let found = self.variant.report_type();
        if found == self.report_type {
            Ok(())
        } else {
            Err(ReportError::VariantMismatch {
                expected: self.report_type,
                found,
            })
        }
    }
}
