use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::entities::app_errors::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    HighestCalories,
    LowestCalories,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Newest,
        SortOrder::Oldest,
        SortOrder::HighestCalories,
        SortOrder::LowestCalories,
    ];

    /// Value of the `ordering` query parameter; `None` means server default (newest first).
    pub fn ordering_param(&self) -> Option<&'static str> {
        match self {
            SortOrder::Newest => None,
            SortOrder::Oldest => Some("created_at"),
            SortOrder::HighestCalories => Some("-calo"),
            SortOrder::LowestCalories => Some("calo"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::HighestCalories => "highest-calories",
            SortOrder::LowestCalories => "lowest-calories",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == s.trim())
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "unknown sort order '{s}', expected one of: newest, oldest, highest-calories, lowest-calories"
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeScope {
    Day,
    Week,
    Month,
}

/// Time window a history view is narrowed to, together with its parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "value", rename_all = "lowercase")]
pub enum HistoryScope {
    #[default]
    All,
    Day(NaiveDate),
    /// Offset in weeks from the current one: 0 is this week, -1 last week.
    Week(i32),
    Month { year: i32, month: u32 },
}

impl HistoryScope {
    pub fn month(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(HistoryScope::Month { year, month })
    }

    pub fn kind(&self) -> Option<TimeScope> {
        match self {
            HistoryScope::All => None,
            HistoryScope::Day(_) => Some(TimeScope::Day),
            HistoryScope::Week(_) => Some(TimeScope::Week),
            HistoryScope::Month { .. } => Some(TimeScope::Month),
        }
    }

    /// Query parameter narrowing the server-side result set.
    pub fn query_param(&self) -> Option<(&'static str, String)> {
        match self {
            HistoryScope::All => None,
            HistoryScope::Day(date) => Some(("day", date.format("%Y-%m-%d").to_string())),
            HistoryScope::Week(offset) => Some(("week", offset.to_string())),
            HistoryScope::Month { year, month } => Some(("month", format!("{year:04}-{month:02}"))),
        }
    }
}

impl fmt::Display for HistoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.query_param() {
            None => f.write_str("all"),
            Some((name, value)) => write!(f, "{name} {value}"),
        }
    }
}

/// What the remote store is asked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryQuery {
    pub page: u32,
    pub sort: SortOrder,
    pub scope: HistoryScope,
}

/// Parameters of a controller fetch. Omitted sort or scope fall back to the
/// controller's current values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub page: u32,
    pub is_refresh: bool,
    pub sort: Option<SortOrder>,
    pub scope: Option<HistoryScope>,
}

impl FetchRequest {
    pub fn page(page: u32) -> Self {
        Self {
            page: page.max(1),
            is_refresh: false,
            sort: None,
            scope: None,
        }
    }

    pub fn refresh() -> Self {
        Self {
            is_refresh: true,
            ..Self::page(1)
        }
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_scope(mut self, scope: HistoryScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// First page or pull-to-refresh: the result replaces the list.
    pub fn resets_list(&self) -> bool {
        self.page <= 1 || self.is_refresh
    }
}

/// Fingerprint used to suppress concurrent identical fetches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub page: u32,
    pub is_refresh: bool,
    pub sort: SortOrder,
    pub scope: HistoryScope,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateFoodEntryInput {
    pub calories: f64,
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// An identical fetch is outstanding or inside its grace period.
    InFlight,
    /// A next-page fetch whose sort or scope differs from the loaded list.
    Incoherent,
    Unchanged,
    SortChangeInProgress,
    NothingMore,
    NothingToRetry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied { received: usize, added: usize },
    Skipped(SkipReason),
    /// The response arrived after a newer request superseded it.
    Discarded,
    Failed(CoreError),
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    AlreadyDeleting,
    Cancelled,
}
