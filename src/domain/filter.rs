use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::domain::Article;

/// Publication-date window applied on top of a loaded feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    Today,
    LastWeek,
    LastMonth,
    Custom {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl DateFilter {
    pub fn display_name(&self) -> String {
        match self {
            DateFilter::All => "All".to_string(),
            DateFilter::Today => "Today".to_string(),
            DateFilter::LastWeek => "Last 7 Days".to_string(),
            DateFilter::LastMonth => "Last 30 Days".to_string(),
            DateFilter::Custom { from, to } => {
                format!("{} - {}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
            }
        }
    }

    /// Next preset window. A custom range cycles back to `All`.
    pub fn next(&self) -> Self {
        match self {
            DateFilter::All => DateFilter::Today,
            DateFilter::Today => DateFilter::LastWeek,
            DateFilter::LastWeek => DateFilter::LastMonth,
            DateFilter::LastMonth | DateFilter::Custom { .. } => DateFilter::All,
        }
    }

    /// Inclusive bounds of the window; `(None, None)` means unbounded.
    ///
    /// "Today" starts at UTC midnight.
    pub fn date_range(&self, now: DateTime<Utc>) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        match *self {
            DateFilter::All => (None, None),
            DateFilter::Today => {
                let start = now
                    .date_naive()
                    .and_hms_opt(0, 0, 0)
                    .map(|naive| naive.and_utc())
                    .unwrap_or(now);
                (Some(start), Some(now))
            }
            DateFilter::LastWeek => (Some(now - Duration::days(7)), Some(now)),
            DateFilter::LastMonth => (Some(now - Duration::days(30)), Some(now)),
            DateFilter::Custom { from, to } => (Some(from), Some(to)),
        }
    }

    /// Articles without a parseable date only pass the unbounded filter.
    pub fn matches(&self, article: &Article, now: DateTime<Utc>) -> bool {
        let (from, to) = self.date_range(now);
        if from.is_none() && to.is_none() {
            return true;
        }
        let Some(published) = article.published_date() else {
            return false;
        };
        from.map_or(true, |f| published >= f) && to.map_or(true, |t| published <= t)
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl FromStr for DateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(DateFilter::All),
            "today" => Ok(DateFilter::Today),
            "week" | "last-week" | "7d" => Ok(DateFilter::LastWeek),
            "month" | "last-month" | "30d" => Ok(DateFilter::LastMonth),
            other => Err(format!(
                "Invalid date filter: {}. Use all, today, week or month",
                other
            )),
        }
    }
}
