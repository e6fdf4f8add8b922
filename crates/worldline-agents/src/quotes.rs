//! Context-keyed flavor quotes for the dashboard.

use chrono::{Datelike, NaiveDate};
use rand::Rng;

use worldline_types::QuoteContext;

/// Quote shown when the context label is not recognised.
pub const DEFAULT_QUOTE: &str = "El Psy Kongroo.";

const MORNING: &[&str] = &[
    "The universe has a beginning, but no end. Infinity. Today is a new beginning.",
    "Every day is a new worldline. Make it count.",
    "I am the mad scientist, Hououin Kyouma! And today I will not be defeated!",
];

const EVENING: &[&str] = &[
    "Rest now. Tomorrow, we change the worldline again.",
    "Even a genius needs sleep. Especially a genius.",
    "The day is over, but the records remain. Write them honestly.",
];

const MOTIVATION: &[&str] = &[
    "No one knows what the future holds. That's why its potential is infinite.",
    "You can't undo the past, but you can choose what you do next.",
    "Science is the pursuit of understanding. So is self-improvement.",
];

const SETBACK: &[&str] = &[
    "Failure is just data from a worldline you didn't want.",
    "Even across a million worldlines, you only need to reach one.",
    "It's fine to stumble. What matters is that you get back up.",
];

/// The quote pool for `context`.
pub const fn quotes_for(context: QuoteContext) -> &'static [&'static str] {
    match context {
        QuoteContext::Morning => MORNING,
        QuoteContext::Evening => EVENING,
        QuoteContext::Motivation => MOTIVATION,
        QuoteContext::Setback => SETBACK,
    }
}

/// A random quote for `context`.
pub fn quote_for(context: QuoteContext, rng: &mut impl Rng) -> &'static str {
    let pool = quotes_for(context);
    if pool.is_empty() {
        return DEFAULT_QUOTE;
    }
    let idx: usize = rng.random_range(0..pool.len());
    pool.get(idx).copied().unwrap_or(DEFAULT_QUOTE)
}

/// A random quote for a context given by label, or [`DEFAULT_QUOTE`].
pub fn quote_for_label(label: &str, rng: &mut impl Rng) -> &'static str {
    QuoteContext::from_label(label).map_or(DEFAULT_QUOTE, |context| quote_for(context, rng))
}

/// The quote for `context` on `date`. Stable for the whole day.
pub fn quote_of_the_day(context: QuoteContext, date: NaiveDate) -> &'static str {
    let pool = quotes_for(context);
    let day = u64::try_from(date.num_days_from_ce()).unwrap_or(0);
    let len = u64::try_from(pool.len()).unwrap_or(0);
    day.checked_rem(len)
        .and_then(|idx| usize::try_from(idx).ok())
        .and_then(|idx| pool.get(idx).copied())
        .unwrap_or(DEFAULT_QUOTE)
}
