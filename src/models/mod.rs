use serde::{Deserialize, Serialize};
use std::fmt;

/// Wagering category for a single betting line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetType {
    Moneyline,
    Spread,
    Totals,
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BetType::Moneyline => "moneyline",
            BetType::Spread => "spread",
            BetType::Totals => "totals",
        };
        write!(f, "{}", label)
    }
}

/// One normalized betting-line observation from the odds board.
///
/// Full-field equality is the only identity: a price move shows up as a new
/// line that fails equality against its predecessor, never as a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OddsLine {
    /// Sport/league label as published in the section header, e.g. "NFL".
    pub league: String,
    /// ISO-8601 UTC start time, or the status "FINAL" / "IN PROGRESS".
    pub event_time: String,
    /// First listed participant, in document order.
    pub team1: String,
    /// Second listed participant, in document order.
    pub team2: String,
    /// Reserved for baseball starting pitchers; empty otherwise.
    pub pitcher: String,
    /// Scope of the line, e.g. "Full Game", "1st Half".
    pub period: String,
    pub bet_type: BetType,
    /// Quoted American price as listed ("-133", "+105"), or "N/A".
    pub price: String,
    /// Team being backed, "draw", or "over"/"under" for totals.
    pub side: String,
    /// Team name, "draw", or the literal "total" for totals lines.
    pub subject: String,
    /// Spread or total number exactly as listed; "0" for moneyline and
    /// draw lines, "N/A" when the book has withdrawn the line.
    pub line_value: String,
}
