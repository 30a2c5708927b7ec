use std::collections::HashSet;

use crate::models::OddsLine;

/// What changed between two polling cycles.
///
/// There is no "modified" bucket: the board publishes no stable key, so a
/// line whose price moved surfaces as one entry in `added_or_changed` (the
/// new version) and one in `removed` (the old version).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeReport {
    pub added_or_changed: Vec<OddsLine>,
    pub removed: Vec<OddsLine>,
}

impl ChangeReport {
    pub fn is_empty(&self) -> bool {
        self.added_or_changed.is_empty() && self.removed.is_empty()
    }
}

/// Field-wise set difference between the current and previous cycle,
/// preserving document order within each bucket.
pub fn diff_cycles(current: &[OddsLine], previous: &[OddsLine]) -> ChangeReport {
    let previous_set: HashSet<&OddsLine> = previous.iter().collect();
    let current_set: HashSet<&OddsLine> = current.iter().collect();

    ChangeReport {
        added_or_changed: current
            .iter()
            .filter(|line| !previous_set.contains(*line))
            .cloned()
            .collect(),
        removed: previous
            .iter()
            .filter(|line| !current_set.contains(*line))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BetType;

    fn line(team: &str, price: &str) -> OddsLine {
        OddsLine {
            league: "NFL".to_string(),
            event_time: "2025-08-20T23:05:00+00:00".to_string(),
            team1: "Kansas City Chiefs".to_string(),
            team2: "Buffalo Bills".to_string(),
            pitcher: String::new(),
            period: "Full Game".to_string(),
            bet_type: BetType::Moneyline,
            price: price.to_string(),
            side: team.to_string(),
            subject: team.to_string(),
            line_value: "0".to_string(),
        }
    }

    #[test]
    fn test_identical_cycles_report_nothing() {
        let cycle = vec![line("Kansas City Chiefs", "-133"), line("Buffalo Bills", "+110")];
        let report = diff_cycles(&cycle, &cycle);
        assert!(report.is_empty());
    }

    #[test]
    fn test_price_move_is_one_addition_and_one_removal() {
        let previous = vec![line("Kansas City Chiefs", "-133"), line("Buffalo Bills", "+110")];
        let current = vec![line("Kansas City Chiefs", "-140"), line("Buffalo Bills", "+110")];

        let report = diff_cycles(&current, &previous);
        assert_eq!(report.added_or_changed, vec![line("Kansas City Chiefs", "-140")]);
        assert_eq!(report.removed, vec![line("Kansas City Chiefs", "-133")]);
    }

    #[test]
    fn test_new_game_is_added_only() {
        let previous = vec![line("Kansas City Chiefs", "-133")];
        let current = vec![line("Kansas City Chiefs", "-133"), line("Buffalo Bills", "+110")];

        let report = diff_cycles(&current, &previous);
        assert_eq!(report.added_or_changed, vec![line("Buffalo Bills", "+110")]);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_diff_is_symmetric() {
        let a = vec![line("Kansas City Chiefs", "-133"), line("Buffalo Bills", "+110")];
        let b = vec![line("Kansas City Chiefs", "-140"), line("Miami Dolphins", "+250")];

        let forward = diff_cycles(&a, &b);
        let backward = diff_cycles(&b, &a);
        assert_eq!(forward.removed, backward.added_or_changed);
        assert_eq!(forward.added_or_changed, backward.removed);
    }

    #[test]
    fn test_empty_previous_reports_everything_added() {
        let current = vec![line("Kansas City Chiefs", "-133")];
        let report = diff_cycles(&current, &[]);
        assert_eq!(report.added_or_changed.len(), 1);
        assert!(report.removed.is_empty());
    }
}
