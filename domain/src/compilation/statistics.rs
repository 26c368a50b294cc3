//! Submission-level compliance statistics.

use super::entities::CompiledItem;
use crate::vote::VoteValue;
use serde::{Deserialize, Serialize};

/// Aggregated determination counts over a compilation's items.
///
/// The determination used for each item is the lead reader's final
/// determination when present, the computed consensus otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ComplianceStatistics {
    pub total: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub not_applicable: usize,
    /// Items that have any determination at all.
    pub determined: usize,
    /// `compliant / (total - not_applicable)`, 0.0 when nothing is gradable.
    pub compliance_rate: f64,
}

impl ComplianceStatistics {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a CompiledItem>) -> Self {
        let mut stats = Self::default();

        for item in items {
            stats.total += 1;
            let Some(determination) = item.determination() else {
                continue;
            };
            stats.determined += 1;
            match determination {
                VoteValue::Compliant => stats.compliant += 1,
                VoteValue::NonCompliant => stats.non_compliant += 1,
                VoteValue::NotApplicable => stats.not_applicable += 1,
                VoteValue::Unset => stats.determined -= 1,
            }
        }

        let gradable = stats.total.saturating_sub(stats.not_applicable);
        stats.compliance_rate = if gradable == 0 {
            0.0
        } else {
            stats.compliant as f64 / gradable as f64
        };

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::SpecItemKey;
    use crate::vote::Vote;

    fn item(n: usize, votes: Vec<Vote>) -> CompiledItem {
        CompiledItem::from_votes(SpecItemKey::new("I", format!("I.{}", n)), votes)
    }

    #[test]
    fn test_compliance_rate_excludes_not_applicable() {
        // 10 items: 6 compliant, 2 non-compliant, 2 not applicable
        let mut items = Vec::new();
        for n in 1..=6 {
            items.push(item(n, vec![Vote::compliant("r1", "")]));
        }
        for n in 7..=8 {
            items.push(item(n, vec![Vote::non_compliant("r1", "")]));
        }
        for n in 9..=10 {
            items.push(item(n, vec![Vote::not_applicable("r1", "")]));
        }

        let stats = ComplianceStatistics::from_items(&items);
        assert_eq!(stats.total, 10);
        assert_eq!(stats.compliant, 6);
        assert_eq!(stats.non_compliant, 2);
        assert_eq!(stats.not_applicable, 2);
        assert_eq!(stats.determined, 10);
        assert!((stats.compliance_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rate_guards_divide_by_zero() {
        let items = vec![
            item(1, vec![Vote::not_applicable("r1", "")]),
            item(2, vec![Vote::not_applicable("r1", "")]),
        ];
        let stats = ComplianceStatistics::from_items(&items);
        assert_eq!(stats.compliance_rate, 0.0);
    }

    #[test]
    fn test_override_wins_over_consensus() {
        let mut compiled = item(1, vec![Vote::compliant("r1", ""), Vote::compliant("r2", "")]);
        compiled.final_determination = Some(VoteValue::NonCompliant);

        let stats = ComplianceStatistics::from_items(std::iter::once(&compiled));
        assert_eq!(stats.non_compliant, 1);
        assert_eq!(stats.compliant, 0);
    }

    #[test]
    fn test_undetermined_items_counted_in_total_only() {
        let items = vec![item(1, vec![]), item(2, vec![Vote::compliant("r1", "")])];
        let stats = ComplianceStatistics::from_items(&items);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.determined, 1);
        assert!((stats.compliance_rate - 0.5).abs() < f64::EPSILON);
    }
}
