//! Summary statistics computed over already-fetched results.

use crate::models::{ModelStatus, ParameterResult, StatusBreakdown, StatusStats, TrackedSubmission};
use crate::normalise::{AgreementBadge, AgreementTier};

// ---------------------------------------------------------------------------
// Parameter tally (inference result / detail page)
// ---------------------------------------------------------------------------

/// Counts of parameter outcomes. Every parameter lands in exactly one of
/// `agreed`, `disagreed`, `no_ground_truth` or `errors`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterTally {
    pub total: usize,
    pub agreed: usize,
    pub disagreed: usize,
    pub no_ground_truth: usize,
    pub errors: usize,
    pub production_models: usize,
    pub shadow_models: usize,
}

impl ParameterTally {
    pub fn from_parameters(params: &[ParameterResult]) -> Self {
        let mut tally = Self { total: params.len(), ..Default::default() };
        for p in params {
            match AgreementBadge::for_parameter(p) {
                AgreementBadge::Agree         => tally.agreed += 1,
                AgreementBadge::Disagree      => tally.disagreed += 1,
                AgreementBadge::NoGroundTruth => tally.no_ground_truth += 1,
                AgreementBadge::Error         => tally.errors += 1,
            }
            match p.model_status {
                Some(ModelStatus::Production) => tally.production_models += 1,
                Some(ModelStatus::ShadowMode) => tally.shadow_models += 1,
                _ => {}
            }
        }
        tally
    }

    /// Agreement percentage over parameters that could be checked against ground truth.
    pub fn agreement_rate(&self) -> Option<f64> {
        let evaluated = self.agreed + self.disagreed;
        if evaluated == 0 {
            None
        } else {
            Some(self.agreed as f64 / evaluated as f64 * 100.0)
        }
    }
}

// ---------------------------------------------------------------------------
// Overview stats (submission list)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverviewStats {
    pub total: usize,
    pub avg_agreement: f64,
    pub high_performers: usize,
    pub best_agreement: f64,
    pub worst_agreement: f64,
}

impl OverviewStats {
    /// `None` for an empty list: there is nothing to summarise.
    pub fn from_submissions<'a, I>(submissions: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a TrackedSubmission>,
    {
        let pcts: Vec<f64> = submissions
            .into_iter()
            .map(|s| s.overall_agreement_pct)
            .collect();
        if pcts.is_empty() {
            return None;
        }
        let total = pcts.len();
        Some(Self {
            total,
            avg_agreement: pcts.iter().sum::<f64>() / total as f64,
            high_performers: pcts
                .iter()
                .filter(|p| AgreementTier::from_pct(**p) == AgreementTier::High)
                .count(),
            best_agreement: pcts.iter().copied().fold(f64::MIN, f64::max),
            worst_agreement: pcts.iter().copied().fold(f64::MAX, f64::min),
        })
    }

    pub fn high_performer_share(&self) -> f64 {
        self.high_performers as f64 / self.total as f64 * 100.0
    }

    pub fn range_label(&self) -> String {
        format!("{:.0}% - {:.0}%", self.worst_agreement, self.best_agreement)
    }
}

// ---------------------------------------------------------------------------
// Production vs shadow comparison (detail page)
// ---------------------------------------------------------------------------

/// Below this absolute difference (percentage points) both deployments count as equal.
pub const SIMILARITY_BAND: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusComparison {
    Similar,
    ShadowAhead(f64),
    ProductionAhead(f64),
}

impl StatusComparison {
    /// Compare only when both deployments actually tested something.
    pub fn between(production: &StatusStats, shadow: &StatusStats) -> Option<Self> {
        if production.total == 0 || shadow.total == 0 {
            return None;
        }
        let diff = shadow.agreement_pct - production.agreement_pct;
        Some(if diff.abs() < SIMILARITY_BAND {
            StatusComparison::Similar
        } else if diff > 0.0 {
            StatusComparison::ShadowAhead(diff.abs())
        } else {
            StatusComparison::ProductionAhead(diff.abs())
        })
    }

    pub fn from_breakdown(breakdown: &StatusBreakdown) -> Option<Self> {
        match (&breakdown.production, &breakdown.shadow_mode) {
            (Some(prod), Some(shadow)) => Self::between(prod, shadow),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            StatusComparison::Similar => {
                "Production and Shadow models performing similarly".to_string()
            }
            StatusComparison::ShadowAhead(d) => {
                format!("Shadow models outperforming Production by {:.1}%", d)
            }
            StatusComparison::ProductionAhead(d) => {
                format!("Production models outperforming Shadow by {:.1}%", d)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParameterStatus;

    fn p(status: ParameterStatus, agreement: Option<bool>, model: Option<ModelStatus>) -> ParameterResult {
        ParameterResult { status, agreement, model_status: model, ..Default::default() }
    }

    #[test]
    fn test_tally_partitions_parameters() {
        let params = vec![
            p(ParameterStatus::Success, Some(true), Some(ModelStatus::Production)),
            p(ParameterStatus::Success, Some(true), Some(ModelStatus::ShadowMode)),
            p(ParameterStatus::Success, Some(false), Some(ModelStatus::Production)),
            p(ParameterStatus::Success, None, None),
            p(ParameterStatus::Error, Some(true), Some(ModelStatus::Production)),
        ];
        let tally = ParameterTally::from_parameters(&params);
        assert_eq!(tally.total, 5);
        assert_eq!(tally.agreed, 2);
        assert_eq!(tally.disagreed, 1);
        assert_eq!(tally.no_ground_truth, 1);
        assert_eq!(tally.errors, 1);
        assert_eq!(tally.agreed + tally.disagreed + tally.no_ground_truth + tally.errors, tally.total);
        assert_eq!(tally.production_models, 3);
        assert_eq!(tally.shadow_models, 1);

        let rate = tally.agreement_rate().unwrap();
        assert!((rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_tally_without_ground_truth_has_no_rate() {
        let params = vec![p(ParameterStatus::Success, None, None)];
        assert_eq!(ParameterTally::from_parameters(&params).agreement_rate(), None);
    }

    #[test]
    fn test_overview_stats() {
        let subs: Vec<TrackedSubmission> = [90.0, 60.0, 30.0, 80.0]
            .iter()
            .map(|pct| TrackedSubmission { overall_agreement_pct: *pct, ..Default::default() })
            .collect();
        let stats = OverviewStats::from_submissions(&subs).unwrap();
        assert_eq!(stats.total, 4);
        assert!((stats.avg_agreement - 65.0).abs() < 1e-9);
        assert_eq!(stats.high_performers, 2);
        assert!((stats.high_performer_share() - 50.0).abs() < 1e-9);
        assert_eq!(stats.range_label(), "30% - 90%");
    }

    #[test]
    fn test_overview_stats_empty() {
        let subs: Vec<TrackedSubmission> = Vec::new();
        assert!(OverviewStats::from_submissions(&subs).is_none());
    }

    #[test]
    fn test_status_comparison() {
        let prod = StatusStats { total: 10, correct: 7, agreement_pct: 70.0 };
        let close = StatusStats { total: 4, correct: 3, agreement_pct: 73.0 };
        let better = StatusStats { total: 4, correct: 4, agreement_pct: 82.5 };
        let worse = StatusStats { total: 4, correct: 2, agreement_pct: 50.0 };
        let empty = StatusStats::default();

        assert_eq!(StatusComparison::between(&prod, &close), Some(StatusComparison::Similar));
        assert_eq!(
            StatusComparison::between(&prod, &better).unwrap().message(),
            "Shadow models outperforming Production by 12.5%"
        );
        assert_eq!(
            StatusComparison::between(&prod, &worse).unwrap().message(),
            "Production models outperforming Shadow by 20.0%"
        );
        assert_eq!(StatusComparison::between(&prod, &empty), None);
    }
}
