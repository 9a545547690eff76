//! Ratio vector → ranked archetypes.

use crate::registry::ArchetypeProfile;
use crate::types::{RatioVector, ScoredCandidate};

/// Absolute deviation at which a dimension stops contributing.
///
/// Shared by every dimension and every profile.
pub const SIMILARITY_TOLERANCE: f64 = 0.2;

const DISPLAY_FLOOR: f64 = 60.0;
const DISPLAY_SPAN: f64 = 40.0;

/// Per-dimension similarity: 1 at zero deviation, falling linearly to 0 at
/// `tolerance` and clamped there.
pub fn closeness(measured: f64, target: f64, tolerance: f64) -> f64 {
    (1.0 - (measured - target).abs() / tolerance).max(0.0)
}

/// Map an internal score in [0, 1] to the user-facing 60–100 range.
///
/// Halves round up.
pub fn display_percent(score: f64) -> u8 {
    let percent = (DISPLAY_FLOOR + score.clamp(0.0, 1.0) * DISPLAY_SPAN + 0.5).floor();
    percent as u8
}

/// Strategy for scoring a measured face against one archetype's targets.
pub trait Scorer {
    fn score(&self, measured: &RatioVector, target: &RatioVector) -> f64;
}

/// Unweighted mean of clamped per-dimension closeness.
#[derive(Debug, Clone, Copy)]
pub struct ToleranceScorer {
    pub tolerance: f64,
}

impl Default for ToleranceScorer {
    fn default() -> Self {
        Self {
            tolerance: SIMILARITY_TOLERANCE,
        }
    }
}

impl Scorer for ToleranceScorer {
    fn score(&self, measured: &RatioVector, target: &RatioVector) -> f64 {
        let (sum, count) = measured
            .iter()
            .zip(target.iter())
            .fold((0.0, 0usize), |(sum, n), ((_, m), (_, t))| {
                (sum + closeness(m, t, self.tolerance), n + 1)
            });
        sum / count as f64
    }
}

/// Score every profile with the default [`ToleranceScorer`] and sort
/// descending. Equal scores keep catalog order.
pub fn rank<'a>(ratios: &RatioVector, profiles: &'a [ArchetypeProfile]) -> Vec<ScoredCandidate<'a>> {
    rank_with(&ToleranceScorer::default(), ratios, profiles)
}

/// [`rank`] with an explicit scoring strategy.
pub fn rank_with<'a>(
    scorer: &dyn Scorer,
    ratios: &RatioVector,
    profiles: &'a [ArchetypeProfile],
) -> Vec<ScoredCandidate<'a>> {
    let mut ranked: Vec<ScoredCandidate<'a>> = profiles
        .iter()
        .map(|profile| ScoredCandidate {
            profile,
            score: scorer.score(ratios, &profile.targets),
        })
        .collect();

    // `sort_by` is stable, which keeps ties in catalog order.
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for candidate in &ranked {
        tracing::debug!(key = %candidate.profile.key, score = candidate.score, "scored archetype");
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::{profile, ratios};
    use crate::registry::Registry;
    use crate::types::RatioKey;

    fn cat() -> RatioVector {
        ratios([1.1, 0.55, 0.28, 0.42, 0.5])
    }

    #[test]
    fn test_closeness_clamps() {
        assert_eq!(closeness(0.5, 0.5, 0.2), 1.0);
        assert!((closeness(0.6, 0.5, 0.2) - 0.5).abs() < 1e-12);
        assert!((closeness(0.4, 0.5, 0.2) - 0.5).abs() < 1e-12);
        assert_eq!(closeness(0.75, 0.5, 0.2), 0.0);
        assert_eq!(closeness(5.0, 0.5, 0.2), 0.0);
    }

    #[test]
    fn test_self_match_is_perfect() {
        let scorer = ToleranceScorer::default();
        for p in Registry::builtin().profiles() {
            assert_eq!(scorer.score(&p.targets, &p.targets), 1.0, "{}", p.key);
        }
    }

    #[test]
    fn test_score_is_mean_of_clamped_terms() {
        let scorer = ToleranceScorer::default();
        let target = cat();
        let mut measured = target;
        // One dimension fully out of tolerance, one at half tolerance.
        measured.face_ratio += 0.5;
        measured.jaw_width += 0.1;
        let score = scorer.score(&measured, &target);
        let expected = (0.0 + 1.0 + 1.0 + 1.0 + 0.5) / 5.0;
        assert!((score - expected).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn test_score_bounded_and_non_increasing() {
        let scorer = ToleranceScorer::default();
        let target = cat();
        for key in RatioKey::ALL {
            let mut prev = 1.0;
            for step in 0..40 {
                let mut measured = target;
                let delta = step as f64 * 0.01;
                match key {
                    RatioKey::FaceRatio => measured.face_ratio += delta,
                    RatioKey::EyeDistance => measured.eye_distance += delta,
                    RatioKey::NoseLength => measured.nose_length += delta,
                    RatioKey::MouthWidth => measured.mouth_width += delta,
                    RatioKey::JawWidth => measured.jaw_width += delta,
                }
                let score = scorer.score(&measured, &target);
                assert!((0.0..=1.0).contains(&score), "{key} step {step}: {score}");
                assert!(score <= prev + 1e-12, "{key} step {step}: {score} > {prev}");
                prev = score;
            }
            // Past tolerance the dimension contributes exactly nothing.
            assert!((prev - 0.8).abs() < 1e-12, "{key}: {prev}");
        }
    }

    #[test]
    fn test_score_zero_when_everything_far() {
        let scorer = ToleranceScorer::default();
        let far = ratios([9.0, 9.0, 9.0, 9.0, 9.0]);
        assert_eq!(scorer.score(&far, &cat()), 0.0);
    }

    #[test]
    fn test_rank_cat_fixture_first() {
        let registry = Registry::builtin();
        let ranked = rank(&cat(), registry.profiles());
        assert_eq!(ranked.len(), registry.len());
        assert_eq!(ranked[0].profile.key, "cat");
        assert_eq!(ranked[0].score, 1.0);
        assert_eq!(display_percent(ranked[0].score), 100);
    }

    #[test]
    fn test_rank_descending() {
        let ranked = rank(&ratios([1.2, 0.5, 0.3, 0.45, 0.5]), Registry::builtin().profiles());
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_rank_ties_keep_catalog_order() {
        let t = ratios([1.0, 0.5, 0.3, 0.4, 0.5]);
        let profiles = vec![
            profile("far", ratios([2.0, 2.0, 2.0, 2.0, 2.0])),
            profile("first", t),
            profile("second", t),
        ];
        let ranked = rank(&t, &profiles);
        let keys: Vec<&str> = ranked.iter().map(|c| c.profile.key.as_str()).collect();
        assert_eq!(keys, vec!["first", "second", "far"]);

        let again = rank(&t, &profiles);
        let keys_again: Vec<&str> = again.iter().map(|c| c.profile.key.as_str()).collect();
        assert_eq!(keys, keys_again);
    }

    #[test]
    fn test_rank_empty_catalog() {
        assert!(rank(&cat(), &[]).is_empty());
    }

    #[test]
    fn test_rank_with_custom_scorer() {
        struct Inverted;
        impl Scorer for Inverted {
            fn score(&self, measured: &RatioVector, target: &RatioVector) -> f64 {
                1.0 - ToleranceScorer::default().score(measured, target)
            }
        }
        let ranked = rank_with(&Inverted, &cat(), Registry::builtin().profiles());
        assert_ne!(ranked[0].profile.key, "cat");
        assert_eq!(ranked.last().unwrap().profile.key, "cat");
    }

    #[test]
    fn test_display_percent() {
        assert_eq!(display_percent(0.0), 60);
        assert_eq!(display_percent(1.0), 100);
        assert_eq!(display_percent(0.5), 80);
        // 60 + 0.1875 * 40 = 67.5 rounds up.
        assert_eq!(display_percent(0.1875), 68);
        assert_eq!(display_percent(0.5625), 83);
        assert_eq!(display_percent(0.01), 60);
        assert_eq!(display_percent(0.99), 100);
    }
}
