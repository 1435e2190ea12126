//! Clock offset recovery between the external source and the LRC clock.

use crate::config::EngineConfig;
use crate::types::{Anchor, LyricLine, TimeTransform, WordPatch};

/// Median of `values`, averaging the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Robust offset of the external clock relative to the LRC clock.
///
/// Each patch contributes `patch.start_ms - line.start_time_ms`; the result is
/// the median, so a minority of wildly wrong alignments cannot drag it.
/// Patches pointing at lines that do not exist are ignored.
#[allow(clippy::cast_precision_loss)]
pub fn estimate_global_offset(lines: &[LyricLine], patches: &[WordPatch]) -> Option<f64> {
    let offsets: Vec<f64> = patches
        .iter()
        .filter_map(|p| {
            let line = lines.get(p.line_index)?;
            Some((p.start_ms - line.start_time_ms) as f64)
        })
        .collect();
    median(&offsets)
}

/// Anchors from lines whose first word was aligned.
///
/// Anchors whose shift strays from the median shift by more than
/// `config.anchor_outlier_ms` are discarded, then any anchor that would break
/// strict monotonicity in either clock is dropped.
#[allow(clippy::cast_precision_loss)]
pub fn build_anchors(lines: &[LyricLine], patches: &[WordPatch], config: &EngineConfig) -> Vec<Anchor> {
    let candidates: Vec<Anchor> = patches
        .iter()
        .filter(|p| p.word_index == 0)
        .filter_map(|p| {
            let line = lines.get(p.line_index)?;
            Some(Anchor::new(p.start_ms as f64, line.start_time_ms as f64))
        })
        .collect();

    let shifts: Vec<f64> = candidates.iter().map(Anchor::shift).collect();
    let Some(median_shift) = median(&shifts) else {
        return Vec::new();
    };

    let mut anchors: Vec<Anchor> = Vec::with_capacity(candidates.len());
    let mut dropped = 0usize;
    for anchor in candidates {
        if (anchor.shift() - median_shift).abs() > config.anchor_outlier_ms {
            dropped += 1;
            continue;
        }
        let monotonic = anchors
            .last()
            .is_none_or(|prev| anchor.gp_ms > prev.gp_ms && anchor.lrc_ms > prev.lrc_ms);
        if monotonic {
            anchors.push(anchor);
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        tracing::warn!("Dropped {dropped} inconsistent timing anchors, kept {}", anchors.len());
    }
    anchors
}

/// Choose the transform from external times to the LRC clock.
///
/// Prefers a piecewise transform when enough anchors survive filtering, then
/// a constant offset from the median, and finally no transform at all.
pub fn select_transform(
    lines: &[LyricLine],
    patches: &[WordPatch],
    config: &EngineConfig,
) -> Option<TimeTransform> {
    let anchors = build_anchors(lines, patches, config);
    if !anchors.is_empty() && anchors.len() >= config.min_anchor_count {
        tracing::debug!("Using anchored transform over {} anchors", anchors.len());
        return Some(TimeTransform::anchored(anchors));
    }

    let offset = estimate_global_offset(lines, patches)?;
    tracing::debug!("Using constant offset of {offset:.0}ms");
    Some(TimeTransform::Offset { ms: -offset })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn line(i: usize, start: i64) -> LyricLine {
        LyricLine::new(format!("line-{i}"), "words here", start, start + 3000)
    }

    fn patch(line_index: usize, word_index: usize, start_ms: i64) -> WordPatch {
        WordPatch { line_index, word_index, start_ms, duration_ms: 200 }
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[400.0, 100.0, 300.0, 200.0]), Some(250.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_offset_none_without_patches() {
        let lines = vec![line(0, 1000)];
        assert_eq!(estimate_global_offset(&lines, &[]), None);
    }

    #[test]
    fn test_offset_ignores_outlier() {
        let lines: Vec<_> = (0..5).map(|i| line(i, 10_000 * i as i64)).collect();
        let patches = vec![
            patch(0, 0, 1_000),
            patch(1, 0, 11_010),
            patch(2, 0, 20_990),
            patch(3, 0, 31_005),
            // one wildly wrong alignment
            patch(4, 0, 140_000),
        ];
        let offset = estimate_global_offset(&lines, &patches).unwrap();
        assert!((offset - 1_005.0).abs() < f64::EPSILON);

        let mean = (1_000.0 + 1_010.0 + 990.0 + 1_005.0 + 100_000.0) / 5.0;
        assert!((offset - mean).abs() > 10_000.0);
    }

    #[test]
    fn test_offset_skips_unknown_lines() {
        let lines = vec![line(0, 0)];
        let patches = vec![patch(0, 0, 500), patch(7, 0, 99_999)];
        assert_eq!(estimate_global_offset(&lines, &patches), Some(500.0));
    }

    #[test]
    fn test_build_anchors_filters_outliers_and_order() {
        let lines: Vec<_> = (0..5).map(|i| line(i, 5_000 * i as i64)).collect();
        let patches = vec![
            patch(0, 0, 1_000),
            patch(0, 1, 1_300),
            patch(1, 0, 6_000),
            patch(2, 0, 60_000), // outlier
            patch(3, 0, 5_500),  // goes backwards in the external clock
            patch(4, 0, 21_000),
        ];
        let anchors = build_anchors(&lines, &patches, &EngineConfig::default());
        let gp: Vec<_> = anchors.iter().map(|a| a.gp_ms).collect();
        assert_eq!(gp, vec![1_000.0, 6_000.0, 21_000.0]);
    }

    #[test]
    fn test_select_transform_prefers_anchors() {
        let lines: Vec<_> = (0..4).map(|i| line(i, 4_000 * i as i64)).collect();
        let patches: Vec<_> = (0..4).map(|i| patch(i, 0, 4_000 * i as i64 + 700)).collect();
        let config = EngineConfig::default();
        match select_transform(&lines, &patches, &config) {
            Some(TimeTransform::Anchored { anchors }) => assert_eq!(anchors.len(), 4),
            other => panic!("Expected anchored transform, got {other:?}"),
        }

        let few = EngineConfig { min_anchor_count: 10, ..config };
        assert_eq!(
            select_transform(&lines, &patches, &few),
            Some(TimeTransform::Offset { ms: -700.0 })
        );
        assert_eq!(select_transform(&lines, &[], &few), None);
    }
}
