//! Mapping external-clock times onto the LRC clock.

use std::borrow::Cow;

use crate::types::{Anchor, TimeTransform};

impl TimeTransform {
    /// Piecewise transform over anchors, sorted by external time.
    pub fn anchored(mut anchors: Vec<Anchor>) -> Self {
        anchors.sort_by(|a, b| a.gp_ms.total_cmp(&b.gp_ms));
        Self::Anchored { anchors }
    }

    /// Map an external time into the LRC clock.
    pub fn apply(&self, ms: f64) -> f64 {
        apply_time_transform(ms, self)
    }
}

/// Map an external-clock time into the LRC clock.
///
/// `Offset` adds a constant. `Anchored` with one anchor applies that anchor's
/// shift everywhere; with more, times outside the anchored range take the
/// nearest boundary anchor's shift and times between two anchors get a
/// linearly interpolated shift. No anchors means no change.
pub fn apply_time_transform(ms: f64, transform: &TimeTransform) -> f64 {
    match transform {
        TimeTransform::Offset { ms: offset } => ms + offset,
        TimeTransform::Anchored { anchors } => ms + anchored_shift(ms, anchors),
    }
}

/// Apply an optional transform; `None` is the identity.
pub fn map_time(ms: f64, transform: Option<&TimeTransform>) -> f64 {
    transform.map_or(ms, |t| apply_time_transform(ms, t))
}

/// Anchors ordered by external time, copying only when they are not already.
fn ordered(anchors: &[Anchor]) -> Cow<'_, [Anchor]> {
    if anchors.windows(2).all(|w| w[0].gp_ms <= w[1].gp_ms) {
        Cow::Borrowed(anchors)
    } else {
        let mut sorted = anchors.to_vec();
        sorted.sort_by(|a, b| a.gp_ms.total_cmp(&b.gp_ms));
        Cow::Owned(sorted)
    }
}

fn anchored_shift(ms: f64, anchors: &[Anchor]) -> f64 {
    let anchors = ordered(anchors);
    let anchors = anchors.as_ref();
    let (Some(first), Some(last)) = (anchors.first(), anchors.last()) else {
        return 0.0;
    };
    if ms <= first.gp_ms {
        return first.shift();
    }
    if ms >= last.gp_ms {
        return last.shift();
    }

    // First anchor strictly after `ms`; bounds above guarantee 1..len
    let upper = anchors.partition_point(|a| a.gp_ms <= ms);
    let (a, b) = (&anchors[upper - 1], &anchors[upper]);
    let span = b.gp_ms - a.gp_ms;
    if span <= 0.0 {
        return a.shift();
    }
    let t = (ms - a.gp_ms) / span;
    a.shift() + t * (b.shift() - a.shift())
}
