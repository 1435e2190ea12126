//! Versioned JSON boundary for [`ChordEnhancementPayload`].
//!
//! `formatVersion` guards the layout: payloads from a newer layout are
//! refused outright. `algoVersion` is informational; an older value still
//! loads and [`is_stale`] lets the caller decide whether to regenerate.

use std::path::Path;

use crate::constants::payload::{ALGO_VERSION, FORMAT_VERSION};
use crate::error::{Error, Result};
use crate::types::{ChordEnhancementPayload, TimeTransform};

/// Serialize a payload as compact JSON.
pub fn to_json(payload: &ChordEnhancementPayload) -> Result<String> {
    Ok(serde_json::to_string(payload)?)
}

/// Serialize a payload as indented JSON.
pub fn to_json_pretty(payload: &ChordEnhancementPayload) -> Result<String> {
    Ok(serde_json::to_string_pretty(payload)?)
}

/// Parse a payload, rejecting layouts newer than this crate understands.
///
/// Anchors of an anchored transform come back ordered by external time.
pub fn from_json(json: &str) -> Result<ChordEnhancementPayload> {
    let mut payload: ChordEnhancementPayload = serde_json::from_str(json)?;
    if payload.format_version > FORMAT_VERSION {
        return Err(Error::UnsupportedFormat {
            found: payload.format_version,
            supported: FORMAT_VERSION,
        });
    }
    if let Some(TimeTransform::Anchored { anchors }) = &mut payload.time_transform {
        anchors.sort_by(|a, b| a.gp_ms.total_cmp(&b.gp_ms));
    }
    Ok(payload)
}

/// Load a payload from a JSON file.
pub fn load(path: &Path) -> Result<ChordEnhancementPayload> {
    let json = fs_err::read_to_string(path).map_err(|e| Error::io(e, Some(path.to_path_buf())))?;
    from_json(&json)
}

/// Write a payload to a JSON file.
pub fn save(payload: &ChordEnhancementPayload, path: &Path) -> Result<()> {
    let json = to_json_pretty(payload)?;
    fs_err::write(path, json).map_err(|e| Error::io(e, Some(path.to_path_buf())))?;
    tracing::debug!("Wrote chord payload with {} lines to {}", payload.lines.len(), path.display());
    Ok(())
}

/// Whether the payload was produced by an older alignment algorithm.
pub const fn is_stale(payload: &ChordEnhancementPayload) -> bool {
    payload.algo_version < ALGO_VERSION
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::align::transform::apply_time_transform;
    use crate::types::{Anchor, EnhancedChordLine, LineChord};

    fn sample() -> ChordEnhancementPayload {
        let mut payload = ChordEnhancementPayload::new(vec![EnhancedChordLine {
            idx: 3,
            chords: vec![LineChord { start: 250, dur: Some(1_000), chord: "Am".into(), word_idx: Some(1) }],
        }]);
        payload.time_transform = Some(TimeTransform::Offset { ms: -1_200.0 });
        payload
    }

    #[test]
    fn uses_camel_case_field_names() {
        let json = to_json(&sample()).unwrap();
        assert!(json.contains(r#""formatVersion":1"#));
        assert!(json.contains(r#""algoVersion":"#));
        assert!(json.contains(r#""timeTransform":{"kind":"offset""#));
        assert!(json.contains(r#""wordIdx":1"#));
        assert!(!json.contains("track"));
    }

    #[test]
    fn reads_back_what_it_writes() {
        let payload = sample();
        let parsed = from_json(&to_json(&payload).unwrap()).unwrap();
        assert_eq!(parsed, payload);
        assert!(!is_stale(&parsed));
    }

    #[test]
    fn rejects_newer_format() {
        let json = r#"{"formatVersion":99,"algoVersion":1,"lines":[]}"#;
        match from_json(json) {
            Err(Error::UnsupportedFormat { found, supported }) => {
                assert_eq!(found, 99);
                assert_eq!(supported, FORMAT_VERSION);
            }
            other => panic!("Expected unsupported format, got {other:?}"),
        }
    }

    #[test]
    fn older_algorithm_is_stale() {
        let json = r#"{"formatVersion":1,"algoVersion":1,"lines":[{"idx":0,"chords":[{"start":0,"chord":"C"}]}]}"#;
        let payload = from_json(json).unwrap();
        assert!(is_stale(&payload));
        assert_eq!(payload.lines[0].chords[0].dur, None);
    }

    #[test]
    fn anchors_are_ordered_on_load() {
        let json = r#"{"formatVersion":1,"algoVersion":3,"lines":[],
            "timeTransform":{"kind":"anchored","anchors":[
                {"gpMs":20000.0,"lrcMs":18000.0},
                {"gpMs":10000.0,"lrcMs":9000.0}]}}"#;
        let payload = from_json(json).unwrap();
        let transform = payload.time_transform.unwrap();
        match &transform {
            TimeTransform::Anchored { anchors } => {
                assert_eq!(anchors[0], Anchor::new(10_000.0, 9_000.0));
            }
            other => panic!("Expected anchored transform, got {other:?}"),
        }
        assert!((apply_time_transform(15_000.0, &transform) - 13_500.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_json_is_a_payload_error() {
        assert!(matches!(from_json("{not json"), Err(Error::Payload(_))));
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chords.json");
        save(&sample(), &path).unwrap();
        assert_eq!(load(&path).unwrap(), sample());
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = load(Path::new("/nonexistent/chords.json")).unwrap_err();
        assert!(matches!(err, Error::Io { path: Some(_), .. }));
    }
}
