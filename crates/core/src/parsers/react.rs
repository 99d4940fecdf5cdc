use thiserror::Error;

use crate::model::TraceFile;

#[derive(Debug, Error)]
pub enum TraceParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("profiler export must be a JSON object")]
    NotAnObject,
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("`dataForRoots` must be an array")]
    RootsNotArray,
}

const REQUIRED_FIELDS: [&str; 2] = ["version", "dataForRoots"];

/// Parse a React DevTools profiler export.
///
/// The top level must be an object carrying `version` and an array
/// `dataForRoots`. Everything below that is tolerated when absent:
/// snapshots, fiber duration lists and commit timing fields.
pub fn parse_trace_file(data: &[u8]) -> Result<TraceFile, TraceParseError> {
    let value: serde_json::Value = serde_json::from_slice(data)?;
    let obj = value.as_object().ok_or(TraceParseError::NotAnObject)?;

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|key| !obj.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(TraceParseError::MissingFields(missing));
    }
    if !obj["dataForRoots"].is_array() {
        return Err(TraceParseError::RootsNotArray);
    }

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_export() {
        let json = r#"{
            "version": 5,
            "dataForRoots": [{
                "displayName": "App",
                "rootID": 1,
                "snapshots": [
                    [1, {"id": 1, "children": [2], "displayName": "App"}],
                    [2, {"id": 2, "children": [], "displayName": "Counter"}]
                ],
                "commitData": [{
                    "fiberActualDurations": [[1, 10.0], [2, 5.0]],
                    "fiberSelfDurations": [[1, 5.0], [2, 5.0]],
                    "timestamp": 100.0,
                    "duration": 10.0,
                    "effectDuration": 1.5,
                    "passiveEffectDuration": null,
                    "priorityLevel": "Normal",
                    "changeDescriptions": null,
                    "updaters": []
                }]
            }]
        }"#;

        let trace = parse_trace_file(json.as_bytes()).unwrap();
        assert_eq!(trace.version, 5);
        assert_eq!(trace.roots.len(), 1);

        let root = &trace.roots[0];
        assert_eq!(root.snapshot.len(), 2);
        let commit = &root.commits[0];
        assert_eq!(commit.duration_ms(), 10.0);
        assert_eq!(commit.effect_duration_ms(), 1.5);
        assert_eq!(commit.passive_effect_duration_ms(), 0.0);
        assert_eq!(commit.actual_durations, vec![(1, 10.0), (2, 5.0)]);
    }

    #[test]
    fn early_format_without_snapshots_or_fibers() {
        let json = r#"{
            "version": 1,
            "dataForRoots": [{"commitData": [{"duration": 3.0}, {"duration": 4.0}]}]
        }"#;
        let trace = parse_trace_file(json.as_bytes()).unwrap();
        let root = &trace.roots[0];
        assert!(root.snapshot.is_empty());
        assert_eq!(root.commits.len(), 2);
        assert!(root.commits[1].actual_durations.is_empty());
    }

    #[test]
    fn empty_export() {
        let json = r#"{"version": 5, "dataForRoots": []}"#;
        let trace = parse_trace_file(json.as_bytes()).unwrap();
        assert!(trace.roots.is_empty());
    }

    #[test]
    fn rejects_missing_top_level_fields() {
        let err = parse_trace_file(br#"{"dataForRoots": []}"#).unwrap_err();
        assert!(matches!(err, TraceParseError::MissingFields(ref f) if f == &["version"]));

        let err = parse_trace_file(br#"{}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required field(s): version, dataForRoots"
        );
    }

    #[test]
    fn version_of_any_type_is_accepted() {
        let trace = parse_trace_file(br#"{"version": "5", "dataForRoots": []}"#).unwrap();
        assert_eq!(trace.version, "5");

        let trace = parse_trace_file(br#"{"version": null, "dataForRoots": []}"#).unwrap();
        assert!(trace.version.is_null());

        let trace = parse_trace_file(br#"{"version": 1.2, "dataForRoots": []}"#).unwrap();
        assert_eq!(trace.version, 1.2);
    }

    #[test]
    fn rejects_non_object_and_bad_roots() {
        assert!(matches!(
            parse_trace_file(b"[1, 2]"),
            Err(TraceParseError::NotAnObject)
        ));
        assert!(matches!(
            parse_trace_file(br#"{"version": 5, "dataForRoots": {}}"#),
            Err(TraceParseError::RootsNotArray)
        ));
        assert!(matches!(
            parse_trace_file(b"not json"),
            Err(TraceParseError::Json(_))
        ));
    }
}
