use crate::error::{PipelineError, Result};
use tracing::debug;

// Logical field names. Source datasets spell these in all sorts of ways, so every
// lookup goes through `resolve` rather than indexing headers directly.
pub const PLAYER: &str = "Player";
pub const TEAM: &str = "Tm";
pub const DATE: &str = "Date";
pub const POINTS: &str = "PTS";
pub const ASSISTS: &str = "AST";
pub const REBOUNDS: &str = "TRB";
pub const MINUTES: &str = "MP";

// Exact match ignoring case first, then the first header that contains the logical name.
pub fn resolve(columns: &[String], logical: &str) -> Option<usize> {
    let needle = logical.to_uppercase();

    columns
        .iter()
        .position(|c| c.to_uppercase() == needle)
        .or_else(|| columns.iter().position(|c| c.to_uppercase().contains(&needle)))
}

/// Resolves every required field of one transform up front.
///
/// Returns the column indices in the same order as `logical`. If anything is
/// unresolved the error lists all of the missing fields, not just the first.
pub fn resolve_fields<const N: usize>(
    columns: &[String],
    transform: &str,
    logical: [&str; N],
) -> Result<[usize; N]> {
    let mut resolved = [0usize; N];
    let mut missing = Vec::new();

    for (slot, name) in resolved.iter_mut().zip(logical) {
        match resolve(columns, name) {
            Some(idx) => *slot = idx,
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns {
            transform: transform.to_string(),
            fields: missing,
        });
    }

    let mapping: Vec<(&str, &str)> = logical
        .iter()
        .zip(resolved)
        .map(|(name, idx)| (*name, columns[idx].as_str()))
        .collect();
    debug!("Column mapping for {transform}: {mapping:?}");

    Ok(resolved)
}

// Candidates are tried in order; the first one with any exact (case-insensitive) header wins.
pub fn find_exact(columns: &[String], candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|cand| {
        let cand = cand.to_uppercase();
        columns.iter().position(|c| c.to_uppercase() == cand)
    })
}

pub fn find_containing(columns: &[String], candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|cand| {
        let cand = cand.to_uppercase();
        columns.iter().position(|c| c.to_uppercase().contains(&cand))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn resolve_ignores_case() {
        let cols = headers(&["Player", "PTS", "Data"]);
        assert_eq!(resolve(&cols, "pts"), Some(1));
        assert_eq!(resolve(&cols, "player"), Some(0));
    }

    #[test]
    fn exact_match_beats_earlier_substring_match() {
        let cols = headers(&["PlayerId", "player"]);
        assert_eq!(resolve(&cols, "Player"), Some(1));
    }

    #[test]
    fn falls_back_to_substring() {
        let cols = headers(&["Game Date", "Tm_abbr"]);
        assert_eq!(resolve(&cols, "Date"), Some(0));
        assert_eq!(resolve(&cols, "tm"), Some(1));
        assert_eq!(resolve(&cols, "PTS"), None);
    }

    #[test]
    fn resolve_fields_reports_every_missing_field() {
        let cols = headers(&["Player", "Date", "PTS"]);
        let err = resolve_fields(&cols, "MVP chart", ["Player", "AST", "PTS", "TRB"]).unwrap_err();

        match err {
            PipelineError::MissingColumns { transform, fields } => {
                assert_eq!(transform, "MVP chart");
                assert_eq!(fields, vec!["AST".to_string(), "TRB".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resolve_fields_keeps_requested_order() {
        let cols = headers(&["pts", "Date", "Player"]);
        let [player, date, pts] = resolve_fields(&cols, "scoring", [PLAYER, DATE, POINTS]).unwrap();
        assert_eq!((player, date, pts), (2, 1, 0));
    }

    #[test]
    fn candidate_lists_respect_candidate_order() {
        let cols = headers(&["Minutes", "MP"]);
        assert_eq!(find_exact(&cols, &["MP", "MIN", "Minutes"]), Some(1));
        assert_eq!(find_exact(&cols, &["FGA"]), None);

        let cols = headers(&["Games Started", "Role"]);
        assert_eq!(find_containing(&cols, &["Starter", "Start", "GS", "Role"]), Some(0));
    }
}
