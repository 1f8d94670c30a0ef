//! JSON output formatting.

use crate::report::Report;

/// Format the report as JSON.
///
/// If `compact` is true, outputs minified JSON without whitespace.
pub fn format_json(report: &Report, compact: bool) -> String {
    if compact {
        serde_json::to_string(report).expect("serialization cannot fail")
    } else {
        serde_json::to_string_pretty(report).expect("serialization cannot fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::build_report;
    use std::sync::Arc;
    use tablescope_core::{CatalogSnapshot, StaticCatalog};

    fn report() -> Report {
        let catalog = StaticCatalog::new()
            .with_default_schema("dbo")
            .with_table(Some("dbo"), "Users");
        let snapshot = CatalogSnapshot::load(Arc::new(catalog), None).unwrap();
        build_report(&snapshot, &["user".to_string()], false, None)
    }

    #[test]
    fn test_json_pretty() {
        let json = format_json(&report(), false);
        assert!(json.contains('\n'));
        assert!(json.contains("resolutions"));
    }

    #[test]
    fn test_json_compact() {
        let json = format_json(&report(), true);
        assert!(!json.starts_with("{\n"));
        assert!(json.contains("\"name\":\"Users\""));
    }
}
