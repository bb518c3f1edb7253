use crate::types::report::AnalysisReport;

pub fn to_json(report: &AnalysisReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;

    #[test]
    fn json_report_contains_score_and_level() {
        let rendered = to_json(&sample_report()).expect("json should serialize");
        assert!(rendered.contains("\"credit_score\": 38.25"));
        assert!(rendered.contains("\"risk_level\": \"CRITICAL\""));
        assert!(rendered.contains("\"category\": \"green_washing\""));
        assert!(rendered.contains("\"score_impact\": -25.0"));
    }
}
