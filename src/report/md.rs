use crate::types::report::AnalysisReport;

pub fn to_markdown(report: &AnalysisReport) -> String {
    let mut output = String::new();
    output.push_str("# DeepSignal Report\n\n");
    output.push_str(&format!("Candidate: {}\n\n", report.candidate_id));
    output.push_str(&format!(
        "Credit score: {:.2} / 100 ({})\n\n",
        report.credit_score, report.risk_level
    ));

    output.push_str("## Key Findings\n\n");
    for finding in &report.key_findings {
        output.push_str(&format!("- {finding}\n"));
    }
    output.push('\n');

    output.push_str("## Risk Factors\n\n");
    if report.risk_factors.is_empty() {
        output.push_str("- none\n\n");
    } else {
        for risk in &report.risk_factors {
            output.push_str(&format!(
                "- [{}] {} ({:+.1}): {}\n",
                risk.severity,
                risk.category.as_str(),
                risk.score_impact,
                risk.description
            ));
        }
        output.push('\n');
    }

    output.push_str("## Agents\n\n");
    for agent in report.agent_reports.values() {
        output.push_str(&format!(
            "- {}: score {:.2}, confidence {:.2}\n",
            agent.agent_name, agent.score, agent.confidence
        ));
    }
    output.push('\n');

    output.push_str("## Score Trace\n\n");
    output.push_str("| metric | raw | weight | weighted | evidence |\n");
    output.push_str("|---|---|---|---|---|\n");
    for row in &report.trace {
        output.push_str(&format!(
            "| {} | {:.2} | {:.2} | {:.2} | {} |\n",
            row.metric, row.raw_score, row.weight, row.weighted, row.evidence
        ));
    }
    output.push('\n');

    output.push_str("## Recommendations\n\n");
    for recommendation in &report.recommendations {
        output.push_str(&format!("- {recommendation}\n"));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_report;

    #[test]
    fn markdown_report_contains_sections() {
        let rendered = to_markdown(&sample_report());
        assert!(rendered.contains("# DeepSignal Report"));
        assert!(rendered.contains("Credit score: 38.25 / 100 (CRITICAL)"));
        assert!(rendered.contains("## Key Findings"));
        assert!(rendered.contains("- [HIGH] green_washing (-25.0)"));
        assert!(rendered.contains("| risk_penalty | 25.00 | 1.00 | -25.00 |"));
        assert!(rendered.contains("## Recommendations"));
    }
}
