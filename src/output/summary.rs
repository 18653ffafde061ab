use crate::scan::HostReport;

/// Human readable block for one host.
pub fn format_report(report: &HostReport) -> String {
    let mut lines = Vec::new();
    lines.push(format!("[>] {}", report.host));
    if report.detected.is_empty() {
        lines.push("    technologies: none detected".to_string());
    } else {
        lines.push(format!("    technologies: {}", report.detected.join(", ")));
    }
    for v in &report.endpoints {
        let tag = if v.valid { "[+]" } else { "[-]" };
        lines.push(format!("    {} {}", tag, v.endpoint));
    }
    lines.join("\n")
}
