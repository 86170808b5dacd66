use std::fmt::Write;
use types::SolveResult;

/// Plain-text report, one fact per line.
pub fn render(result: &SolveResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "status={}", result.status);
    for a in &result.assignments {
        let _ = writeln!(
            out,
            "flight={} aircraft={} start={} end={}",
            a.flight_id, a.aircraft_id, a.start, a.end
        );
    }
    for m in &result.maintenance {
        let slots: Vec<String> = m.slots.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "maintenance aircraft={} slots=[{}]", m.aircraft_id, slots.join(","));
    }
    let _ = writeln!(out, "objective={}", result.objective);
    for w in &result.warnings {
        let _ = writeln!(out, "warning {} {}", w.r#type, w.details);
    }
    if let Some(err) = result.stats.get("error").and_then(|e| e.as_str()) {
        let _ = writeln!(out, "error={err}");
    }
    out
}
