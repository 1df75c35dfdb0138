//! Format exploration reports for human consumption.

use crate::explorer::ExplorationReport;

/// Format an exploration report for human consumption.
pub fn format_report(report: &ExplorationReport) -> String {
    let mut output = String::new();

    output.push_str("═══════════════════════════════════════════════════════════════════════\n");
    output.push_str("  Trace Drill Report\n");
    output.push_str("═══════════════════════════════════════════════════════════════════════\n\n");

    // Summary
    output.push_str(&format!(
        "Steps taken:            {} / {} trace blocks\n",
        report.steps, report.trace_len
    ));
    let stop_reason = if report.budget_exhausted {
        "step budget exhausted"
    } else if report.active_remaining == 0 {
        "no active states"
    } else {
        "trace consumed"
    };
    output.push_str(&format!("Stopped because:        {}\n", stop_reason));
    output.push_str(&format!("Active states left:     {}\n", report.active_remaining));
    output.push_str(&format!("Diverted states:        {}\n", report.diverted));
    output.push_str(&format!(
        "Known transitions:      {}\n",
        report.known_transitions
    ));
    output.push('\n');

    // Outcome breakdown
    let o = &report.outcomes;
    output.push_str("─── Missed State Outcomes ─────────────────────────────────────────────\n");
    output.push_str(&format!("Missed states:          {}\n", o.missed));
    output.push_str(&format!("Diverted:               {}\n", o.diverted));
    if o.covered > 0 {
        output.push_str(&format!("Covered by fuzzer:      {}\n", o.covered));
    }
    if o.known > 0 {
        output.push_str(&format!("Already known:          {}\n", o.known));
    }
    if o.trivially_false > 0 {
        output.push_str(&format!("Trivially false:        {}\n", o.trivially_false));
    }
    if o.unsatisfiable > 0 {
        output.push_str(&format!("Unsatisfiable:          {}\n", o.unsatisfiable));
    }
    if o.no_predecessor > 0 {
        output.push_str(&format!("No predecessor:         {}\n", o.no_predecessor));
    }
    output.push('\n');

    if o.missed > 0 && o.diverted == 0 && o.covered == o.missed {
        output.push_str("Every missed transition was already covered by the fuzzer bitmap.\n");
        output.push_str("If no bitmap was supplied, novelty detection was inert.\n");
    }

    output
}
