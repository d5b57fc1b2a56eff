use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{CountyReport, TrendBasis};
use crate::scoring::HistoryWindow;

/// Render a markdown risk report for one county run. `history` holds the
/// stored trailing CAI values for the county.
pub fn build_report(
    report: &CountyReport,
    history: &HistoryWindow,
    generated_on: NaiveDate,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Daymark County Risk Report");
    let _ = writeln!(
        output,
        "Generated for {} County, {} on {}",
        report.county, report.region, generated_on
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Headline");
    let _ = writeln!(
        output,
        "- CAI {:.2} (state: {})",
        report.cai, report.state
    );
    let _ = writeln!(output, "- AV {:.2}", report.av);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Sub-scores");
    let _ = writeln!(output, "- heat {:.1}", report.heat);
    let _ = writeln!(output, "- rain {:.1}", report.rain);
    let _ = writeln!(output, "- wind {:.1}", report.wind);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Composites");
    let _ = writeln!(output, "- WPS {:.2}", report.wps);
    let _ = writeln!(output, "- ISS {:.2}", report.iss);
    let _ = writeln!(output, "- DAS {:.2}", report.das);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Trend Signals");
    let _ = writeln!(output, "- STS {:.1}", report.sts);
    let _ = writeln!(output, "- VEX {:.1}", report.vex);
    let _ = writeln!(output, "- FPC {:.1}", report.fpc);

    if report.trend_basis == TrendBasis::Insufficient {
        let _ = writeln!(
            output,
            "- note: trailing history too shallow, neutral trend scores substituted"
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Trailing CAI");

    if history.values().is_empty() {
        let _ = writeln!(output, "No stored history for this county.");
    } else {
        let values: Vec<String> = history
            .values()
            .iter()
            .map(|cai| format!("{cai:.1}"))
            .collect();
        let _ = writeln!(output, "{}", values.join(", "));
    }

    output
}
