//! Text rendering of run results.

use crate::error::error_chain;
use crate::pipeline::BatchReport;
use crate::types::FrameId;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

pub fn format_frame_list(frames: &[FrameId]) -> String {
    if frames.is_empty() {
        return "Did not find any frames ready to process.".to_string();
    }
    let mut lines: Vec<String> = frames
        .iter()
        .enumerate()
        .map(|(i, id)| format!("  {}. {}", i + 1, id))
        .collect();
    lines.insert(0, format!("Frames selected ({}):", frames.len()));
    lines.join("\n")
}

pub fn format_batch_report(report: &BatchReport) -> String {
    if report.attempted == 0 {
        return "Did not find any frames ready to process.".to_string();
    }

    let mut s = format!(
        "Output generation finished:\n  Attempted: {}\n  Succeeded: {}\n  Failed: {}",
        report.attempted, report.succeeded, report.failed
    );
    if report.cleanup_warnings > 0 {
        s.push_str(&format!(
            "\n  Source cleanup warnings: {}",
            report.cleanup_warnings
        ));
    }

    if !report.failures.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Frame", "Kind", "Error"]);
        for failure in &report.failures {
            table.add_row(vec![
                failure.id.to_string(),
                failure.error.kind().to_string(),
                error_chain(&failure.error),
            ]);
        }
        s.push_str(&format!("\n\nFailures:\n{}", table));
    }
    s
}
