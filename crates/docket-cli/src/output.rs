//! Terminal rendering of progress events and run summaries

use colored::Colorize;
use docket_domain::ProgressEventKind;
use docket_pipeline::RunReport;

/// Renders progress events and summaries for the terminal
pub struct EventPrinter {
    color_enabled: bool,
}

impl EventPrinter {
    /// Create a printer; `color_enabled` false forces plain text
    pub fn new(color_enabled: bool) -> Self {
        if !color_enabled {
            colored::control::set_override(false);
        }
        Self { color_enabled }
    }

    /// One line per event
    pub fn render(&self, kind: &ProgressEventKind) -> String {
        let label = self.label(kind);
        match kind {
            ProgressEventKind::Started { total_pages } => {
                format!("{} {} pages", label, total_pages)
            }
            ProgressEventKind::SegmentFound {
                ordinal,
                pages,
                document_type,
                ..
            } => format!(
                "{} #{} pages {} ({})",
                label, ordinal, pages, document_type
            ),
            ProgressEventKind::Chunking { ordinal, chunks } => {
                format!("{} #{} {} chunks", label, ordinal, chunks)
            }
            ProgressEventKind::FactExtracted { ordinal, fact_id } => {
                format!("{} #{} {}", label, ordinal, fact_id)
            }
            ProgressEventKind::SegmentCompleted {
                ordinal,
                facts_persisted,
                duplicates_dropped,
            } => format!(
                "{} #{} {} facts, {} duplicates dropped",
                label, ordinal, facts_persisted, duplicates_dropped
            ),
            ProgressEventKind::Completed { segments } => {
                format!("{} {} segments", label, segments)
            }
            ProgressEventKind::Cancelled => label,
            ProgressEventKind::Error { message } => format!("{} {}", label, message),
        }
    }

    /// Run summary block
    pub fn render_report(&self, report: &RunReport) -> String {
        let mut lines = vec![
            format!("production:         {}", report.production_id),
            format!("segments:           {}", report.segments),
            format!("facts persisted:    {}", report.facts_persisted),
            format!("duplicates dropped: {}", report.duplicates_dropped),
            format!("elapsed:            {:.1?}", report.elapsed),
        ];
        if report.degraded_windows > 0 {
            lines.push(format!(
                "degraded windows:   {}",
                report.degraded_windows
            ));
        }
        if report.cancelled {
            lines.push("run was cancelled; persisted data retained".to_string());
        }
        lines.join("\n")
    }

    /// Format an error for the terminal
    pub fn error(&self, message: &str) -> String {
        format!("{} {}", "error:".red().bold(), message)
    }

    fn label(&self, kind: &ProgressEventKind) -> String {
        let name = format!("{:<18}", kind.name());
        if !self.color_enabled {
            return name;
        }
        match kind {
            ProgressEventKind::Started { .. } => name.cyan().to_string(),
            ProgressEventKind::SegmentFound { .. } => name.blue().to_string(),
            ProgressEventKind::Chunking { .. } | ProgressEventKind::FactExtracted { .. } => {
                name.normal().to_string()
            }
            ProgressEventKind::SegmentCompleted { .. } => name.green().to_string(),
            ProgressEventKind::Completed { .. } => name.green().bold().to_string(),
            ProgressEventKind::Cancelled => name.yellow().to_string(),
            ProgressEventKind::Error { .. } => name.red().bold().to_string(),
        }
    }
}
