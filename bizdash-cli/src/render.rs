//! TUI rendering traits for bizdash types.
//!
//! Extension traits that add colored terminal rendering to bizdash-core
//! types using owo_colors.

use bizdash_core::ImportSummary;
use bizdash_core::import::{RejectKind, RejectedRow};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for RejectKind {
    fn render(&self) -> String {
        match self {
            RejectKind::Validation => "invalid".yellow().to_string(),
            RejectKind::Transport => "rejected".red().to_string(),
        }
    }
}

impl Render for RejectedRow {
    fn render(&self) -> String {
        let label = self.draft.label();
        let label = if label.is_empty() {
            String::new()
        } else {
            format!(" {}", label.dimmed())
        };

        format!(
            "Row {}{} {} {}",
            self.row,
            label,
            self.kind.render(),
            self.error
        )
    }
}

/// Render the capped rejection list, with a "+N more" note when truncated.
pub fn render_rejections(rejected: &[RejectedRow], more: usize) -> String {
    let mut lines: Vec<String> = rejected
        .iter()
        .map(|r| format!("   {} {}", "-".red(), r.render()))
        .collect();

    if more > 0 {
        lines.push(format!("   {}", format!("+{} more", more).dimmed()));
    }

    lines.join("\n")
}

impl Render for ImportSummary {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        let headline = self.message();
        if self.cancelled {
            lines.push(headline.yellow().to_string());
        } else if self.is_total_failure() {
            lines.push(headline.red().to_string());
        } else if self.failed > 0 {
            lines.push(headline.yellow().to_string());
        } else {
            lines.push(headline.green().to_string());
        }

        let (shown, more) = self.displayed_rejections();
        if !shown.is_empty() {
            lines.push(String::new());
            lines.push("   Failed rows:".dimmed().to_string());
            lines.push(render_rejections(shown, more));
        }

        if let Some(count) = self.refreshed {
            lines.push(String::new());
            lines.push(
                format!("Dashboard now has {} {}", count, self.kind.noun(count))
                    .dimmed()
                    .to_string(),
            );
        }

        lines.join("\n")
    }
}
