use std::path::Path;

use anyhow::{Context, Result};
use bizdash_core::EntityKind;
use bizdash_core::import::{REJECTION_DISPLAY_LIMIT, load_csv, validate_rows};
use owo_colors::OwoColorize;

use crate::render::render_rejections;

/// Parse and validate a file without sending anything.
pub async fn run(kind: EntityKind, file: &Path) -> Result<()> {
    let parsed = load_csv(file, kind)
        .await
        .with_context(|| format!("Could not load {}", file.display()))?;
    let rejected = validate_rows(kind, &parsed.rows);

    println!("{} {}", "Columns:".dimmed(), parsed.headers.join(", "));

    let total = parsed.rows.len();
    let valid = total - rejected.len();
    let headline = format!(
        "{} of {} {} ready to import",
        valid,
        total,
        kind.noun(total)
    );

    if rejected.is_empty() {
        println!("{}", headline.green());
        return Ok(());
    }

    println!("{}", headline.yellow());
    println!();
    println!("{}", "   Invalid rows:".dimmed());
    let shown = rejected.len().min(REJECTION_DISPLAY_LIMIT);
    println!(
        "{}",
        render_rejections(&rejected[..shown], rejected.len() - shown)
    );

    Ok(())
}
