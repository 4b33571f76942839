use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result};
use bizdash_core::import::load_csv;
use bizdash_core::{BizdashConfig, Client, EntityKind, ImportCancel, Importer};
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::utils::tui::{create_progress_bar, update_progress};

pub async fn run(config: &BizdashConfig, kind: EntityKind, file: &Path, yes: bool) -> Result<()> {
    if config.token.is_none() {
        anyhow::bail!(
            "Not authenticated.\n\n\
            Save your dashboard token with:\n  \
            bizdash config --set-token <token>\n\n\
            or set BIZDASH_TOKEN."
        );
    }

    let parsed = load_csv(file, kind)
        .await
        .with_context(|| format!("Could not load {}", file.display()))?;
    let total = parsed.rows.len();

    if !yes && std::io::stdin().is_terminal() {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Import {} {} into {}?",
                total,
                kind.noun(total),
                config.api_url
            ))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Import aborted".dimmed());
            return Ok(());
        }
    }

    let cancel = ImportCancel::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let client = Client::from_config(config)?;
    let importer = Importer::new(client, kind).with_cancel(cancel);

    let bar = create_progress_bar(total, format!("Importing {}", kind));
    let summary = importer
        .import_parsed(&parsed, |progress| update_progress(&bar, progress))
        .await;
    bar.finish_and_clear();
    ctrl_c.abort();

    println!("{}", summary.render());

    if summary.is_total_failure() && !summary.cancelled {
        anyhow::bail!("No {} were imported", kind.noun(0));
    }

    Ok(())
}
