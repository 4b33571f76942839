//! Sequential CSV import driver.
//!
//! Rows are mapped, validated and submitted strictly in document order with
//! one request in flight at a time. A row's failure is recorded in the
//! ledger and never stops the batch; only an unusable file aborts the import.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::ClientError;
use crate::csv::{ImportRow, ParsedCsv, parse_document};
use crate::entity::{EntityDraft, EntityKind};
use crate::error::{BizdashError, BizdashResult};

/// Number of rejected rows shown before collapsing into a "+N more" note.
pub const REJECTION_DISPLAY_LIMIT: usize = 10;

/// Header is line 1, so the first data row is row 2.
const FIRST_DATA_ROW: usize = 2;

/// Where validated drafts are sent.
pub trait EntityStore {
    /// Create one entity. The server-assigned identifier is not retained.
    fn create(&self, draft: &EntityDraft) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Reload the collection after a successful import, returning its size.
    fn refresh(&self, kind: EntityKind) -> impl Future<Output = Result<usize, ClientError>> + Send;
}

/// Running counters, reported after every row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportProgress {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

impl ImportProgress {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectKind {
    Validation,
    Transport,
}

/// A row that was not created.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub row: usize,
    pub error: String,
    pub kind: RejectKind,
    pub draft: EntityDraft,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Accepted { row: usize },
    Rejected(RejectedRow),
}

/// Aggregate result of one import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub kind: EntityKind,
    /// Rows that survived the blank-row filter.
    pub total: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Rejected rows in document order.
    pub rejected: Vec<RejectedRow>,
    pub cancelled: bool,
    /// Collection size after the post-import refresh, when one succeeded.
    pub refreshed: Option<usize>,
}

impl ImportSummary {
    fn new(kind: EntityKind, total: usize) -> Self {
        ImportSummary {
            kind,
            total,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            rejected: Vec::new(),
            cancelled: false,
            refreshed: None,
        }
    }

    fn record(&mut self, outcome: ImportOutcome) {
        self.attempted += 1;
        match outcome {
            ImportOutcome::Accepted { .. } => self.succeeded += 1,
            ImportOutcome::Rejected(rejected) => {
                self.failed += 1;
                self.rejected.push(rejected);
            }
        }
    }

    pub fn progress(&self) -> ImportProgress {
        ImportProgress {
            succeeded: self.succeeded,
            failed: self.failed,
            total: self.total,
        }
    }

    /// Nothing was created.
    pub fn is_total_failure(&self) -> bool {
        self.succeeded == 0
    }

    /// The rejections to show, and how many were left out.
    pub fn displayed_rejections(&self) -> (&[RejectedRow], usize) {
        let shown = self.rejected.len().min(REJECTION_DISPLAY_LIMIT);
        (&self.rejected[..shown], self.rejected.len() - shown)
    }

    /// One-sentence result, e.g. "Imported 3 of 4 customers (1 failed)".
    pub fn message(&self) -> String {
        if self.cancelled {
            return format!(
                "Import cancelled: {} of {} {} imported ({} failed, {} not processed)",
                self.succeeded,
                self.total,
                self.kind.noun(self.total),
                self.failed,
                self.total - self.attempted
            );
        }

        if self.is_total_failure() {
            return format!(
                "Import failed: none of {} {} could be imported",
                self.attempted,
                self.kind.noun(self.attempted)
            );
        }

        let mut msg = format!(
            "Imported {} of {} {}",
            self.succeeded,
            self.attempted,
            self.kind.noun(self.attempted)
        );
        if self.failed > 0 {
            msg.push_str(&format!(" ({} failed)", self.failed));
        }
        msg
    }
}

/// Cooperative cancellation, checked before each row.
#[derive(Debug, Clone, Default)]
pub struct ImportCancel(Arc<AtomicBool>);

impl ImportCancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The file must be a `.csv` (any case).
pub fn check_file_name(name: &str) -> BizdashResult<()> {
    if name.to_lowercase().ends_with(".csv") {
        Ok(())
    } else {
        Err(BizdashError::InvalidFileType(name.to_string()))
    }
}

/// Check the extension, read the file and parse it for `kind`.
pub async fn load_csv(path: &Path, kind: EntityKind) -> BizdashResult<ParsedCsv> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    check_file_name(&file_name)?;

    let text = tokio::fs::read_to_string(path).await?;
    let parsed = parse_document(&text, kind)?;

    tracing::debug!(file = %path.display(), rows = parsed.rows.len(), "loaded csv");
    Ok(parsed)
}

/// Map and validate without submitting anything. Returns the rows that
/// would be rejected.
pub fn validate_rows(kind: EntityKind, rows: &[ImportRow]) -> Vec<RejectedRow> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let draft = EntityDraft::from_row(kind, row);
            draft.validate().err().map(|err| RejectedRow {
                row: index + FIRST_DATA_ROW,
                error: err.to_string(),
                kind: RejectKind::Validation,
                draft,
            })
        })
        .collect()
}

pub struct Importer<S> {
    store: S,
    kind: EntityKind,
    cancel: ImportCancel,
}

impl<S: EntityStore> Importer<S> {
    pub fn new(store: S, kind: EntityKind) -> Self {
        Importer {
            store,
            kind,
            cancel: ImportCancel::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: ImportCancel) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read and import a CSV file from disk.
    pub async fn import_file(
        &self,
        path: &Path,
        on_progress: impl FnMut(ImportProgress),
    ) -> BizdashResult<ImportSummary> {
        let parsed = load_csv(path, self.kind).await?;
        Ok(self.import_parsed(&parsed, on_progress).await)
    }

    /// Import already-loaded CSV text. `file_name` is only checked for its
    /// extension.
    pub async fn import_text(
        &self,
        file_name: &str,
        text: &str,
        on_progress: impl FnMut(ImportProgress),
    ) -> BizdashResult<ImportSummary> {
        check_file_name(file_name)?;
        let parsed = parse_document(text, self.kind)?;

        Ok(self.import_parsed(&parsed, on_progress).await)
    }

    /// Import a document already checked and parsed by [`load_csv`].
    pub async fn import_parsed(
        &self,
        parsed: &ParsedCsv,
        on_progress: impl FnMut(ImportProgress),
    ) -> ImportSummary {
        tracing::info!(
            kind = %self.kind,
            columns = parsed.headers.len(),
            rows = parsed.rows.len(),
            "starting import"
        );

        self.import_rows(&parsed.rows, on_progress).await
    }

    /// Submit already-parsed rows, one at a time.
    pub async fn import_rows(
        &self,
        rows: &[ImportRow],
        mut on_progress: impl FnMut(ImportProgress),
    ) -> ImportSummary {
        let mut summary = ImportSummary::new(self.kind, rows.len());

        for (index, row) in rows.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(processed = summary.attempted, "import cancelled");
                summary.cancelled = true;
                break;
            }

            let outcome = self.process_row(index + FIRST_DATA_ROW, row).await;
            summary.record(outcome);
            on_progress(summary.progress());
        }

        if summary.succeeded > 0 && !summary.cancelled {
            match self.store.refresh(self.kind).await {
                Ok(count) => summary.refreshed = Some(count),
                Err(e) => tracing::warn!(error = %e, kind = %self.kind, "refresh failed"),
            }
        }

        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "import finished"
        );

        summary
    }

    async fn process_row(&self, row_number: usize, row: &ImportRow) -> ImportOutcome {
        let draft = EntityDraft::from_row(self.kind, row);

        if let Err(err) = draft.validate() {
            tracing::debug!(row = row_number, error = %err, "row failed validation");
            return ImportOutcome::Rejected(RejectedRow {
                row: row_number,
                error: err.to_string(),
                kind: RejectKind::Validation,
                draft,
            });
        }

        match self.store.create(&draft).await {
            Ok(()) => {
                tracing::debug!(row = row_number, "row imported");
                ImportOutcome::Accepted { row: row_number }
            }
            Err(err) => {
                tracing::warn!(row = row_number, error = %err, "create request failed");
                ImportOutcome::Rejected(RejectedRow {
                    row: row_number,
                    error: err.to_string(),
                    kind: RejectKind::Transport,
                    draft,
                })
            }
        }
    }
}
