//! Import session - the four-step state machine sequencing the pipeline
//!
//! upload -> mapping -> review -> success. There is no error state: a failed
//! operation returns the error and leaves the session exactly where it was,
//! so every failure is retryable in place.

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{ColumnMapping, NormalizedRow, StatementTable};
use crate::ports::{StatementExtractor, TemplateCache, TransactionStore};
use crate::services::committer;
use crate::services::dedup::DuplicateIndex;
use crate::services::format::{self, SourceFile};
use crate::services::mapping::MappingEngine;
use crate::services::normalize;

/// The user-visible step of the import flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    Upload,
    Mapping,
    Review,
    Success,
}

impl ImportStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Mapping => "mapping",
            Self::Review => "review",
            Self::Success => "success",
        }
    }
}

/// Session state as a tagged union: each step carries only the data that can
/// exist at that step, so impossible combinations (normalized rows while
/// still uploading, say) are unrepresentable.
enum SessionState {
    Upload,
    Mapping {
        table: StatementTable,
        mapping: ColumnMapping,
    },
    Review {
        table: StatementTable,
        mapping: ColumnMapping,
        rows: Vec<NormalizedRow>,
        skip_duplicates: bool,
    },
    Success {
        committed: usize,
    },
}

/// Aggregate root for one statement import.
///
/// Exclusively owned by the flow that created it and never persisted. The
/// duplicate window is snapshotted once when the session opens and is not
/// refreshed mid-session.
pub struct ImportSession {
    state: SessionState,
    duplicates: DuplicateIndex,
    engine: MappingEngine,
    store: Arc<dyn TransactionStore>,
    extractor: Option<Arc<dyn StatementExtractor>>,
    user_id: String,
}

impl ImportSession {
    /// Open a session for the user, snapshotting the duplicate window.
    ///
    /// `extractor` may be absent; document uploads then fail with
    /// `RemoteExtraction` while tabular imports work normally.
    pub fn open(
        store: Arc<dyn TransactionStore>,
        templates: Arc<dyn TemplateCache>,
        extractor: Option<Arc<dyn StatementExtractor>>,
        user_id: impl Into<String>,
    ) -> Result<Self> {
        let user_id = user_id.into();
        let duplicates = DuplicateIndex::fetch(store.as_ref(), &user_id)?;
        Ok(Self {
            state: SessionState::Upload,
            duplicates,
            engine: MappingEngine::new(templates),
            store,
            extractor,
            user_id,
        })
    }

    pub fn step(&self) -> ImportStep {
        match self.state {
            SessionState::Upload => ImportStep::Upload,
            SessionState::Mapping { .. } => ImportStep::Mapping,
            SessionState::Review { .. } => ImportStep::Review,
            SessionState::Success { .. } => ImportStep::Success,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Route the selected file. On success the session advances to the
    /// mapping step with a suggested mapping: the extraction pre-fill for
    /// documents, otherwise a saved template or the heuristic guess. On
    /// failure the session stays on upload.
    pub fn select_file(&mut self, file: &SourceFile) -> Result<()> {
        if !matches!(self.state, SessionState::Upload) {
            return Err(Error::state("a file is already loaded; reset first"));
        }

        let routed = format::route(file, self.extractor.as_deref())?;
        let mapping = match routed.premapped {
            Some(premapped) => premapped,
            None => self.engine.suggest(routed.table.headers()),
        };

        self.state = SessionState::Mapping {
            table: routed.table,
            mapping,
        };
        Ok(())
    }

    /// Replace the working mapping (user adjustments on the mapping step)
    pub fn set_mapping(&mut self, new_mapping: ColumnMapping) -> Result<()> {
        match &mut self.state {
            SessionState::Mapping { mapping, .. } => {
                *mapping = new_mapping;
                Ok(())
            }
            _ => Err(Error::state("mapping can only be edited on the mapping step")),
        }
    }

    /// Validate and persist the mapping, then normalize every row and flag
    /// duplicates; advances to review. An incomplete mapping blocks the step
    /// and the session stays on mapping.
    pub fn confirm_mapping(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, SessionState::Upload) {
            SessionState::Mapping { table, mapping } => {
                if let Err(e) = self.engine.confirm(table.headers(), &mapping) {
                    self.state = SessionState::Mapping { table, mapping };
                    return Err(e);
                }

                let mut rows = normalize::normalize_table(&table, &mapping);
                self.duplicates.flag(&mut rows);

                self.state = SessionState::Review {
                    table,
                    mapping,
                    rows,
                    skip_duplicates: false,
                };
                Ok(())
            }
            other => {
                self.state = other;
                Err(Error::state("no mapping to confirm"))
            }
        }
    }

    /// Toggle whether flagged duplicates are excluded from the commit.
    /// Flags themselves are unaffected and stay visible.
    pub fn set_skip_duplicates(&mut self, skip: bool) -> Result<()> {
        match &mut self.state {
            SessionState::Review {
                skip_duplicates, ..
            } => {
                *skip_duplicates = skip;
                Ok(())
            }
            _ => Err(Error::state("not on the review step")),
        }
    }

    /// Go back from review to mapping, discarding the normalized rows but
    /// keeping the parsed table and the working mapping
    pub fn back_to_mapping(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, SessionState::Upload) {
            SessionState::Review { table, mapping, .. } => {
                self.state = SessionState::Mapping { table, mapping };
                Ok(())
            }
            other => {
                self.state = other;
                Err(Error::state("not on the review step"))
            }
        }
    }

    /// Commit the accepted subset atomically.
    ///
    /// Success advances to the terminal step and returns the committed
    /// count. Any failure - empty subset or a rejected batch - leaves the
    /// session on review with all rows intact for a retry.
    pub fn commit(&mut self) -> Result<usize> {
        let (rows, skip) = match &self.state {
            SessionState::Review {
                rows,
                skip_duplicates,
                ..
            } => (rows.as_slice(), *skip_duplicates),
            _ => return Err(Error::state("nothing staged for commit")),
        };

        let committed = committer::commit(self.store.as_ref(), &self.user_id, rows, skip)?;
        self.state = SessionState::Success { committed };
        Ok(committed)
    }

    /// Cancel/close: full reset to the upload step from anywhere
    pub fn reset(&mut self) {
        self.state = SessionState::Upload;
    }

    // === Read accessors for the front end ===

    /// Headers of the parsed table (mapping and review steps)
    pub fn headers(&self) -> Option<&[String]> {
        match &self.state {
            SessionState::Mapping { table, .. } | SessionState::Review { table, .. } => {
                Some(table.headers())
            }
            _ => None,
        }
    }

    /// The working column mapping (mapping and review steps)
    pub fn mapping(&self) -> Option<&ColumnMapping> {
        match &self.state {
            SessionState::Mapping { mapping, .. } | SessionState::Review { mapping, .. } => {
                Some(mapping)
            }
            _ => None,
        }
    }

    /// Normalized rows under review
    pub fn rows(&self) -> Option<&[NormalizedRow]> {
        match &self.state {
            SessionState::Review { rows, .. } => Some(rows),
            _ => None,
        }
    }

    pub fn skip_duplicates(&self) -> bool {
        matches!(
            self.state,
            SessionState::Review {
                skip_duplicates: true,
                ..
            }
        )
    }

    /// Count written by a successful commit (terminal step only)
    pub fn committed(&self) -> Option<usize> {
        match self.state {
            SessionState::Success { committed } => Some(committed),
            _ => None,
        }
    }

    /// Size of the duplicate window snapshotted at open
    pub fn duplicate_window_len(&self) -> usize {
        self.duplicates.len()
    }
}
