use serde::Serialize;

use crate::model::diff::DiffRow;
use crate::model::row::{BatchMeta, Payload, PayloadRow, TranslationRow};
use crate::model::snapshot::{Theme, WorkspaceSnapshot, DEFAULT_BATCH_INDEX, DEFAULT_BATCH_SIZE};
use crate::services::batch;
use crate::services::environment::Environment;
use crate::services::response;
use crate::services::store::KeyValueStore;

pub const STORAGE_KEY: &str = "csv-batch-diff-state";

#[derive(Debug, Clone, PartialEq)]
struct WorkspaceState {
    rows: Vec<TranslationRow>,
    batch_size: usize,
    batch_index: usize,
    payload_json: String,
    response_json: String,
    response_error: String,
    diff_rows: Vec<DiffRow>,
    theme: Theme,
}

impl WorkspaceState {
    fn new(theme: Theme) -> Self {
        WorkspaceState {
            rows: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_index: DEFAULT_BATCH_INDEX,
            payload_json: String::new(),
            response_json: String::new(),
            response_error: String::new(),
            diff_rows: Vec::new(),
            theme,
        }
    }

    fn from_snapshot(snap: WorkspaceSnapshot, fallback_theme: Theme) -> Self {
        WorkspaceState {
            rows: snap.rows,
            batch_size: snap.batch_size,
            batch_index: snap.batch_index,
            payload_json: snap.payload_json,
            response_json: snap.response_json,
            response_error: snap.response_error,
            diff_rows: snap.diff_rows,
            theme: snap.theme.unwrap_or(fallback_theme),
        }
    }

    fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            rows: self.rows.clone(),
            batch_size: self.batch_size,
            batch_index: self.batch_index,
            payload_json: self.payload_json.clone(),
            response_json: self.response_json.clone(),
            response_error: self.response_error.clone(),
            diff_rows: self.diff_rows.clone(),
            theme: Some(self.theme),
        }
    }
}

/// What the UI renders after each command.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceView {
    pub batch_size: usize,
    pub batch_index: usize,
    pub max_batch_index: usize,
    pub total_rows: usize,
    pub has_rows: bool,
    pub batch_range_label: String,
    pub current_batch: Vec<TranslationRow>,
    pub payload_json: String,
    pub response_json: String,
    pub response_error: String,
    pub diff_rows: Vec<DiffRow>,
    pub theme: Theme,
    pub is_generate_disabled: bool,
    pub is_parse_disabled: bool,
}

/// Loaded rows, batch cursor, request/response text and diff results for one
/// session.
///
/// Every mutator leaves `batch_index` inside `1..=max_batch_index()` and
/// writes the full state to `store` under [`STORAGE_KEY`] when the
/// environment is interactive. None of them return errors: failures end up
/// in `response_error` or the log.
pub struct Workspace<S: KeyValueStore> {
    env: Environment,
    store: S,
    state: WorkspaceState,
}

impl<S: KeyValueStore> Workspace<S> {
    pub fn new(store: S, env: Environment) -> Self {
        let mut ws = Workspace {
            env,
            store,
            state: WorkspaceState::new(env.system_theme()),
        };
        ws.restore();
        ws
    }

    fn restore(&mut self) {
        if !self.env.interactive {
            return;
        }

        let raw = match self.store.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                tracing::error!("Failed to read workspace state: {e}");
                return;
            }
        };

        match serde_json::from_str::<WorkspaceSnapshot>(&raw) {
            Ok(snap) => {
                self.state = WorkspaceState::from_snapshot(snap, self.env.system_theme());
                self.normalize();
                tracing::info!(
                    rows = self.state.rows.len(),
                    batch_index = self.state.batch_index,
                    "restored workspace state"
                );
            }
            Err(e) => tracing::error!("Failed to restore workspace state: {e}"),
        }
    }

    // Snapshots written by hand or by older builds can carry a cursor that
    // no longer fits the rows.
    fn normalize(&mut self) {
        self.state.batch_size = self.state.batch_size.max(1);
        if self.state.rows.is_empty() {
            self.state.batch_index = DEFAULT_BATCH_INDEX;
        } else {
            self.state.batch_index = self.state.batch_index.clamp(1, self.max_batch_index());
        }
    }

    fn persist(&mut self) {
        if !self.env.interactive {
            return;
        }

        let json = match serde_json::to_string(&self.state.snapshot()) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!("Failed to serialize workspace state: {e}");
                return;
            }
        };

        if let Err(e) = self.store.set(STORAGE_KEY, json) {
            tracing::error!("Failed to persist workspace state: {e}");
        }
    }

    // ---- mutators ----

    pub fn load_rows(&mut self, rows: Vec<TranslationRow>) {
        tracing::info!(rows = rows.len(), "rows loaded");
        self.state.rows = rows;
        self.state.batch_index = DEFAULT_BATCH_INDEX;
        self.state.payload_json.clear();
        self.state.response_json.clear();
        self.state.response_error.clear();
        self.state.diff_rows.clear();
        self.persist();
    }

    pub fn set_batch_size(&mut self, value: f64) {
        self.state.batch_size = batch::batch_size_from_input(value);
        self.state.batch_index = DEFAULT_BATCH_INDEX;
        self.persist();
    }

    pub fn set_batch_index(&mut self, value: f64) {
        self.state.batch_index = batch::batch_index_from_input(value, self.max_batch_index());
        self.persist();
    }

    pub fn previous_batch(&mut self) {
        self.state.batch_index = self
            .state
            .batch_index
            .saturating_sub(1)
            .clamp(1, self.max_batch_index());
        self.persist();
    }

    pub fn next_batch(&mut self) {
        self.state.batch_index = self
            .state
            .batch_index
            .saturating_add(1)
            .clamp(1, self.max_batch_index());
        self.persist();
    }

    pub fn generate_payload(&mut self) {
        let slice = self.current_batch();
        if slice.is_empty() {
            return;
        }

        let payload = Payload {
            meta: BatchMeta {
                batch_size: self.state.batch_size,
                batch_index: self.state.batch_index,
                total_rows: self.total_rows(),
            },
            rows: slice.iter().map(PayloadRow::from).collect(),
        };

        match serde_json::to_string_pretty(&payload) {
            Ok(json) => {
                tracing::debug!(rows = payload.rows.len(), "payload generated");
                self.state.payload_json = json;
                self.persist();
            }
            Err(e) => tracing::error!("Failed to serialize payload: {e}"),
        }
    }

    pub fn set_response_text(&mut self, text: impl Into<String>) {
        self.state.response_json = text.into();
        self.state.response_error.clear();
        self.persist();
    }

    pub fn parse_response(&mut self) {
        match response::parse(&self.state.response_json, &self.state.rows) {
            Ok(parsed) => {
                self.state.response_error = parsed.warning().unwrap_or_default();
                self.state.diff_rows = parsed.diff_rows;
            }
            Err(e) => {
                tracing::debug!("response rejected: {e}");
                self.state.response_error = e.to_string();
                self.state.diff_rows.clear();
            }
        }
        self.persist();
    }

    pub fn toggle_theme(&mut self) {
        self.state.theme = self.state.theme.toggled();
        self.persist();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.state.theme = theme;
        self.persist();
    }

    // ---- derived ----

    pub fn total_rows(&self) -> usize {
        self.state.rows.len()
    }

    pub fn has_rows(&self) -> bool {
        !self.state.rows.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.state.batch_size
    }

    pub fn batch_index(&self) -> usize {
        self.state.batch_index
    }

    pub fn max_batch_index(&self) -> usize {
        batch::max_batch_index(self.total_rows(), self.state.batch_size)
    }

    pub fn current_batch(&self) -> &[TranslationRow] {
        let range = batch::slice_bounds(self.total_rows(), self.state.batch_size, self.state.batch_index);
        &self.state.rows[range]
    }

    pub fn batch_range_label(&self) -> String {
        batch::range_label(
            self.total_rows(),
            self.state.batch_size,
            self.state.batch_index,
            self.current_batch().len(),
        )
    }

    pub fn payload_json(&self) -> &str {
        &self.state.payload_json
    }

    pub fn response_json(&self) -> &str {
        &self.state.response_json
    }

    pub fn response_error(&self) -> &str {
        &self.state.response_error
    }

    pub fn diff_rows(&self) -> &[DiffRow] {
        &self.state.diff_rows
    }

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn is_generate_disabled(&self) -> bool {
        self.current_batch().is_empty()
    }

    pub fn is_parse_disabled(&self) -> bool {
        self.state.response_json.trim().is_empty()
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn view(&self) -> WorkspaceView {
        WorkspaceView {
            batch_size: self.batch_size(),
            batch_index: self.batch_index(),
            max_batch_index: self.max_batch_index(),
            total_rows: self.total_rows(),
            has_rows: self.has_rows(),
            batch_range_label: self.batch_range_label(),
            current_batch: self.current_batch().to_vec(),
            payload_json: self.payload_json().to_string(),
            response_json: self.response_json().to_string(),
            response_error: self.response_error().to_string(),
            diff_rows: self.diff_rows().to_vec(),
            theme: self.theme(),
            is_generate_disabled: self.is_generate_disabled(),
            is_parse_disabled: self.is_parse_disabled(),
        }
    }
}
