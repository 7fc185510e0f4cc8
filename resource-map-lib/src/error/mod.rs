use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceMapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Processing error: {0}")]
    Processing(String),
}

/// Which step of a load produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Ingest,
    Parse,
    Geocode,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStage::Ingest => f.write_str("ingest"),
            LoadStage::Parse => f.write_str("parse"),
            LoadStage::Geocode => f.write_str("geocode"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingMessage {
    pub stage: LoadStage,
    /// Record id (CSV line index) the message is about, if any.
    pub record_id: Option<usize>,
    pub message: String,
}

impl fmt::Display for ProcessingMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record_id {
            Some(id) => write!(f, "[{}] row {}: {}", self.stage, id, self.message),
            None => write!(f, "[{}] {}", self.stage, self.message),
        }
    }
}

/// Issues collected while loading. Nothing here aborts a load: rows are
/// skipped, markers are dropped, sample data stands in for a missing CSV.
#[derive(Debug, Default, Clone)]
pub struct ProcessingState {
    warnings: Vec<ProcessingMessage>,
}

impl ProcessingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, stage: LoadStage, message: impl Into<String>) {
        self.push(stage, None, message.into());
    }

    pub fn add_row_warning(&mut self, stage: LoadStage, record_id: usize, message: impl Into<String>) {
        self.push(stage, Some(record_id), message.into());
    }

    fn push(&mut self, stage: LoadStage, record_id: Option<usize>, message: String) {
        self.warnings.push(ProcessingMessage {
            stage,
            record_id,
            message,
        });
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn get_warnings(&self) -> &[ProcessingMessage] {
        &self.warnings
    }

    pub fn warnings_from(&self, stage: LoadStage) -> impl Iterator<Item = &ProcessingMessage> + '_ {
        self.warnings.iter().filter(move |w| w.stage == stage)
    }

    /// Record ids mentioned by warnings of `stage`, in order.
    pub fn affected_records(&self, stage: LoadStage) -> Vec<usize> {
        self.warnings_from(stage).filter_map(|w| w.record_id).collect()
    }
}

#[derive(Debug)]
pub enum ProcessingOutcome {
    Success,
    SuccessWithWarnings(Vec<ProcessingMessage>),
}

impl ProcessingOutcome {
    pub fn from_state(state: ProcessingState) -> Self {
        if state.warnings.is_empty() {
            ProcessingOutcome::Success
        } else {
            ProcessingOutcome::SuccessWithWarnings(state.warnings)
        }
    }

    pub fn warnings(&self) -> &[ProcessingMessage] {
        match self {
            ProcessingOutcome::Success => &[],
            ProcessingOutcome::SuccessWithWarnings(warnings) => warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_are_grouped_by_stage() {
        let mut state = ProcessingState::new();
        state.add_row_warning(LoadStage::Parse, 3, "has only 2 fields");
        state.add_warning(LoadStage::Ingest, "using sample data");
        state.add_row_warning(LoadStage::Geocode, 5, "ZERO_RESULTS");

        assert_eq!(state.affected_records(LoadStage::Parse), vec![3]);
        assert_eq!(state.warnings_from(LoadStage::Ingest).count(), 1);
        assert_eq!(state.get_warnings()[0].to_string(), "[parse] row 3: has only 2 fields");
        assert_eq!(state.get_warnings()[1].to_string(), "[ingest] using sample data");

        let outcome = ProcessingOutcome::from_state(state);
        assert_eq!(outcome.warnings().len(), 3);
        assert!(ProcessingOutcome::from_state(ProcessingState::new())
            .warnings()
            .is_empty());
    }
}
