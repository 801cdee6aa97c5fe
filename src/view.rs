use crate::record::StrikeReport;
use crate::store::ReportStore;
use log::error;

/// Outcome of a view's single fetch on display.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loaded(Vec<StrikeReport>),
    Failed(String),
}

impl ViewState {
    /// Fetches the full list once. Errors are logged and kept, never propagated.
    pub async fn load<S: ReportStore + ?Sized>(store: &S, view: &str) -> Self {
        match store.list_reports().await {
            Ok(reports) => ViewState::Loaded(reports),
            Err(e) => {
                error!("Error loading reports for {}: {}", view, e);
                ViewState::Failed(e.to_string())
            }
        }
    }

    /// Reports to render; a failed load renders as empty.
    pub fn reports(&self) -> &[StrikeReport] {
        match self {
            ViewState::Loaded(reports) => reports.as_slice(),
            ViewState::Failed(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Loaded(_) => None,
            ViewState::Failed(message) => Some(message.as_str()),
        }
    }
}
