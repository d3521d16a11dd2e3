//! Presentation boundary. The aggregator only produces a [RefreshOutcome], a
//! [StatusPresenter] decides how it looks.

pub mod console;
pub mod format;

use crate::aggregator::RefreshOutcome;

/// Detail shown whenever no total could be computed.
pub const CONNECTION_ERROR_MESSAGE: &str = "Error: ActivityWatch not running?";

/// Receives the result of every refresh. Exactly one of the methods is called per refresh.
pub trait StatusPresenter: Send + Sync + 'static {
    fn on_activity_time(&self, seconds: f64, increased: bool);

    fn on_connection_error(&self, message: &str);

    fn present(&self, outcome: &RefreshOutcome) {
        match outcome {
            RefreshOutcome::ActivityTime { seconds, increased } => {
                self.on_activity_time(*seconds, *increased)
            }
            RefreshOutcome::ConnectionError(_) => self.on_connection_error(CONNECTION_ERROR_MESSAGE),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::StatusPresenter;

    #[derive(Debug, Clone, PartialEq)]
    pub enum PresentedStatus {
        ActivityTime { seconds: f64, increased: bool },
        ConnectionError(String),
    }

    /// Keeps every callback it receives.
    #[derive(Default)]
    pub struct RecordingPresenter {
        pub events: Mutex<Vec<PresentedStatus>>,
    }

    impl RecordingPresenter {
        pub fn events(&self) -> Vec<PresentedStatus> {
            self.events.lock().unwrap().clone()
        }
    }

    impl StatusPresenter for RecordingPresenter {
        fn on_activity_time(&self, seconds: f64, increased: bool) {
            self.events
                .lock()
                .unwrap()
                .push(PresentedStatus::ActivityTime { seconds, increased });
        }

        fn on_connection_error(&self, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push(PresentedStatus::ConnectionError(message.to_string()));
        }
    }
}
