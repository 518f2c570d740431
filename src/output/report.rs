//! Reporting how much a rebuild hid, for badges and the like.

use crate::common::validation::Issue;

/// Where this scanner runs within the page's frame hierarchy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameContext {
    /// `true` inside an iframe or other nested frame.
    pub nested: bool,
    /// Identity of the frame, when the host told us.
    pub frame_id: Option<u64>,
}

/// Sent once per settings-driven rebuild.
#[derive(Copy, Clone, Serialize, Debug, PartialEq)]
pub struct MatchReport {
    /// Elements currently hidden or collapsed.
    pub count: usize,
}

/// Fire-and-forget channel to whatever displays the count.
pub trait Messenger {
    fn send(&mut self, report: MatchReport);
}

/// Writes reports to the log.
pub struct LogMessenger;

impl FrameContext {
    pub fn top_level(frame_id: u64) -> FrameContext {
        FrameContext {
            nested: false,
            frame_id: Some(frame_id),
        }
    }

    /// Reports are only sent from a top-level frame whose identity is known.
    pub fn may_report(&self) -> bool {
        !self.nested && self.frame_id.is_some()
    }
}

impl MatchReport {
    /// The report as it goes over the wire, in RON.
    pub fn to_message(&self) -> Result<String, Issue> {
        match ron::ser::to_string(self) {
            Ok(message) => Ok(message),
            Err(error) => Err(Issue::Error(format!(
                "unable to serialize report (`{}`)",
                error
            ))),
        }
    }
}

impl Messenger for LogMessenger {
    fn send(&mut self, report: MatchReport) {
        match report.to_message() {
            Ok(message) => info!("report: {}", message),
            Err(issue) => warn!("{}", issue),
        }
    }
}
