/// Crawl phase definitions for the orchestrator state machine
///
/// A crawl moves strictly forward: `Idle → Running → Draining → Done`.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlPhase {
    /// Created, seed not claimed yet
    #[default]
    Idle,

    /// Accepting discovered links and spawning crawl tasks
    Running,

    /// Finished deciding; no new tasks, outstanding ones are being reaped
    Draining,

    /// Terminal: the summary has been produced
    Done,
}

impl CrawlPhase {
    /// Returns true if this is the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true while discovered links are still being accepted
    pub fn accepts_links(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns the only phase this one may move to, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Running),
            Self::Running => Some(Self::Draining),
            Self::Draining => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Checks whether moving from this phase to `to` is legal
    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
