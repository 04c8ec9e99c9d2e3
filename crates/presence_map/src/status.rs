//! User-visible status of the visualization.
use std::fmt;

/// Lifecycle state shown to the user alongside the current count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Loading,
    BuildingMask,
    Ready,
    Connecting,
    Connected,
    Disconnected,
    Error(String),
    /// No live channel configured; counts come from the internal generator.
    Demo,
}

impl Status {
    /// `true` while the loading indicator should be shown.
    pub fn is_loading(&self) -> bool {
        matches!(self, Status::Loading | Status::BuildingMask)
    }

    /// `true` for states that end a live session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Disconnected | Status::Error(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Loading => f.write_str("Loading map…"),
            Status::BuildingMask => f.write_str("Building mask…"),
            Status::Ready => f.write_str("Ready"),
            Status::Connecting => f.write_str("Connecting…"),
            Status::Connected => f.write_str("Connected"),
            Status::Disconnected => f.write_str("Disconnected"),
            Status::Error(message) => write!(f, "Error: {message}"),
            Status::Demo => f.write_str("Demo mode"),
        }
    }
}
