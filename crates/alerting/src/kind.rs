//! Alert taxonomy

use std::fmt;
use storage::{CATEGORY_CONSOLE, CATEGORY_SUBJECT};

/// Category an alert is retrieved under. Persisted alongside each alert;
/// the console poller and the subject pollers filter on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCategory {
    /// Surfaced on the monitoring console.
    Console,
    /// Delivered back to a traveler (confirmation or peer notification).
    Subject,
}

impl AlertCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCategory::Console => CATEGORY_CONSOLE,
            AlertCategory::Subject => CATEGORY_SUBJECT,
        }
    }
}

/// Kind label on an alert. The detector and fan-out produce the fixed
/// variants; the synthetic generator produces free-form kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertKind {
    Inactivity,
    Deviation,
    Panic,
    SelfConfirmation,
    PeerNotification,
    Synthetic(String),
}

impl AlertKind {
    pub fn as_str(&self) -> &str {
        match self {
            AlertKind::Inactivity => "inactivity",
            AlertKind::Deviation => "deviation",
            AlertKind::Panic => "panic",
            AlertKind::SelfConfirmation => "self_confirmation",
            AlertKind::PeerNotification => "peer_notification",
            AlertKind::Synthetic(kind) => kind.as_str(),
        }
    }

    pub fn parse(kind: &str) -> Self {
        match kind {
            "inactivity" => AlertKind::Inactivity,
            "deviation" => AlertKind::Deviation,
            "panic" => AlertKind::Panic,
            "self_confirmation" => AlertKind::SelfConfirmation,
            "peer_notification" => AlertKind::PeerNotification,
            other => AlertKind::Synthetic(other.to_string()),
        }
    }

    /// Retrieval category this kind lands in.
    pub fn category(&self) -> AlertCategory {
        match self {
            AlertKind::SelfConfirmation | AlertKind::PeerNotification => AlertCategory::Subject,
            _ => AlertCategory::Console,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrip() {
        for kind in ["inactivity", "deviation", "panic", "self_confirmation", "peer_notification"] {
            assert_eq!(AlertKind::parse(kind).as_str(), kind);
        }
        let synthetic = AlertKind::parse("speed_anomaly");
        assert_eq!(synthetic, AlertKind::Synthetic("speed_anomaly".to_string()));
        assert_eq!(synthetic.as_str(), "speed_anomaly");
    }

    #[test]
    fn category_split() {
        assert_eq!(AlertKind::Panic.category(), AlertCategory::Console);
        assert_eq!(AlertKind::Inactivity.category(), AlertCategory::Console);
        assert_eq!(AlertKind::Deviation.category(), AlertCategory::Console);
        assert_eq!(
            AlertKind::Synthetic("geo_fence_breach".into()).category(),
            AlertCategory::Console
        );
        assert_eq!(AlertKind::SelfConfirmation.category(), AlertCategory::Subject);
        assert_eq!(AlertKind::PeerNotification.category(), AlertCategory::Subject);
    }
}
