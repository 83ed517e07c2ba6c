//! Notification sink that writes through `tracing`.

use tracing::{error, info, warn};

use crate::traits::{Notification, NotificationLevel, NotificationSink};

/// Forwards notifications to the log at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => info!(target: "chatflow::notify", "{}", notification.message),
            NotificationLevel::Warning => {
                warn!(target: "chatflow::notify", "{}", notification.message)
            }
            NotificationLevel::Error => {
                error!(target: "chatflow::notify", "{}", notification.message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_without_subscriber_does_not_panic() {
        TracingNotifier::new().notify(Notification::error("Server Error"));
    }
}
