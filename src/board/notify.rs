// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Short status messages for the user.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Receives fire-and-forget status text after user actions.
pub trait NotificationSink {
    fn notify(&mut self, message: String);
}

/// How long a message stays on screen.
pub const NOTICE_LIFETIME: Duration = Duration::from_secs(3);

/// Most recent notifications, newest last.
#[derive(Debug, Default)]
pub struct StatusFeed {
    notices: VecDeque<(Instant, String)>,
}

impl StatusFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop messages older than [`NOTICE_LIFETIME`] at `now`.
    pub fn expire(&mut self, now: Instant) {
        while let Some((at, _)) = self.notices.front() {
            if now.duration_since(*at) < NOTICE_LIFETIME {
                break;
            }
            self.notices.pop_front();
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.notices.iter().map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

impl NotificationSink for StatusFeed {
    fn notify(&mut self, message: String) {
        log::info!("{}", message);
        self.notices.push_back((Instant::now(), message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_keeps_order_and_expires() {
        let mut feed = StatusFeed::new();
        feed.notify("frame 1 captured".to_string());
        feed.notify("frame 2 captured".to_string());

        let messages: Vec<_> = feed.messages().collect();
        assert_eq!(messages, vec!["frame 1 captured", "frame 2 captured"]);

        feed.expire(Instant::now());
        assert!(!feed.is_empty());

        feed.expire(Instant::now() + NOTICE_LIFETIME + Duration::from_millis(1));
        assert!(feed.is_empty());
    }
}
