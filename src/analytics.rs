// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Event capture. The client is built from the config and handed to
//! whoever emits events; without a key it stays disabled and only logs at
//! debug level.
//!
//! Captured events wait in a bounded queue until [`AnalyticsClient::flush`]
//! drains them. When the queue is full the oldest event is dropped.

use crate::config::SpechackConfig;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// pending events kept before the oldest is dropped
pub const MAX_PENDING_EVENTS: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub properties: BTreeMap<String, String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsClient {
    key: Option<String>,
    pending: VecDeque<AnalyticsEvent>,
    dropped: u64,
}

impl AnalyticsClient {
    pub fn new(key: Option<String>) -> Self {
        let key = key.filter(|k| !k.trim().is_empty());
        Self {
            key,
            pending: VecDeque::new(),
            dropped: 0,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn from_config(cfg: &SpechackConfig) -> Self {
        Self::new(cfg.analytics_key.clone())
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    pub fn capture(&mut self, name: &str, properties: &[(&str, &str)]) {
        if !self.is_enabled() {
            debug!("analytics off, dropped {}", name);
            return;
        }
        let ev = AnalyticsEvent {
            name: name.to_string(),
            properties: properties
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            at: Utc::now(),
        };
        info!(
            "analytics {}",
            serde_json::to_string(&ev).unwrap_or_else(|_| name.to_string())
        );
        if self.pending.len() >= MAX_PENDING_EVENTS {
            self.pending.pop_front();
            self.dropped += 1;
            if self.dropped == 1 {
                warn!("analytics queue full, dropping oldest events");
            }
        }
        self.pending.push_back(ev);
    }

    /// events waiting for a flush, oldest first
    pub fn events(&self) -> &VecDeque<AnalyticsEvent> {
        &self.pending
    }

    /// events lost to the queue bound since the client was built
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Take every pending event, oldest first.
    pub fn flush(&mut self) -> Vec<AnalyticsEvent> {
        self.pending.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_without_key() {
        let mut a = AnalyticsClient::from_config(&SpechackConfig::default());
        assert!(!a.is_enabled());
        a.capture("x", &[]);
        assert!(a.events().is_empty());
        assert!(!AnalyticsClient::new(Some("  ".into())).is_enabled());
    }

    #[test]
    fn captures_with_key() {
        let mut a = AnalyticsClient::new(Some("phc_test".into()));
        a.capture("registration_created", &[("track", "hub")]);
        assert_eq!(a.events().len(), 1);
        assert_eq!(a.events()[0].properties["track"], "hub");
    }

    #[test]
    fn pending_queue_is_bounded() {
        let mut a = AnalyticsClient::new(Some("phc_test".into()));
        let n = MAX_PENDING_EVENTS + 10;
        for i in 0..n {
            a.capture("card_viewed", &[("i", &i.to_string())]);
        }
        assert_eq!(a.events().len(), MAX_PENDING_EVENTS);
        assert_eq!(a.dropped(), 10);
        assert_eq!(a.events()[0].properties["i"], "10");

        let out = a.flush();
        assert_eq!(out.len(), MAX_PENDING_EVENTS);
        assert_eq!(out.last().unwrap().properties["i"], (n - 1).to_string());
        assert!(a.events().is_empty());
    }
}
