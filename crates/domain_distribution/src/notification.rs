//! Participant notifications
//!
//! Notifications are best effort. The engine hands them to a
//! `NotificationSink` on a spawned task after a commit; a failing sink is
//! logged and never affects the commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::{NotificationId, PortError};
use domain_participant::OwnerRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub owner: OwnerRef,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(owner: OwnerRef, title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: NotificationId::new_v7(),
            owner,
            title: title.into(),
            message: message.into(),
            severity,
            created_at: Utc::now(),
        }
    }
}

/// Destination for participant notifications
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn notify(&self, notification: Notification) -> Result<(), PortError>;
}

/// Sink that only writes notifications to the log
#[derive(Debug, Clone, Default)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn notify(&self, notification: Notification) -> Result<(), PortError> {
        info!(
            owner = %notification.owner,
            severity = notification.severity.as_str(),
            title = %notification.title,
            "{}",
            notification.message
        );
        Ok(())
    }
}
