//! Post-commit side effects
//!
//! Notifications and audit entries are spawned onto the runtime once the
//! transaction that caused them has committed. A failing sink is logged and
//! otherwise ignored: it never reaches the caller and never undoes a transition.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::NotificationConfig;
use crate::services::audit::{AuditEntry, AuditSink};
use crate::services::notification::{NotificationEvent, NotificationSink};

#[derive(Clone)]
pub struct Dispatcher {
    notifications: Arc<dyn NotificationSink>,
    audit: Arc<dyn AuditSink>,
    config: Arc<NotificationConfig>,
}

impl Dispatcher {
    pub fn new(
        notifications: Arc<dyn NotificationSink>,
        audit: Arc<dyn AuditSink>,
        config: NotificationConfig,
    ) -> Self {
        Self {
            notifications,
            audit,
            config: Arc::new(config),
        }
    }

    /// Permission code of the warehouse role group
    pub fn warehouse_permission(&self) -> &str {
        &self.config.warehouse_permission
    }

    /// Permission code of the finance role group
    pub fn finance_permission(&self) -> &str {
        &self.config.finance_permission
    }

    /// Emit a notification without waiting for it.
    ///
    /// The handle is only useful to tests; callers drop it.
    pub fn notify(&self, event: NotificationEvent) -> JoinHandle<()> {
        let sink = Arc::clone(&self.notifications);
        tokio::spawn(async move {
            if let Err(e) = sink.emit(&event).await {
                tracing::warn!(
                    tenant_id = %event.tenant_id,
                    event_type = %event.event_type,
                    "Failed to emit notification: {}",
                    e
                );
            }
        })
    }

    /// Record an audit entry without waiting for it
    pub fn audit(&self, entry: AuditEntry) -> JoinHandle<()> {
        let sink = Arc::clone(&self.audit);
        tokio::spawn(async move {
            if let Err(e) = sink.log(&entry).await {
                tracing::warn!(
                    model = entry.model,
                    entity_id = %entry.entity_id,
                    "Failed to write audit entry for {}: {}",
                    entry.action,
                    e
                );
            }
        })
    }
}
