//! Audit trail of ledger movements and workflow transitions

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

/// One audited change
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub tenant_id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: &'static str,
    pub model: &'static str,
    pub entity_id: Uuid,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
}

impl AuditEntry {
    pub fn new(
        tenant_id: Uuid,
        user_id: Uuid,
        action: &'static str,
        model: &'static str,
        entity_id: Uuid,
    ) -> Self {
        Self {
            tenant_id,
            user_id: Some(user_id),
            action,
            model,
            entity_id,
            before: None,
            after: None,
        }
    }

    pub fn before<T: Serialize>(mut self, value: &T) -> Self {
        self.before = serde_json::to_value(value).ok();
        self
    }

    pub fn after<T: Serialize>(mut self, value: &T) -> Self {
        self.after = serde_json::to_value(value).ok();
        self
    }
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log(&self, entry: &AuditEntry) -> AppResult<()>;
}

/// Audit sink writing into the `audit_logs` table
#[derive(Clone)]
pub struct PgAuditLog {
    db: PgPool,
}

impl PgAuditLog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for PgAuditLog {
    async fn log(&self, entry: &AuditEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (tenant_id, user_id, action, model, entity_id, before, after)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.tenant_id)
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(entry.model)
        .bind(entry.entity_id)
        .bind(&entry.before)
        .bind(&entry.after)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
