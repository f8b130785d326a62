//! Project directory owned by the project administration module
//!
//! The inventory core only needs to know whether a project exists within a
//! tenant, what it is called, and whether a user may act on it.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn project_exists(&self, tenant_id: Uuid, project_id: Uuid) -> AppResult<bool>;

    async fn project_name(&self, tenant_id: Uuid, project_id: Uuid) -> AppResult<Option<String>>;

    async fn user_has_project_access(&self, user_id: Uuid, project_id: Uuid) -> AppResult<bool>;
}

/// Directory backed by the `projects` and `project_members` tables
#[derive(Clone)]
pub struct PgProjectDirectory {
    db: PgPool,
}

impl PgProjectDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProjectDirectory for PgProjectDirectory {
    async fn project_exists(&self, tenant_id: Uuid, project_id: Uuid) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(project_id)
        .bind(tenant_id)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn project_name(&self, tenant_id: Uuid, project_id: Uuid) -> AppResult<Option<String>> {
        let name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM projects WHERE id = $1 AND tenant_id = $2",
        )
        .bind(project_id)
        .bind(tenant_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(name)
    }

    async fn user_has_project_access(&self, user_id: Uuid, project_id: Uuid) -> AppResult<bool> {
        let member = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM project_members WHERE project_id = $1 AND user_id = $2)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(member)
    }
}
