use sqlx::{self, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{into_tenders, TenderRow, UserRow};
use crate::database::query_builder::QueryBuilder;
use crate::filter::Filter;
use crate::models::{Subscription, Tender, TenderDraft};
use crate::types::Role;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<UserRow>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM "users" WHERE "id" = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn select_404(&self, id: i32) -> Result<UserRow, DatabaseError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM "users" WHERE "email" = $1"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
    ) -> Result<UserRow, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"INSERT INTO "users" ("email", "password_hash", "full_name", "role")
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_profile(&self, id: i32, full_name: &str, role: Role) -> Result<UserRow, DatabaseError> {
        sqlx::query_as::<_, UserRow>(
            r#"UPDATE "users" SET "full_name" = $2, "role" = $3, "updated_at" = now()
               WHERE "id" = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(full_name)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    pub async fn update_password(&self, id: i32, password_hash: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query(r#"UPDATE "users" SET "password_hash" = $2, "updated_at" = now() WHERE "id" = $1"#)
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}

pub struct TenderRepository {
    pool: PgPool,
}

impl TenderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tenders matching the filter; an empty filter returns every row
    pub async fn select_any(&self, filter: Filter) -> Result<Vec<Tender>, DatabaseError> {
        let rows = QueryBuilder::<TenderRow>::new(filter).select_all(&self.pool).await?;
        into_tenders(rows)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Tender>, DatabaseError> {
        let row = sqlx::query_as::<_, TenderRow>(r#"SELECT * FROM "tenders" WHERE "id" = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Tender::try_from).transpose()
    }

    pub async fn select_404(&self, id: i32) -> Result<Tender, DatabaseError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Tender not found".to_string()))
    }

    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Tender>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query_as::<_, TenderRow>(r#"SELECT * FROM "tenders" WHERE "id" = ANY($1)"#)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        into_tenders(rows)
    }

    pub async fn create(&self, draft: &TenderDraft, created_by: i32) -> Result<Tender, DatabaseError> {
        let row = sqlx::query_as::<_, TenderRow>(
            r#"INSERT INTO "tenders"
                 ("title", "description", "budget", "deadline", "status", "category",
                  "company", "location", "requirements", "contact", "created_by")
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING *"#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.budget)
        .bind(draft.deadline)
        .bind(draft.status.as_str())
        .bind(&draft.category)
        .bind(&draft.company)
        .bind(&draft.location)
        .bind(&draft.requirements)
        .bind(&draft.contact)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Tender::try_from(row)
    }

    /// Writes every mutable column; `created_by` and `created_at` are kept
    pub async fn update(&self, id: i32, draft: &TenderDraft) -> Result<Tender, DatabaseError> {
        let row = sqlx::query_as::<_, TenderRow>(
            r#"UPDATE "tenders" SET
                 "title" = $2, "description" = $3, "budget" = $4, "deadline" = $5,
                 "status" = $6, "category" = $7, "company" = $8, "location" = $9,
                 "requirements" = $10, "contact" = $11, "updated_at" = now()
               WHERE "id" = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.budget)
        .bind(draft.deadline)
        .bind(draft.status.as_str())
        .bind(&draft.category)
        .bind(&draft.company)
        .bind(&draft.location)
        .bind(&draft.requirements)
        .bind(&draft.contact)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Tender not found".to_string()))?;
        Tender::try_from(row)
    }

    /// Deletes the tender and its subscriptions in one transaction.
    /// Returns how many subscriptions were removed.
    pub async fn delete_with_subscriptions(&self, id: i32) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(r#"DELETE FROM "subscriptions" WHERE "tender_id" = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query(r#"DELETE FROM "tenders" WHERE "id" = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Err(DatabaseError::NotFound("Tender not found".to_string()));
        }

        tx.commit().await?;
        Ok(removed)
    }
}

pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, tender_id: i32, user_id: i32) -> Result<Option<Subscription>, DatabaseError> {
        let row = sqlx::query_as::<_, Subscription>(
            r#"SELECT * FROM "subscriptions" WHERE "tender_id" = $1 AND "user_id" = $2"#,
        )
        .bind(tender_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Fails with a unique violation if the pair already exists
    pub async fn create(&self, tender_id: i32, user_id: i32) -> Result<Subscription, DatabaseError> {
        let row = sqlx::query_as::<_, Subscription>(
            r#"INSERT INTO "subscriptions" ("tender_id", "user_id") VALUES ($1, $2) RETURNING *"#,
        )
        .bind(tender_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// `false` when there was nothing to delete
    pub async fn delete(&self, tender_id: i32, user_id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query(r#"DELETE FROM "subscriptions" WHERE "tender_id" = $1 AND "user_id" = $2"#)
            .bind(tender_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<Subscription>, DatabaseError> {
        let rows = sqlx::query_as::<_, Subscription>(
            r#"SELECT * FROM "subscriptions" WHERE "user_id" = $1 ORDER BY "id""#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
