use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub description: String,
    pub owner_id: Uuid,
    pub created_at: OffsetDateTime,
}

/// Job row joined with its owner's public identity.
#[derive(Debug, Clone, FromRow)]
pub struct JobWithOwner {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub owner_id: Uuid,
    pub owner_email: String,
}

/// Fields of a job posting to insert. Owner attribution comes from the
/// verified caller, not the body.
#[derive(Debug)]
pub struct NewJob<'a> {
    pub title: &'a str,
    pub company: &'a str,
    pub location: &'a str,
    pub job_type: &'a str,
    pub description: &'a str,
}

pub async fn list_with_owner(db: &PgPool) -> Result<Vec<JobWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, JobWithOwner>(
        r#"
        SELECT j.id, j.title, j.company, j.location, j.job_type, j.description,
               j.created_at, u.id AS owner_id, u.email AS owner_email
        FROM jobs j
        JOIN users u ON u.id = j.owner_id
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn create(db: &PgPool, owner_id: Uuid, job: NewJob<'_>) -> Result<Job, sqlx::Error> {
    sqlx::query_as::<_, Job>(
        r#"
        INSERT INTO jobs (title, company, location, job_type, description, owner_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, title, company, location, job_type, description, owner_id, created_at
        "#,
    )
    .bind(job.title)
    .bind(job.company)
    .bind(job.location)
    .bind(job.job_type)
    .bind(job.description)
    .bind(owner_id)
    .fetch_one(db)
    .await
}

/// Delete a job by id, returning how many rows were removed.
pub async fn delete_by_id(db: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
