use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{jwt::AuthUser, repo::User},
    error::ApiError,
    state::AppState,
};

use super::dto::{CreateJobRequest, DeleteJobResponse, JobOwner, JobResponse};
use super::repo::{self, NewJob};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/jobs", get(list_jobs))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs/create", post(create_job))
        .route("/jobs/delete/:id", delete(delete_job))
}

#[instrument(skip(state))]
pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobResponse>>, ApiError> {
    let rows = repo::list_with_owner(&state.db).await?;
    let jobs = rows
        .into_iter()
        .map(|j| JobResponse {
            id: j.id,
            title: j.title,
            company: j.company,
            location: j.location,
            job_type: j.job_type,
            description: j.description,
            created_at: j.created_at,
            owner: JobOwner {
                id: j.owner_id,
                email: j.owner_email,
            },
        })
        .collect();
    Ok(Json(jobs))
}

fn has_missing_fields(payload: &CreateJobRequest) -> bool {
    [
        &payload.title,
        &payload.company,
        &payload.location,
        &payload.job_type,
        &payload.description,
    ]
    .iter()
    .any(|f| f.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn create_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), ApiError> {
    if has_missing_fields(&payload) {
        warn!("create job with missing fields");
        return Err(ApiError::Validation("All fields are required".into()));
    }

    let owner = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::InvalidToken("User not found"))?;

    let job = repo::create(
        &state.db,
        owner.id,
        NewJob {
            title: &payload.title,
            company: &payload.company,
            location: &payload.location,
            job_type: &payload.job_type,
            description: &payload.description,
        },
    )
    .await?;

    info!(job_id = %job.id, owner_id = %owner.id, "job created");
    Ok((
        StatusCode::CREATED,
        Json(JobResponse {
            id: job.id,
            title: job.title,
            company: job.company,
            location: job.location,
            job_type: job.job_type,
            description: job.description,
            created_at: job.created_at,
            owner: JobOwner {
                id: owner.id,
                email: owner.email,
            },
        }),
    ))
}

// Any authenticated caller may delete any job; the gate checks token
// validity only.
#[instrument(skip(state))]
pub async fn delete_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteJobResponse>, ApiError> {
    let deleted = repo::delete_by_id(&state.db, id).await?;
    if deleted == 0 {
        warn!(%id, "delete of unknown job");
        return Err(ApiError::NotFound("Job not found".into()));
    }

    info!(%id, caller = %user_id, "job deleted");
    Ok(Json(DeleteJobResponse {
        message: "Job deleted".to_string(),
    }))
}
