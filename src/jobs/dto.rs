use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Request body for creating a job posting. Absent fields deserialize empty
/// and are rejected by validation.
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub description: String,
}

/// Public identity of the user who posted a job.
#[derive(Debug, Serialize)]
pub struct JobOwner {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub owner: JobOwner,
}

#[derive(Debug, Serialize)]
pub struct DeleteJobResponse {
    pub message: String,
}
