// src/models/students.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,

    #[schema(ignore)]
    pub owner_id: Uuid,

    // Gerado pela sequência anual: "2026-0001"
    #[schema(example = "2026-0001")]
    pub student_number: String,

    #[schema(example = "Ana")]
    pub first_name: String,

    #[schema(example = "Silva")]
    pub last_name: String,

    // Série escolar (1 a 12)
    #[schema(example = 7)]
    pub grade: i16,

    #[schema(example = "pt")]
    pub language: String,

    pub parent_name: Option<String>,
    pub parent_contact: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ana")]
    pub first_name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Silva")]
    pub last_name: String,

    #[validate(range(min = 1, max = 12, message = "A série deve estar entre 1 e 12"))]
    #[schema(example = 7)]
    pub grade: i16,

    #[schema(example = "pt")]
    pub language: Option<String>,

    pub parent_name: Option<String>,
    pub parent_contact: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentPayload {
    #[validate(length(min = 1, message = "required"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, message = "required"))]
    pub last_name: Option<String>,

    #[validate(range(min = 1, max = 12, message = "A série deve estar entre 1 e 12"))]
    pub grade: Option<i16>,

    pub language: Option<String>,
    pub parent_name: Option<String>,
    pub parent_contact: Option<String>,
}
