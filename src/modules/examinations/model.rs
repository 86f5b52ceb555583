//! Examination, grade and grading scale data models and DTOs.

use crate::utils::serde::{deserialize_optional_bool, deserialize_optional_uuid};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Accepted values for `exam_type`.
pub const EXAM_TYPES: &[&str] = &[
    "midterm",
    "final",
    "quiz",
    "assignment",
    "project",
    "other",
];

/// Accepted values for a grade's `status`.
pub const GRADE_STATUSES: &[&str] = &["pending", "passed", "failed", "absent"];

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Examination {
    pub id: Uuid,
    pub name: String,
    pub exam_type: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub description: Option<String>,
    pub class_id: Option<Uuid>,
    pub is_published: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateExaminationDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "exam_type must not be empty"))]
    pub exam_type: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub description: Option<String>,
    pub class_id: Option<Uuid>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateExaminationDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub exam_type: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    pub description: Option<String>,
    pub class_id: Option<Uuid>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExaminationFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub class_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_published: Option<bool>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedExaminationsResponse {
    pub data: Vec<Examination>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

/// One subject scheduled within an examination.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct ExaminationSubject {
    pub id: Uuid,
    pub examination_id: Uuid,
    pub subject_id: Uuid,
    pub exam_date: chrono::NaiveDate,
    pub total_marks: f64,
    pub passing_marks: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateExamSubjectDto {
    pub subject_id: Uuid,
    pub exam_date: chrono::NaiveDate,
    #[validate(range(min = 0.0, message = "total_marks must not be negative"))]
    pub total_marks: f64,
    #[validate(range(min = 0.0, message = "passing_marks must not be negative"))]
    pub passing_marks: f64,
}

/// Marks awarded to one student for one examination subject.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Grade {
    pub id: Uuid,
    pub student_id: Uuid,
    pub examination_subject_id: Uuid,
    pub marks_obtained: f64,
    pub grade_letter: Option<String>,
    pub remarks: Option<String>,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateGradeDto {
    pub student_id: Uuid,
    #[validate(range(min = 0.0, message = "marks_obtained must not be negative"))]
    pub marks_obtained: f64,
    pub grade_letter: Option<String>,
    pub remarks: Option<String>,
    /// Defaults to `pending` when omitted.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateGradeDto {
    #[validate(range(min = 0.0, message = "marks_obtained must not be negative"))]
    pub marks_obtained: Option<f64>,
    pub grade_letter: Option<String>,
    pub remarks: Option<String>,
    pub status: Option<String>,
}

/// Maps a mark range onto a letter grade.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct GradingScale {
    pub id: Uuid,
    pub letter: String,
    pub min_marks: f64,
    pub max_marks: f64,
    pub gpa: Option<f64>,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateGradingScaleDto {
    #[validate(length(min = 1, message = "letter must not be empty"))]
    pub letter: String,
    #[validate(range(min = 0.0, max = 100.0, message = "min_marks must be between 0 and 100"))]
    pub min_marks: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "max_marks must be between 0 and 100"))]
    pub max_marks: f64,
    pub gpa: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateGradingScaleDto {
    #[validate(length(min = 1, message = "letter must not be empty"))]
    pub letter: Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "min_marks must be between 0 and 100"))]
    pub min_marks: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "max_marks must be between 0 and 100"))]
    pub max_marks: Option<f64>,
    pub gpa: Option<f64>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn create_examination_dto_accepts_valid_input() {
        let dto = CreateExaminationDto {
            name: "Midterm 2026".to_string(),
            exam_type: "midterm".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            description: None,
            class_id: None,
            is_published: false,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn grade_dto_rejects_negative_marks() {
        let dto = CreateGradeDto {
            student_id: Uuid::new_v4(),
            marks_obtained: -1.0,
            grade_letter: None,
            remarks: None,
            status: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn grading_scale_dto_bounds_marks() {
        let dto = CreateGradingScaleDto {
            letter: "A".to_string(),
            min_marks: 90.0,
            max_marks: 101.0,
            gpa: Some(4.0),
            description: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn grade_statuses_cover_expected_values() {
        assert!(GRADE_STATUSES.contains(&"pending"));
        assert!(GRADE_STATUSES.contains(&"absent"));
        assert!(!GRADE_STATUSES.contains(&"unknown"));
    }
}
