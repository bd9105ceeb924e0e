//! Student HTTP Routes
//!
//! JSON endpoints over the record lifecycle. Rejected submissions are
//! echoed back in the error body so a form can be re-presented as typed.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::registry::{Lookup, Registry, StudentRecord, StudentSubmission};

/// Shown after a successful create
pub const REGISTERED_MESSAGE: &str = "Student Registered Successfully!";

/// Shown after a successful update
pub const UPDATED_MESSAGE: &str = "Record Updated Successfully!";

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct StudentsListResponse {
    pub students: Vec<StudentRecord>,
    pub count: usize,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StudentMutationResponse {
    pub message: String,
    pub student: StudentRecord,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================
// Student Routes
// ==================

/// Create student routes
pub fn student_routes(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/students", get(list_students_handler).post(create_student_handler))
        .route(
            "/students/:id",
            get(get_student_handler)
                .put(update_student_handler)
                .post(update_student_handler)
                .delete(delete_student_handler),
        )
        .with_state(registry)
}

// ==================
// Handlers
// ==================

async fn list_students_handler(State(registry): State<Arc<Registry>>) -> Json<StudentsListResponse> {
    let list = registry.list().await;
    Json(StudentsListResponse {
        count: list.students.len(),
        students: list.students,
        error: list.error,
    })
}

async fn create_student_handler(
    State(registry): State<Arc<Registry>>,
    Json(submission): Json<StudentSubmission>,
) -> Response {
    match registry.create(&submission).await {
        Ok(student) => (
            StatusCode::CREATED,
            Json(StudentMutationResponse {
                message: REGISTERED_MESSAGE.to_string(),
                student,
            }),
        )
            .into_response(),
        Err(e) => e.into_response_with(submission),
    }
}

async fn get_student_handler(
    State(registry): State<Arc<Registry>>,
    Path(id): Path<String>,
) -> Response {
    match registry.get(&id).await {
        Ok(Lookup::Found(student)) => Json(student).into_response(),
        Ok(Lookup::Absent) => (
            StatusCode::NOT_FOUND,
            Json(MessageResponse {
                message: format!("Student '{}' not found", id),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn update_student_handler(
    State(registry): State<Arc<Registry>>,
    Path(id): Path<String>,
    Json(submission): Json<StudentSubmission>,
) -> Response {
    match registry.update(&id, &submission).await {
        Ok(student) => Json(StudentMutationResponse {
            message: UPDATED_MESSAGE.to_string(),
            student,
        })
        .into_response(),
        Err(e) => e.into_response_with(submission),
    }
}

async fn delete_student_handler(
    State(registry): State<Arc<Registry>>,
    Path(id): Path<String>,
) -> Response {
    match registry.delete(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
