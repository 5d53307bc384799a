//! Follow-up tasks: a name, an owner, a due date and a completed flag.

pub mod types;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use diesel::prelude::*;
use std::sync::Arc;

use crate::shared::error::AppError;
use crate::shared::schema::tasks;
use crate::shared::state::AppState;
use crate::shared::utils::{run_blocking, search_pattern, ListQuery};

pub use types::{NewTask, Task, TaskChanges};

pub fn find_all(conn: &mut PgConnection, search: Option<&str>) -> Result<Vec<Task>, AppError> {
    let mut query = tasks::table
        .select(Task::as_select())
        .order(tasks::id.asc())
        .into_boxed();
    if let Some(pattern) = search_pattern(search) {
        query = query.filter(tasks::name.ilike(pattern));
    }
    Ok(query.load(conn)?)
}

pub fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<Task, AppError> {
    tasks::table
        .find(id)
        .select(Task::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
}

pub fn insert(conn: &mut PgConnection, task: NewTask) -> Result<Task, AppError> {
    Ok(diesel::insert_into(tasks::table)
        .values(&task)
        .returning(Task::as_returning())
        .get_result(conn)?)
}

pub fn update_by_id(conn: &mut PgConnection, id: i32, changes: TaskChanges) -> Result<Task, AppError> {
    if changes.is_empty() {
        return find_by_id(conn, id);
    }
    diesel::update(tasks::table.find(id))
        .set(&changes)
        .returning(Task::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
}

pub fn delete_by_id(conn: &mut PgConnection, id: i32) -> Result<(), AppError> {
    let deleted = diesel::delete(tasks::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(AppError::NotFound("Task not found".to_string()));
    }
    Ok(())
}

pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks =
        run_blocking(&state.conn, move |conn| find_all(conn, query.search.as_deref())).await?;
    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Task>, AppError> {
    let task = run_blocking(&state.conn, move |conn| find_by_id(conn, id)).await?;
    Ok(Json(task))
}

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let Json(task) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    task.validate()?;
    let task = run_blocking(&state.conn, move |conn| insert(conn, task)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<TaskChanges>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let Json(changes) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let task = run_blocking(&state.conn, move |conn| update_by_id(conn, id, changes)).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    run_blocking(&state.conn, move |conn| delete_by_id(conn, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", get(get_task).patch(update_task).delete(delete_task))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_date_parses_from_iso8601() {
        let task: NewTask = serde_json::from_str(
            r#"{"name":"Follow up","addedById":1,"dueDate":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(task.due_date.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(task.completed, None);
    }

    #[test]
    fn missing_due_date_fails_deserialization() {
        let result: Result<NewTask, _> =
            serde_json::from_str(r#"{"name":"Follow up","addedById":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn blank_task_name_is_rejected() {
        let task: NewTask = serde_json::from_str(
            r#"{"name":"","addedById":1,"dueDate":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let err = task.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "Task name is required"));
    }

    #[test]
    fn completion_patch_touches_one_field() {
        let changes: TaskChanges = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert_eq!(changes.completed, Some(true));
        assert!(changes.name.is_none());
        assert!(changes.due_date.is_none());
    }
}
