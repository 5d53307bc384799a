//! Outreach pipeline records backing the kanban-style board view.
//!
//! The board renders one column per stage in `STAGES` order; dropping a card
//! on a column issues a PATCH whose `stage` equals that column's value. Stage
//! and channel are convention enums kept as free text.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::shared::error::AppError;
use crate::shared::schema::outreach;
use crate::shared::state::AppState;
use crate::shared::utils::{run_blocking, search_pattern, ListQuery};

/// Ordered pipeline stages, left to right on the board.
pub const STAGES: [&str; 5] = [
    "Lead Identified",
    "Contacted",
    "Engaged",
    "Proposal Sent",
    "Closed",
];

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = outreach)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Outreach {
    pub id: i32,
    pub lead_name: String,
    pub channel: String,
    pub stage: String,
    pub added_by_id: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = outreach)]
#[serde(rename_all = "camelCase")]
pub struct NewOutreach {
    pub lead_name: String,
    pub channel: String,
    pub stage: String,
    pub added_by_id: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewOutreach {
    fn validate(&self) -> Result<(), AppError> {
        if self.lead_name.trim().is_empty() {
            return Err(AppError::Validation("Lead name is required".to_string()));
        }
        if self.channel.trim().is_empty() {
            return Err(AppError::Validation("Channel is required".to_string()));
        }
        if self.stage.trim().is_empty() {
            return Err(AppError::Validation("Stage is required".to_string()));
        }
        if self.added_by_id < 1 {
            return Err(AppError::Validation(
                "Team member must be assigned".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, AsChangeset)]
#[diesel(table_name = outreach)]
#[serde(rename_all = "camelCase")]
pub struct OutreachChanges {
    pub lead_name: Option<String>,
    pub channel: Option<String>,
    pub stage: Option<String>,
    pub added_by_id: Option<i32>,
    pub notes: Option<String>,
}

impl OutreachChanges {
    fn is_empty(&self) -> bool {
        self.lead_name.is_none()
            && self.channel.is_none()
            && self.stage.is_none()
            && self.added_by_id.is_none()
            && self.notes.is_none()
    }
}

pub fn find_all(conn: &mut PgConnection, search: Option<&str>) -> Result<Vec<Outreach>, AppError> {
    let mut query = outreach::table
        .select(Outreach::as_select())
        .order(outreach::id.asc())
        .into_boxed();
    if let Some(pattern) = search_pattern(search) {
        query = query.filter(outreach::lead_name.ilike(pattern));
    }
    Ok(query.load(conn)?)
}

pub fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<Outreach, AppError> {
    outreach::table
        .find(id)
        .select(Outreach::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound("Outreach entry not found".to_string()))
}

pub fn insert(conn: &mut PgConnection, entry: NewOutreach) -> Result<Outreach, AppError> {
    Ok(diesel::insert_into(outreach::table)
        .values(&entry)
        .returning(Outreach::as_returning())
        .get_result(conn)?)
}

pub fn update_by_id(
    conn: &mut PgConnection,
    id: i32,
    changes: OutreachChanges,
) -> Result<Outreach, AppError> {
    if changes.is_empty() {
        return find_by_id(conn, id);
    }
    diesel::update(outreach::table.find(id))
        .set(&changes)
        .returning(Outreach::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound("Outreach entry not found".to_string()))
}

pub fn delete_by_id(conn: &mut PgConnection, id: i32) -> Result<(), AppError> {
    let deleted = diesel::delete(outreach::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(AppError::NotFound("Outreach entry not found".to_string()));
    }
    Ok(())
}

pub async fn list_outreach(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Outreach>>, AppError> {
    let entries =
        run_blocking(&state.conn, move |conn| find_all(conn, query.search.as_deref())).await?;
    Ok(Json(entries))
}

/// Board column contract: the ordered stage list the client renders.
pub async fn list_stages() -> Json<Vec<&'static str>> {
    Json(STAGES.to_vec())
}

pub async fn get_outreach(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Outreach>, AppError> {
    let entry = run_blocking(&state.conn, move |conn| find_by_id(conn, id)).await?;
    Ok(Json(entry))
}

pub async fn create_outreach(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewOutreach>, JsonRejection>,
) -> Result<(StatusCode, Json<Outreach>), AppError> {
    let Json(entry) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    entry.validate()?;
    let entry = run_blocking(&state.conn, move |conn| insert(conn, entry)).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_outreach(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<OutreachChanges>, JsonRejection>,
) -> Result<Json<Outreach>, AppError> {
    let Json(changes) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let entry = run_blocking(&state.conn, move |conn| update_by_id(conn, id, changes)).await?;
    Ok(Json(entry))
}

pub async fn delete_outreach(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    run_blocking(&state.conn, move |conn| delete_by_id(conn, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_outreach).post(create_outreach))
        .route("/stages", get(list_stages))
        .route(
            "/:id",
            get(get_outreach)
                .patch(update_outreach)
                .delete(delete_outreach),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_in_pipeline_order() {
        assert_eq!(STAGES.first(), Some(&"Lead Identified"));
        assert_eq!(STAGES.last(), Some(&"Closed"));
        assert_eq!(STAGES.len(), 5);
    }

    #[test]
    fn drop_patch_carries_only_the_stage() {
        // What the board sends when a card lands on the "Engaged" column.
        let changes: OutreachChanges = serde_json::from_str(r#"{"stage":"Engaged"}"#).unwrap();
        assert_eq!(changes.stage.as_deref(), Some("Engaged"));
        assert!(changes.lead_name.is_none());
        assert!(changes.channel.is_none());
        assert!(!changes.is_empty());
    }

    #[test]
    fn blank_channel_is_rejected() {
        let entry: NewOutreach = serde_json::from_str(
            r#"{"leadName":"Acme","channel":"","stage":"Contacted","addedById":1}"#,
        )
        .unwrap();
        let err = entry.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "Channel is required"));
    }
}
