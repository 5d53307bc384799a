//! Lead pipeline records.
//!
//! Status is a convention enum (New, Contacted, In Progress, Won, Lost) kept
//! as free text; `last_activity` is stamped by the store at creation when the
//! client does not send one.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::shared::error::AppError;
use crate::shared::schema::leads;
use crate::shared::state::AppState;
use crate::shared::utils::{run_blocking, search_pattern, ListQuery};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = leads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: i32,
    pub name: String,
    pub company: String,
    pub contact_info: String,
    pub source: String,
    pub status: String,
    pub added_by_id: i32,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = leads)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub name: String,
    pub company: String,
    pub contact_info: String,
    pub source: String,
    pub status: String,
    pub added_by_id: i32,
    // None falls through to the column default (now()).
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

impl NewLead {
    fn validate(&self) -> Result<(), AppError> {
        let checks = [
            (self.name.trim().is_empty(), "Name is required"),
            (self.company.trim().is_empty(), "Company name is required"),
            (
                self.contact_info.trim().is_empty(),
                "Contact information is required",
            ),
            (self.source.trim().is_empty(), "Source is required"),
            (self.status.trim().is_empty(), "Status is required"),
            (self.added_by_id < 1, "Team member must be assigned"),
        ];
        for (failed, message) in checks {
            if failed {
                return Err(AppError::Validation(message.to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, AsChangeset)]
#[diesel(table_name = leads)]
#[serde(rename_all = "camelCase")]
pub struct LeadChanges {
    pub name: Option<String>,
    pub company: Option<String>,
    pub contact_info: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub added_by_id: Option<i32>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl LeadChanges {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.company.is_none()
            && self.contact_info.is_none()
            && self.source.is_none()
            && self.status.is_none()
            && self.added_by_id.is_none()
            && self.last_activity.is_none()
    }
}

pub fn find_all(conn: &mut PgConnection, search: Option<&str>) -> Result<Vec<Lead>, AppError> {
    let mut query = leads::table
        .select(Lead::as_select())
        .order(leads::id.asc())
        .into_boxed();
    if let Some(pattern) = search_pattern(search) {
        query = query.filter(
            leads::name
                .ilike(pattern.clone())
                .or(leads::company.ilike(pattern)),
        );
    }
    Ok(query.load(conn)?)
}

pub fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<Lead, AppError> {
    leads::table
        .find(id)
        .select(Lead::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))
}

pub fn insert(conn: &mut PgConnection, lead: NewLead) -> Result<Lead, AppError> {
    Ok(diesel::insert_into(leads::table)
        .values(&lead)
        .returning(Lead::as_returning())
        .get_result(conn)?)
}

pub fn update_by_id(conn: &mut PgConnection, id: i32, changes: LeadChanges) -> Result<Lead, AppError> {
    if changes.is_empty() {
        return find_by_id(conn, id);
    }
    diesel::update(leads::table.find(id))
        .set(&changes)
        .returning(Lead::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))
}

pub fn delete_by_id(conn: &mut PgConnection, id: i32) -> Result<(), AppError> {
    let deleted = diesel::delete(leads::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(AppError::NotFound("Lead not found".to_string()));
    }
    Ok(())
}

pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Lead>>, AppError> {
    let leads =
        run_blocking(&state.conn, move |conn| find_all(conn, query.search.as_deref())).await?;
    Ok(Json(leads))
}

pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Lead>, AppError> {
    let lead = run_blocking(&state.conn, move |conn| find_by_id(conn, id)).await?;
    Ok(Json(lead))
}

pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewLead>, JsonRejection>,
) -> Result<(StatusCode, Json<Lead>), AppError> {
    let Json(lead) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    lead.validate()?;
    let lead = run_blocking(&state.conn, move |conn| insert(conn, lead)).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<LeadChanges>, JsonRejection>,
) -> Result<Json<Lead>, AppError> {
    let Json(changes) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let lead = run_blocking(&state.conn, move |conn| update_by_id(conn, id, changes)).await?;
    Ok(Json(lead))
}

pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    run_blocking(&state.conn, move |conn| delete_by_id(conn, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_leads).post(create_lead))
        .route("/:id", get(get_lead).patch(update_lead).delete(delete_lead))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_util;

    #[test]
    fn validation_reports_first_missing_field() {
        test_util::setup();
        let lead: NewLead = serde_json::from_str(
            r#"{"name":"X Corp","company":"","contactInfo":"a@x.com","source":"Website","status":"New","addedById":1}"#,
        )
        .unwrap();
        let err = lead.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "Company name is required"));
    }

    #[test]
    fn unassigned_member_is_rejected() {
        let lead: NewLead = serde_json::from_str(
            r#"{"name":"X Corp","company":"X","contactInfo":"a@x.com","source":"Website","status":"New","addedById":0}"#,
        )
        .unwrap();
        let err = lead.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "Team member must be assigned"));
    }

    #[test]
    fn last_activity_accepts_iso8601() {
        let lead: NewLead = serde_json::from_str(
            r#"{"name":"X Corp","company":"X","contactInfo":"a@x.com","source":"Website","status":"New","addedById":1,"lastActivity":"2024-03-01T10:30:00Z"}"#,
        )
        .unwrap();
        let when = lead.last_activity.unwrap();
        assert_eq!(when.to_rfc3339(), "2024-03-01T10:30:00+00:00");
    }

    #[test]
    fn partial_patch_only_names_one_field() {
        let changes: LeadChanges = serde_json::from_str(r#"{"status":"Won"}"#).unwrap();
        assert_eq!(changes.status.as_deref(), Some("Won"));
        assert!(changes.name.is_none());
        assert!(changes.last_activity.is_none());
        assert!(!changes.is_empty());
    }
}
