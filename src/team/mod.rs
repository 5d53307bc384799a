//! Team member records. Every other entity points back here via `added_by_id`.

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
use crate::shared::schema::team_members;
use crate::shared::state::AppState;
use crate::shared::utils::{run_blocking, search_pattern, ListQuery};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = team_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: i32,
    pub name: String,
    /// Convention enum: "upwork" or "direct".
    pub role: String,
    pub target: i32,
    pub target_clients: i32,
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = team_members)]
#[serde(rename_all = "camelCase")]
pub struct NewTeamMember {
    pub name: String,
    pub role: String,
    pub target: i32,
    // None falls through to the column default (2).
    #[serde(default)]
    pub target_clients: Option<i32>,
}

impl NewTeamMember {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if self.role.trim().is_empty() {
            return Err(AppError::Validation("Role is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, AsChangeset)]
#[diesel(table_name = team_members)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberChanges {
    pub name: Option<String>,
    pub role: Option<String>,
    pub target: Option<i32>,
    pub target_clients: Option<i32>,
}

impl TeamMemberChanges {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.target.is_none()
            && self.target_clients.is_none()
    }
}

pub fn find_all(conn: &mut PgConnection, search: Option<&str>) -> Result<Vec<TeamMember>, AppError> {
    let mut query = team_members::table
        .select(TeamMember::as_select())
        .order(team_members::id.asc())
        .into_boxed();
    if let Some(pattern) = search_pattern(search) {
        query = query.filter(team_members::name.ilike(pattern));
    }
    Ok(query.load(conn)?)
}

pub fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<TeamMember, AppError> {
    team_members::table
        .find(id)
        .select(TeamMember::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound("Team member not found".to_string()))
}

pub fn insert(conn: &mut PgConnection, member: NewTeamMember) -> Result<TeamMember, AppError> {
    Ok(diesel::insert_into(team_members::table)
        .values(&member)
        .returning(TeamMember::as_returning())
        .get_result(conn)?)
}

pub fn update_by_id(
    conn: &mut PgConnection,
    id: i32,
    changes: TeamMemberChanges,
) -> Result<TeamMember, AppError> {
    if changes.is_empty() {
        return find_by_id(conn, id);
    }
    diesel::update(team_members::table.find(id))
        .set(&changes)
        .returning(TeamMember::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound("Team member not found".to_string()))
}

pub fn delete_by_id(conn: &mut PgConnection, id: i32) -> Result<(), AppError> {
    let deleted = diesel::delete(team_members::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(AppError::NotFound("Team member not found".to_string()));
    }
    Ok(())
}

pub async fn list_team_members(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TeamMember>>, AppError> {
    let members =
        run_blocking(&state.conn, move |conn| find_all(conn, query.search.as_deref())).await?;
    Ok(Json(members))
}

pub async fn get_team_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<TeamMember>, AppError> {
    let member = run_blocking(&state.conn, move |conn| find_by_id(conn, id)).await?;
    Ok(Json(member))
}

pub async fn create_team_member(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTeamMember>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamMember>), AppError> {
    let Json(member) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    member.validate()?;
    let member = run_blocking(&state.conn, move |conn| insert(conn, member)).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn update_team_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<TeamMemberChanges>, JsonRejection>,
) -> Result<Json<TeamMember>, AppError> {
    let Json(changes) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let member = run_blocking(&state.conn, move |conn| update_by_id(conn, id, changes)).await?;
    Ok(Json(member))
}

pub async fn delete_team_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    run_blocking(&state.conn, move |conn| delete_by_id(conn, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_team_members).post(create_team_member))
        .route(
            "/:id",
            get(get_team_member)
                .patch(update_team_member)
                .delete(delete_team_member),
        )
}
