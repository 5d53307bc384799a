//! Upwork bid tracking. Status is a convention enum (Draft, Submitted,
//! Shortlisted, Hired, Lost); `submission_date` is stamped at creation when
//! the client does not send one.

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
use crate::shared::schema::bids;
use crate::shared::state::AppState;
use crate::shared::utils::{run_blocking, search_pattern, ListQuery};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = bids)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: i32,
    pub job_title: String,
    pub job_link: String,
    pub bid_amount: i32,
    pub status: String,
    pub submission_date: DateTime<Utc>,
    pub added_by_id: i32,
    pub proposal_notes: Option<String>,
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = bids)]
#[serde(rename_all = "camelCase")]
pub struct NewBid {
    pub job_title: String,
    pub job_link: String,
    pub bid_amount: i32,
    pub status: String,
    // None falls through to the column default (now()).
    #[serde(default)]
    pub submission_date: Option<DateTime<Utc>>,
    pub added_by_id: i32,
    #[serde(default)]
    pub proposal_notes: Option<String>,
}

impl NewBid {
    fn validate(&self) -> Result<(), AppError> {
        if self.job_title.trim().is_empty() {
            return Err(AppError::Validation("Job title is required".to_string()));
        }
        if self.job_link.trim().is_empty() {
            return Err(AppError::Validation("Job link is required".to_string()));
        }
        if self.status.trim().is_empty() {
            return Err(AppError::Validation("Status is required".to_string()));
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
#[diesel(table_name = bids)]
#[serde(rename_all = "camelCase")]
pub struct BidChanges {
    pub job_title: Option<String>,
    pub job_link: Option<String>,
    pub bid_amount: Option<i32>,
    pub status: Option<String>,
    pub submission_date: Option<DateTime<Utc>>,
    pub added_by_id: Option<i32>,
    pub proposal_notes: Option<String>,
}

impl BidChanges {
    fn is_empty(&self) -> bool {
        self.job_title.is_none()
            && self.job_link.is_none()
            && self.bid_amount.is_none()
            && self.status.is_none()
            && self.submission_date.is_none()
            && self.added_by_id.is_none()
            && self.proposal_notes.is_none()
    }
}

pub fn find_all(conn: &mut PgConnection, search: Option<&str>) -> Result<Vec<Bid>, AppError> {
    let mut query = bids::table
        .select(Bid::as_select())
        .order(bids::id.asc())
        .into_boxed();
    if let Some(pattern) = search_pattern(search) {
        query = query.filter(bids::job_title.ilike(pattern));
    }
    Ok(query.load(conn)?)
}

pub fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<Bid, AppError> {
    bids::table
        .find(id)
        .select(Bid::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound("Bid not found".to_string()))
}

pub fn insert(conn: &mut PgConnection, bid: NewBid) -> Result<Bid, AppError> {
    Ok(diesel::insert_into(bids::table)
        .values(&bid)
        .returning(Bid::as_returning())
        .get_result(conn)?)
}

pub fn update_by_id(conn: &mut PgConnection, id: i32, changes: BidChanges) -> Result<Bid, AppError> {
    if changes.is_empty() {
        return find_by_id(conn, id);
    }
    diesel::update(bids::table.find(id))
        .set(&changes)
        .returning(Bid::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound("Bid not found".to_string()))
}

pub fn delete_by_id(conn: &mut PgConnection, id: i32) -> Result<(), AppError> {
    let deleted = diesel::delete(bids::table.find(id)).execute(conn)?;
    if deleted == 0 {
        return Err(AppError::NotFound("Bid not found".to_string()));
    }
    Ok(())
}

pub async fn list_bids(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Bid>>, AppError> {
    let bids =
        run_blocking(&state.conn, move |conn| find_all(conn, query.search.as_deref())).await?;
    Ok(Json(bids))
}

pub async fn get_bid(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Bid>, AppError> {
    let bid = run_blocking(&state.conn, move |conn| find_by_id(conn, id)).await?;
    Ok(Json(bid))
}

pub async fn create_bid(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewBid>, JsonRejection>,
) -> Result<(StatusCode, Json<Bid>), AppError> {
    let Json(bid) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    bid.validate()?;
    let bid = run_blocking(&state.conn, move |conn| insert(conn, bid)).await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

pub async fn update_bid(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<BidChanges>, JsonRejection>,
) -> Result<Json<Bid>, AppError> {
    let Json(changes) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let bid = run_blocking(&state.conn, move |conn| update_by_id(conn, id, changes)).await?;
    Ok(Json(bid))
}

pub async fn delete_bid(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    run_blocking(&state.conn, move |conn| delete_by_id(conn, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_bids).post(create_bid))
        .route("/:id", get(get_bid).patch(update_bid).delete(delete_bid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload_round_trips_optional_notes() {
        let bid: NewBid = serde_json::from_str(
            r#"{"jobTitle":"Rust API","jobLink":"https://example.com/job","bidAmount":120,"status":"Submitted","addedById":1}"#,
        )
        .unwrap();
        assert_eq!(bid.proposal_notes, None);
        assert_eq!(bid.submission_date, None);
        assert!(bid.validate().is_ok());
    }

    #[test]
    fn blank_job_link_is_rejected() {
        let bid: NewBid = serde_json::from_str(
            r#"{"jobTitle":"Rust API","jobLink":" ","bidAmount":120,"status":"Draft","addedById":1}"#,
        )
        .unwrap();
        let err = bid.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "Job link is required"));
    }

    #[test]
    fn status_patch_leaves_amount_alone() {
        let changes: BidChanges = serde_json::from_str(r#"{"status":"Hired"}"#).unwrap();
        assert_eq!(changes.status.as_deref(), Some("Hired"));
        assert!(changes.bid_amount.is_none());
        assert!(!changes.is_empty());
    }
}
