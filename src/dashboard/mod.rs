//! Dashboard aggregates computed from the live tables. The earlier client
//! matrix rendered simulated numbers; these endpoints are the real source.

use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::shared::error::AppError;
use crate::shared::schema::{bids, leads, outreach, tasks, team_members};
use crate::shared::state::AppState;
use crate::shared::utils::run_blocking;
use crate::team::TeamMember;

const WON_LEAD_STATUS: &str = "Won";
const HIRED_BID_STATUS: &str = "Hired";

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_leads: i64,
    pub tasks_due_today: i64,
    pub total_wins: i64,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPerformance {
    pub member_id: i32,
    pub name: String,
    pub role: String,
    pub target: i32,
    pub target_clients: i32,
    pub lead_count: i64,
    pub leads_won: i64,
    pub bid_count: i64,
    pub bids_hired: i64,
    pub outreach_count: i64,
}

fn same_utc_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

/// Folds per-owner rows into one performance line per team member. Rows whose
/// owner is no longer present are dropped rather than invented as a member.
pub fn summarize_performance(
    members: Vec<TeamMember>,
    lead_rows: &[(i32, String)],
    bid_rows: &[(i32, String)],
    outreach_owners: &[i32],
) -> Vec<MemberPerformance> {
    let mut by_member: HashMap<i32, MemberPerformance> = members
        .into_iter()
        .map(|m| {
            (
                m.id,
                MemberPerformance {
                    member_id: m.id,
                    name: m.name,
                    role: m.role,
                    target: m.target,
                    target_clients: m.target_clients,
                    lead_count: 0,
                    leads_won: 0,
                    bid_count: 0,
                    bids_hired: 0,
                    outreach_count: 0,
                },
            )
        })
        .collect();

    for (owner, status) in lead_rows {
        if let Some(line) = by_member.get_mut(owner) {
            line.lead_count += 1;
            if status == WON_LEAD_STATUS {
                line.leads_won += 1;
            }
        }
    }
    for (owner, status) in bid_rows {
        if let Some(line) = by_member.get_mut(owner) {
            line.bid_count += 1;
            if status == HIRED_BID_STATUS {
                line.bids_hired += 1;
            }
        }
    }
    for owner in outreach_owners {
        if let Some(line) = by_member.get_mut(owner) {
            line.outreach_count += 1;
        }
    }

    let mut lines: Vec<MemberPerformance> = by_member.into_values().collect();
    lines.sort_by_key(|line| line.member_id);
    lines
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = run_blocking(&state.conn, move |conn| {
        let total_leads: i64 = leads::table.count().get_result(conn)?;
        let total_wins: i64 = bids::table
            .filter(bids::status.eq(HIRED_BID_STATUS))
            .count()
            .get_result(conn)?;
        let due_dates: Vec<DateTime<Utc>> = tasks::table.select(tasks::due_date).load(conn)?;
        let now = Utc::now();
        let tasks_due_today = due_dates
            .iter()
            .filter(|due| same_utc_day(**due, now))
            .count() as i64;
        Ok(DashboardStats {
            total_leads,
            tasks_due_today,
            total_wins,
        })
    })
    .await?;
    Ok(Json(stats))
}

pub async fn get_performance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MemberPerformance>>, AppError> {
    let lines = run_blocking(&state.conn, move |conn| {
        let members = team_members::table
            .select(TeamMember::as_select())
            .order(team_members::id.asc())
            .load(conn)?;
        let lead_rows: Vec<(i32, String)> = leads::table
            .select((leads::added_by_id, leads::status))
            .load(conn)?;
        let bid_rows: Vec<(i32, String)> = bids::table
            .select((bids::added_by_id, bids::status))
            .load(conn)?;
        let outreach_owners: Vec<i32> = outreach::table.select(outreach::added_by_id).load(conn)?;
        Ok(summarize_performance(
            members,
            &lead_rows,
            &bid_rows,
            &outreach_owners,
        ))
    })
    .await?;
    Ok(Json(lines))
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/performance", get(get_performance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn member(id: i32, name: &str) -> TeamMember {
        TeamMember {
            id,
            name: name.to_string(),
            role: "direct".to_string(),
            target: 5000,
            target_clients: 2,
        }
    }

    #[test]
    fn same_utc_day_ignores_time_of_day() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 3, 1, 22, 30, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 1).unwrap();
        assert!(same_utc_day(morning, evening));
        assert!(!same_utc_day(morning, next_day));
    }

    #[test]
    fn performance_counts_per_owner() {
        let members = vec![member(1, "Ana"), member(2, "Bruno")];
        let lead_rows = vec![
            (1, "New".to_string()),
            (1, "Won".to_string()),
            (2, "Lost".to_string()),
        ];
        let bid_rows = vec![(1, "Hired".to_string()), (2, "Draft".to_string())];
        let outreach_owners = vec![2, 2];

        let lines = summarize_performance(members, &lead_rows, &bid_rows, &outreach_owners);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].lead_count, 2);
        assert_eq!(lines[0].leads_won, 1);
        assert_eq!(lines[0].bids_hired, 1);
        assert_eq!(lines[0].outreach_count, 0);
        assert_eq!(lines[1].outreach_count, 2);
        assert_eq!(lines[1].bids_hired, 0);
    }

    #[test]
    fn rows_for_removed_members_are_dropped() {
        let lines = summarize_performance(
            vec![member(1, "Ana")],
            &[(9, "New".to_string())],
            &[],
            &[9],
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].lead_count, 0);
        assert_eq!(lines[0].outreach_count, 0);
    }

    #[test]
    fn members_without_activity_still_get_a_line() {
        let lines = summarize_performance(vec![member(3, "Caro")], &[], &[], &[]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].member_id, 3);
        assert_eq!(lines[0].lead_count, 0);
    }
}
