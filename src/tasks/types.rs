//! Types for the tasks module

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::shared::schema::tasks;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i32,
    pub name: String,
    pub added_by_id: i32,
    pub due_date: DateTime<Utc>,
    pub completed: bool,
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = tasks)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    pub added_by_id: i32,
    pub due_date: DateTime<Utc>,
    // None falls through to the column default (false).
    #[serde(default)]
    pub completed: Option<bool>,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Task name is required".to_string()));
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
#[diesel(table_name = tasks)]
#[serde(rename_all = "camelCase")]
pub struct TaskChanges {
    pub name: Option<String>,
    pub added_by_id: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.added_by_id.is_none()
            && self.due_date.is_none()
            && self.completed.is_none()
    }
}
