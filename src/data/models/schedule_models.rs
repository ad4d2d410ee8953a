use std::collections::HashSet;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::data::models::AppError;
use crate::schema::{deck_schedules, schedule_steps};

/// Named interval schedule. Steps live in `schedule_steps`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = deck_schedules)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Schedule {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub is_default: bool,
}

#[derive(Insertable)]
#[diesel(table_name = deck_schedules)]
pub struct NewSchedule<'a> {
    pub user_id: i32,
    pub name: &'a str,
    pub is_default: bool,
}

/// One `level -> interval` step of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = schedule_steps)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ScheduleStep {
    pub level: i32,
    pub interval_minutes: i32,
}

#[derive(Insertable)]
#[diesel(table_name = schedule_steps)]
pub struct NewScheduleStep {
    pub deck_schedule_id: i32,
    pub level: i32,
    pub interval_minutes: i32,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInput {
    pub level: i32,
    pub interval_minutes: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleRequest {
    #[validate(length(min = 1, max = 100, message = "Schedule name must be 1 to 100 characters"))]
    pub name: String,
    #[serde(default)]
    pub levels: Vec<StepInput>,
}

impl ScheduleRequest {
    /// Levels must be unique and non-negative, intervals positive.
    pub fn check_steps(&self) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        for step in &self.levels {
            if step.level < 0 {
                return Err(AppError::invalid(format!("level {} is negative", step.level)));
            }
            if step.interval_minutes <= 0 {
                return Err(AppError::invalid(format!(
                    "interval for level {} must be positive",
                    step.level
                )));
            }
            if !seen.insert(step.level) {
                return Err(AppError::invalid(format!("level {} is repeated", step.level)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub id: i32,
    pub name: String,
    pub is_default: bool,
    pub levels: Vec<StepInput>,
}

impl ScheduleView {
    pub fn new(schedule: Schedule, steps: Vec<ScheduleStep>) -> Self {
        Self {
            id: schedule.id,
            name: schedule.name,
            is_default: schedule.is_default,
            levels: steps
                .into_iter()
                .map(|s| StepInput {
                    level: s.level,
                    interval_minutes: s.interval_minutes,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteScheduleQuery {
    pub replacement_id: Option<i32>,
}
