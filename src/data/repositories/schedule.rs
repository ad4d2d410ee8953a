use diesel::prelude::*;

use crate::data::models::{NewSchedule, NewScheduleStep, Schedule, ScheduleStep, StepInput};
use crate::db::last_insert_id;
use crate::schema::{deck_schedules, decks, schedule_steps};

pub struct ScheduleRepository;

impl ScheduleRepository {
    pub fn create(
        conn: &mut SqliteConnection,
        new_schedule: &NewSchedule<'_>,
    ) -> QueryResult<Schedule> {
        diesel::insert_into(deck_schedules::table)
            .values(new_schedule)
            .execute(conn)?;

        let schedule_id = last_insert_id(conn)?;
        Self::get(conn, schedule_id)
    }

    pub fn insert_steps(
        conn: &mut SqliteConnection,
        schedule_id: i32,
        steps: &[StepInput],
    ) -> QueryResult<usize> {
        if steps.is_empty() {
            return Ok(0);
        }

        let rows: Vec<NewScheduleStep> = steps
            .iter()
            .map(|step| NewScheduleStep {
                deck_schedule_id: schedule_id,
                level: step.level,
                interval_minutes: step.interval_minutes,
            })
            .collect();

        diesel::insert_into(schedule_steps::table)
            .values(&rows)
            .execute(conn)
    }

    pub fn get(conn: &mut SqliteConnection, schedule_id: i32) -> QueryResult<Schedule> {
        deck_schedules::table
            .find(schedule_id)
            .select(Schedule::as_select())
            .first(conn)
    }

    pub fn find_owned(
        conn: &mut SqliteConnection,
        user_id: i32,
        schedule_id: i32,
    ) -> QueryResult<Option<Schedule>> {
        deck_schedules::table
            .filter(deck_schedules::id.eq(schedule_id))
            .filter(deck_schedules::user_id.eq(user_id))
            .select(Schedule::as_select())
            .first(conn)
            .optional()
    }

    pub fn list_for_user(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Vec<Schedule>> {
        deck_schedules::table
            .filter(deck_schedules::user_id.eq(user_id))
            .order(deck_schedules::id.asc())
            .select(Schedule::as_select())
            .load(conn)
    }

    /// Steps of a schedule ordered by level.
    pub fn steps(conn: &mut SqliteConnection, schedule_id: i32) -> QueryResult<Vec<ScheduleStep>> {
        schedule_steps::table
            .filter(schedule_steps::deck_schedule_id.eq(schedule_id))
            .order(schedule_steps::level.asc())
            .select(ScheduleStep::as_select())
            .load(conn)
    }

    pub fn rename(conn: &mut SqliteConnection, schedule_id: i32, name: &str) -> QueryResult<usize> {
        diesel::update(deck_schedules::table.find(schedule_id))
            .set(deck_schedules::name.eq(name))
            .execute(conn)
    }

    pub fn delete_steps(conn: &mut SqliteConnection, schedule_id: i32) -> QueryResult<usize> {
        diesel::delete(
            schedule_steps::table.filter(schedule_steps::deck_schedule_id.eq(schedule_id)),
        )
        .execute(conn)
    }

    /// Points every deck using `from` at `to`.
    pub fn reassign_decks(conn: &mut SqliteConnection, from: i32, to: i32) -> QueryResult<usize> {
        diesel::update(decks::table.filter(decks::schedule_id.eq(from)))
            .set(decks::schedule_id.eq(to))
            .execute(conn)
    }

    pub fn count_decks_using(conn: &mut SqliteConnection, schedule_id: i32) -> QueryResult<i64> {
        decks::table
            .filter(decks::schedule_id.eq(schedule_id))
            .count()
            .get_result(conn)
    }

    pub fn delete(conn: &mut SqliteConnection, schedule_id: i32) -> QueryResult<usize> {
        diesel::delete(deck_schedules::table.find(schedule_id)).execute(conn)
    }
}
