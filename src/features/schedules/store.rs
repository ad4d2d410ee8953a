use diesel::prelude::*;
use validator::Validate;

use crate::data::models::{AppError, NewSchedule, Schedule, ScheduleRequest, ScheduleView};
use crate::data::repositories::ScheduleRepository;

fn owned_schedule(
    conn: &mut SqliteConnection,
    user_id: i32,
    schedule_id: i32,
) -> Result<Schedule, AppError> {
    ScheduleRepository::find_owned(conn, user_id, schedule_id)?
        .ok_or(AppError::NotFound("schedule"))
}

fn view(conn: &mut SqliteConnection, schedule: Schedule) -> QueryResult<ScheduleView> {
    let steps = ScheduleRepository::steps(conn, schedule.id)?;
    Ok(ScheduleView::new(schedule, steps))
}

pub struct ScheduleStore<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> ScheduleStore<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub fn create(
        &mut self,
        user_id: i32,
        request: ScheduleRequest,
    ) -> Result<ScheduleView, AppError> {
        request.validate()?;
        request.check_steps()?;

        self.conn.transaction::<_, AppError, _>(|conn| {
            let schedule = ScheduleRepository::create(
                conn,
                &NewSchedule {
                    user_id,
                    name: &request.name,
                    is_default: false,
                },
            )?;
            ScheduleRepository::insert_steps(conn, schedule.id, &request.levels)?;
            Ok(view(conn, schedule)?)
        })
    }

    pub fn list(&mut self, user_id: i32) -> Result<Vec<ScheduleView>, AppError> {
        let schedules = ScheduleRepository::list_for_user(self.conn, user_id)?;
        let mut views = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            views.push(view(self.conn, schedule)?);
        }
        Ok(views)
    }

    /// Renames the schedule and replaces all of its steps.
    pub fn update(
        &mut self,
        user_id: i32,
        schedule_id: i32,
        request: ScheduleRequest,
    ) -> Result<ScheduleView, AppError> {
        request.validate()?;
        request.check_steps()?;

        self.conn.transaction::<_, AppError, _>(|conn| {
            owned_schedule(conn, user_id, schedule_id)?;

            ScheduleRepository::rename(conn, schedule_id, &request.name)?;
            ScheduleRepository::delete_steps(conn, schedule_id)?;
            ScheduleRepository::insert_steps(conn, schedule_id, &request.levels)?;

            let schedule = ScheduleRepository::get(conn, schedule_id)?;
            Ok(view(conn, schedule)?)
        })
    }

    /// Deletes a schedule, first moving its decks onto `replacement_id`.
    ///
    /// The replacement is only required when decks still use the schedule.
    pub fn delete(
        &mut self,
        user_id: i32,
        schedule_id: i32,
        replacement_id: Option<i32>,
    ) -> Result<(), AppError> {
        self.conn.transaction::<_, AppError, _>(|conn| {
            let schedule = owned_schedule(conn, user_id, schedule_id)?;
            if schedule.is_default {
                return Err(AppError::ProtectedResource("default schedule"));
            }

            if let Some(replacement_id) = replacement_id {
                if replacement_id == schedule_id {
                    return Err(AppError::invalid("a schedule cannot replace itself"));
                }
                ScheduleRepository::find_owned(conn, user_id, replacement_id)?
                    .ok_or(AppError::NotFound("replacement schedule"))?;
            }

            let in_use = ScheduleRepository::count_decks_using(conn, schedule_id)?;
            if in_use > 0 {
                let Some(replacement_id) = replacement_id else {
                    return Err(AppError::invalid(format!(
                        "{in_use} decks use this schedule, pass a replacementId"
                    )));
                };
                ScheduleRepository::reassign_decks(conn, schedule_id, replacement_id)?;
                log::info!(
                    "Moved {} decks from schedule {} to {}",
                    in_use,
                    schedule_id,
                    replacement_id
                );
            }

            ScheduleRepository::delete_steps(conn, schedule_id)?;
            ScheduleRepository::delete(conn, schedule_id)?;
            Ok(())
        })
    }
}
