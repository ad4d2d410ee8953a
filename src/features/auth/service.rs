use chrono::{Months, NaiveDateTime};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use validator::Validate;

use crate::data::models::{
    AppError, DEFAULT_WORD_SET_NAME, LoginError, LoginForm, NewSchedule, NewUser, NewWordSet,
    PlanStatus, Profile, ProfileResponse, RegisterError, RegisterForm, StepInput, User,
};
use crate::data::repositories::{ScheduleRepository, UserRepository, WordSetRepository};

pub const DEFAULT_SCHEDULE_NAME: &str = "Standard";

/// Intervals of the default schedule, in minutes, for levels 0.. in order.
pub const DEFAULT_SCHEDULE_INTERVALS: [i32; 6] = [480, 1440, 4320, 10080, 20160, 43200];

/// Premium running out later than this is shown as a lifetime plan.
const LIFETIME_THRESHOLD_YEARS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPlan {
    Month,
    Year,
    Lifetime,
}

impl PaymentPlan {
    pub fn parse(plan_id: &str) -> Result<Self, AppError> {
        match plan_id {
            "month" => Ok(PaymentPlan::Month),
            "year" => Ok(PaymentPlan::Year),
            "lifetime" => Ok(PaymentPlan::Lifetime),
            other => Err(AppError::invalid(format!("unknown plan {other:?}"))),
        }
    }

    fn months(self) -> u32 {
        match self {
            PaymentPlan::Month => 1,
            PaymentPlan::Year => 12,
            PaymentPlan::Lifetime => 12 * 1000,
        }
    }
}

/// Creates the user with the default word set and default schedule, atomically.
pub fn provision_account(
    conn: &mut SqliteConnection,
    new_user: &NewUser<'_>,
) -> Result<User, DieselError> {
    conn.transaction(|conn| {
        let user = UserRepository::create_user(conn, new_user)?;

        WordSetRepository::create(
            conn,
            &NewWordSet {
                user_id: user.id,
                name: DEFAULT_WORD_SET_NAME,
                is_public: false,
                is_default: true,
            },
        )?;

        let schedule = ScheduleRepository::create(
            conn,
            &NewSchedule {
                user_id: user.id,
                name: DEFAULT_SCHEDULE_NAME,
                is_default: true,
            },
        )?;
        let steps: Vec<StepInput> = DEFAULT_SCHEDULE_INTERVALS
            .iter()
            .zip(0..)
            .map(|(&interval_minutes, level)| StepInput {
                level,
                interval_minutes,
            })
            .collect();
        ScheduleRepository::insert_steps(conn, schedule.id, &steps)?;

        Ok(user)
    })
}

pub fn register(
    conn: &mut SqliteConnection,
    form: RegisterForm,
    now: NaiveDateTime,
) -> Result<User, RegisterError> {
    let form = form.trimmed();
    form.validate()?;

    if UserRepository::email_exists(conn, &form.email)? {
        log::warn!("Registration attempt with existing email: {}", form.email);
        return Err(RegisterError::EmailTaken);
    }
    if UserRepository::login_exists(conn, &form.login)? {
        log::warn!("Registration attempt with existing login: {}", form.login);
        return Err(RegisterError::LoginTaken);
    }

    let password_hash = UserRepository::hash_password(&form.password)?;
    let user = provision_account(
        conn,
        &NewUser {
            email: &form.email,
            login: &form.login,
            password_hash: &password_hash,
            created_at: now,
        },
    )?;

    log::info!("New user registered: {}", user.email);
    Ok(user)
}

/// Checks the credentials; unknown email and wrong password look the same.
pub fn authenticate(conn: &mut SqliteConnection, form: &LoginForm) -> Result<User, LoginError> {
    let email = form.email.trim();
    let Some(user) = UserRepository::find_by_email(conn, email)? else {
        log::warn!("User not found: {}", email);
        return Err(LoginError::InvalidCredentials);
    };

    if !UserRepository::verify_password(&user.password_hash, form.password.trim())? {
        log::warn!("Invalid password for user: {}", email);
        return Err(LoginError::InvalidCredentials);
    }

    Ok(user)
}

pub fn plan_status(user: &User, now: NaiveDateTime) -> PlanStatus {
    let lifetime_after = now
        .checked_add_months(Months::new(LIFETIME_THRESHOLD_YEARS * 12))
        .unwrap_or(NaiveDateTime::MAX);

    match user.premium_expires_at {
        Some(expires) if expires > lifetime_after => PlanStatus::Lifetime,
        Some(expires) if expires > now => PlanStatus::Premium,
        _ => PlanStatus::Free,
    }
}

fn profile_of(user: User, now: NaiveDateTime) -> Profile {
    let status = plan_status(&user, now);
    Profile {
        id: user.id,
        email: user.email,
        login: user.login,
        premium_expires_at: user.premium_expires_at,
        status,
    }
}

pub fn profile(
    conn: &mut SqliteConnection,
    user_id: i32,
    now: NaiveDateTime,
) -> Result<ProfileResponse, AppError> {
    let user = UserRepository::get_by_id(conn, user_id)?;
    let stats = UserRepository::stats(conn, user_id)?;

    Ok(ProfileResponse {
        user: profile_of(user, now),
        stats,
    })
}

/// Extends premium from the later of now and the current expiry.
pub fn mock_payment(
    conn: &mut SqliteConnection,
    user_id: i32,
    plan_id: &str,
    now: NaiveDateTime,
) -> Result<Profile, AppError> {
    let plan = PaymentPlan::parse(plan_id)?;

    conn.transaction::<_, AppError, _>(|conn| {
        let user = UserRepository::get_by_id(conn, user_id)?;
        let start = user.premium_expires_at.map_or(now, |expires| expires.max(now));
        let expires_at = start
            .checked_add_months(Months::new(plan.months()))
            .unwrap_or(NaiveDateTime::MAX);

        UserRepository::set_premium_expiry(conn, user_id, expires_at)?;
        log::info!("User {} bought plan {:?}, premium until {}", user_id, plan, expires_at);

        let user = UserRepository::get_by_id(conn, user_id)?;
        Ok(profile_of(user, now))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    use crate::data::models::Stats;
    use crate::db::test_connection;
    use crate::features::testing::{at, seed_user};

    #[test]
    fn provisioning_creates_default_set_and_schedule() {
        let mut conn = test_connection();
        let user = seed_user(&mut conn, "ana");

        let set = WordSetRepository::get_default(&mut conn, user.id).unwrap();
        assert_eq!(set.name, DEFAULT_WORD_SET_NAME);
        assert!(!set.is_public);

        let schedules = ScheduleRepository::list_for_user(&mut conn, user.id).unwrap();
        assert_eq!(schedules.len(), 1);
        assert!(schedules[0].is_default);
        let intervals: Vec<i32> = ScheduleRepository::steps(&mut conn, schedules[0].id)
            .unwrap()
            .iter()
            .map(|s| s.interval_minutes)
            .collect();
        assert_eq!(intervals, DEFAULT_SCHEDULE_INTERVALS);
    }

    #[test]
    fn register_then_authenticate() {
        let mut conn = test_connection();
        let form = RegisterForm {
            email: "  bo@example.com ".into(),
            login: "bo_reads".into(),
            password: "correct horse".into(),
        };
        let user = register(&mut conn, form, at("2024-05-01 10:00:00")).unwrap();
        assert_eq!(user.email, "bo@example.com");

        let ok = authenticate(
            &mut conn,
            &LoginForm {
                email: "bo@example.com".into(),
                password: "correct horse".into(),
            },
        )
        .unwrap();
        assert_eq!(ok.id, user.id);

        let wrong = authenticate(
            &mut conn,
            &LoginForm {
                email: "bo@example.com".into(),
                password: "battery staple".into(),
            },
        );
        assert!(matches!(wrong, Err(LoginError::InvalidCredentials)));
    }

    #[test]
    fn duplicate_login_is_rejected_before_hashing() {
        let mut conn = test_connection();
        seed_user(&mut conn, "cy");

        let err = register(
            &mut conn,
            RegisterForm {
                email: "another@example.com".into(),
                login: "cy".into(),
                password: "long enough".into(),
            },
            at("2024-05-01 10:00:00"),
        )
        .unwrap_err();
        assert!(matches!(err, RegisterError::LoginTaken));
    }

    #[test]
    fn losing_a_registration_race_is_a_conflict() {
        let mut conn = test_connection();
        seed_user(&mut conn, "fay");

        // Both pre-checks passed; the insert is what catches the duplicate.
        let same_email = provision_account(
            &mut conn,
            &NewUser {
                email: "fay@example.com",
                login: "fay_two",
                password_hash: "not-a-real-hash",
                created_at: at("2024-05-01 10:00:00"),
            },
        )
        .unwrap_err();
        let err = RegisterError::from(same_email);
        assert!(matches!(err, RegisterError::EmailTaken));
        assert_eq!(err.into_response().status(), axum::http::StatusCode::CONFLICT);

        let same_login = provision_account(
            &mut conn,
            &NewUser {
                email: "fay2@example.com",
                login: "fay",
                password_hash: "not-a-real-hash",
                created_at: at("2024-05-01 10:00:00"),
            },
        )
        .unwrap_err();
        assert!(matches!(RegisterError::from(same_login), RegisterError::LoginTaken));

        assert!(!UserRepository::email_exists(&mut conn, "fay2@example.com").unwrap());
    }

    #[test]
    fn invalid_form_fails_validation() {
        let mut conn = test_connection();
        let err = register(
            &mut conn,
            RegisterForm {
                email: "not-an-email".into(),
                login: "dee".into(),
                password: "short".into(),
            },
            at("2024-05-01 10:00:00"),
        )
        .unwrap_err();
        assert!(matches!(err, RegisterError::ValidationError(_)));
    }

    #[test]
    fn payments_extend_from_later_of_now_and_expiry() {
        let mut conn = test_connection();
        let user = seed_user(&mut conn, "eve");
        let now = at("2024-01-31 08:00:00");

        let first = mock_payment(&mut conn, user.id, "month", now).unwrap();
        assert_eq!(first.premium_expires_at, Some(at("2024-02-29 08:00:00")));
        assert_eq!(first.status, PlanStatus::Premium);

        let second = mock_payment(&mut conn, user.id, "year", now).unwrap();
        assert_eq!(second.premium_expires_at, Some(at("2025-02-28 08:00:00")));

        let lifetime = mock_payment(&mut conn, user.id, "lifetime", now).unwrap();
        assert_eq!(lifetime.status, PlanStatus::Lifetime);

        let err = mock_payment(&mut conn, user.id, "weekly", now).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn expired_premium_is_free() {
        let mut conn = test_connection();
        let user = seed_user(&mut conn, "fay");
        UserRepository::set_premium_expiry(&mut conn, user.id, at("2024-01-01 00:00:00")).unwrap();

        let response = profile(&mut conn, user.id, at("2024-06-01 00:00:00")).unwrap();
        assert_eq!(response.user.status, PlanStatus::Free);
        assert_eq!(response.stats, Stats::default());
    }
}
