use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use standup_core::{
    open_db_in_memory, CheckInService, FixedClock, NewPriority, NewUser, PriorityId,
    PriorityPatch, SqliteCheckInRepository, SqlitePriorityRepository, SqliteUserRepository,
    UserId, UserRepository,
};

type Service<'conn> =
    CheckInService<SqliteCheckInRepository<'conn>, SqlitePriorityRepository<'conn>, FixedClock>;

// Friday; the week runs from Monday 2026-10-12.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
}

fn ms(y: i32, m: u32, d: u32, h: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
        .unwrap()
        .timestamp_millis()
}

fn service(conn: &Connection) -> Service<'_> {
    CheckInService::with_clock(
        SqliteCheckInRepository::try_new(conn).unwrap(),
        SqlitePriorityRepository::try_new(conn).unwrap(),
        FixedClock::new(now()),
    )
}

fn add_user(conn: &Connection, name: &str) -> UserId {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(&NewUser::named(name), 0)
        .unwrap()
        .id
}

fn add_priority(
    service: &Service<'_>,
    user_id: UserId,
    created_at: i64,
    completed: bool,
) -> PriorityId {
    let priority = service
        .priorities()
        .create_priority(&NewPriority {
            created_at: Some(created_at),
            ..NewPriority::new(user_id, "task")
        })
        .unwrap();
    if completed {
        service
            .priorities()
            .update_priority(
                priority.id,
                &PriorityPatch {
                    completed_at: Some(Some(created_at + 1)),
                    ..PriorityPatch::default()
                },
            )
            .unwrap();
    }
    priority.id
}

#[test]
fn completion_rate_is_zero_when_nothing_was_created_this_week() {
    let conn = open_db_in_memory().unwrap();
    let user_id = add_user(&conn, "Ada");
    let service = service(&conn);
    add_priority(&service, user_id, ms(2026, 9, 1, 9), true);
    add_priority(&service, user_id, ms(2026, 10, 11, 23), true);

    let stats = service.get_user_stats(user_id).unwrap();
    assert_eq!(stats.this_week_completion_rate, 0);
    assert_eq!(stats.total_completed_tasks, 2);
    assert!(stats.most_deferred_tasks.is_empty());
}

#[test]
fn weekly_rate_includes_both_week_edges() {
    let conn = open_db_in_memory().unwrap();
    let user_id = add_user(&conn, "Ada");
    let service = service(&conn);
    let week_start = ms(2026, 10, 12, 0);
    let week_end = ms(2026, 10, 19, 0) - 1;

    add_priority(&service, user_id, week_start, true);
    add_priority(&service, user_id, ms(2026, 10, 14, 10), true);
    add_priority(&service, user_id, week_end, false);
    add_priority(&service, user_id, week_start - 1, false);
    add_priority(&service, user_id, week_end + 1, false);

    let stats = service.get_user_stats(user_id).unwrap();
    assert_eq!(stats.this_week_completion_rate, 67);
    assert_eq!(stats.total_completed_tasks, 2);
    assert!((1..=7).contains(&stats.current_streak));
}

#[test]
fn most_deferred_lists_top_three_above_two_defers() {
    let conn = open_db_in_memory().unwrap();
    let user_id = add_user(&conn, "Ada");
    let service = service(&conn);

    let mut ids = Vec::new();
    for defers in [3_u32, 5, 1, 4, 2, 3] {
        let id = add_priority(&service, user_id, ms(2026, 10, 13, 9), false);
        for _ in 0..defers {
            service.defer_task(id, ms(2026, 10, 20, 0)).unwrap();
        }
        ids.push(id);
    }

    let stats = service.get_user_stats(user_id).unwrap();
    let ranked = stats
        .most_deferred_tasks
        .iter()
        .map(|priority| (priority.id, priority.defer_count))
        .collect::<Vec<_>>();
    assert_eq!(ranked, vec![(ids[1], 5), (ids[3], 4), (ids[0], 3)]);
}

#[test]
fn weekly_stats_return_four_chronological_buckets() {
    let conn = open_db_in_memory().unwrap();
    let user_id = add_user(&conn, "Ada");
    let other = add_user(&conn, "Grace");
    let service = service(&conn);

    add_priority(&service, user_id, ms(2026, 9, 21, 9), true);
    add_priority(&service, user_id, ms(2026, 9, 22, 9), false);
    add_priority(&service, user_id, ms(2026, 10, 1, 9), true);
    add_priority(&service, user_id, ms(2026, 10, 16, 8), false);
    add_priority(&service, user_id, ms(2026, 9, 14, 9), true);
    add_priority(&service, other, ms(2026, 10, 16, 8), true);

    let weeks = service.get_weekly_stats(user_id).unwrap();
    let starts = weeks.iter().map(|week| week.week_start).collect::<Vec<_>>();
    assert_eq!(
        starts,
        vec![
            ms(2026, 9, 21, 0),
            ms(2026, 9, 28, 0),
            ms(2026, 10, 5, 0),
            ms(2026, 10, 12, 0),
        ]
    );

    let totals = weeks
        .iter()
        .map(|week| (week.total_tasks, week.completed_tasks, week.completion_rate))
        .collect::<Vec<_>>();
    assert_eq!(totals, vec![(2, 1, 50), (1, 1, 100), (0, 0, 0), (1, 0, 0)]);
}

#[test]
fn user_weekly_summary_counts_current_week_only() {
    let conn = open_db_in_memory().unwrap();
    let user_id = add_user(&conn, "Ada");
    let service = service(&conn);
    add_priority(&service, user_id, ms(2026, 10, 13, 9), true);
    add_priority(&service, user_id, ms(2026, 10, 13, 9), true);
    add_priority(&service, user_id, ms(2026, 10, 15, 9), true);
    add_priority(&service, user_id, ms(2026, 10, 16, 9), false);
    add_priority(&service, user_id, ms(2026, 10, 2, 9), false);

    let summary = service.get_user_weekly_summary(user_id).unwrap();
    assert_eq!(summary.user_id, user_id);
    assert_eq!(summary.total_tasks, 4);
    assert_eq!(summary.completed_tasks, 3);
    assert_eq!(summary.completion_rate, 75);
    assert!((1..=7).contains(&summary.streak));
}

#[test]
fn weekly_summary_is_the_fixed_team_summary() {
    let conn = open_db_in_memory().unwrap();
    let summary = service(&conn).get_weekly_summary();

    assert_eq!(summary.completion_rate, 75);
    assert_eq!(summary.total_tasks, 20);
    assert_eq!(summary.completed_tasks, 15);
    assert_eq!(summary.deferred_tasks, 3);
    assert_eq!(
        summary.common_focus,
        vec!["Development", "Meetings", "Planning"]
    );
}

#[test]
fn team_summaries_are_sorted_by_completion_rate() {
    let conn = open_db_in_memory().unwrap();
    let low = add_user(&conn, "Low");
    let high = add_user(&conn, "High");
    let idle = add_user(&conn, "Idle");
    let service = service(&conn);

    add_priority(&service, low, ms(2026, 10, 13, 9), true);
    add_priority(&service, low, ms(2026, 10, 13, 9), false);
    add_priority(&service, high, ms(2026, 10, 14, 9), true);

    let users = SqliteUserRepository::try_new(&conn)
        .unwrap()
        .list_users()
        .unwrap();
    let rows = service.team_weekly_summaries(&users).unwrap();
    let order = rows
        .iter()
        .map(|row| (row.user.id, row.summary.completion_rate))
        .collect::<Vec<_>>();
    assert_eq!(order, vec![(high, 100), (low, 50), (idle, 0)]);
}
