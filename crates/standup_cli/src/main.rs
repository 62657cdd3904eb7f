//! CLI report entry point.
//!
//! # Responsibility
//! - Open a seeded in-memory store and print today's standup board.
//! - Keep output line-oriented for quick local sanity checks.

use standup_core::{
    core_version, open_seeded_db, CheckInService, SqliteCheckInRepository,
    SqlitePriorityRepository, SqliteUserRepository, StandupConfig, UserService,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("standup: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = StandupConfig::from_env();
    config.init_logging()?;

    println!("standup_core version={}", core_version());

    let conn = open_seeded_db(&config.seed_source())?;
    let users = UserService::new(SqliteUserRepository::try_new(&conn)?);
    let check_ins = CheckInService::new(
        SqliteCheckInRepository::try_new(&conn)?,
        SqlitePriorityRepository::try_new(&conn)?,
    );

    let team = users.list_users()?;
    let Some(current) = users.current_user()? else {
        println!("no users seeded");
        return Ok(());
    };

    println!("current user: {} ({})", current.name, current.handle);
    match check_ins.get_todays_check_in(current.id)? {
        Some(check_in) => {
            println!(
                "today: {} priorities, {}% done",
                check_in.priorities.len(),
                check_in.completion_rate()
            );
            for priority in &check_in.priorities {
                let mark = if priority.is_completed() { "x" } else { " " };
                let category = priority
                    .category
                    .map_or_else(String::new, |category| format!(" [{category}]"));
                println!("  [{mark}] {}{category}", priority.text);
            }
        }
        None => println!("today: no check-in yet"),
    }

    let stats = check_ins.get_user_stats(current.id)?;
    println!(
        "this week: {}% complete, {} completed overall, {} most-deferred",
        stats.this_week_completion_rate,
        stats.total_completed_tasks,
        stats.most_deferred_tasks.len()
    );

    println!("team this week:");
    for row in check_ins.team_weekly_summaries(&team)? {
        println!(
            "  {:<20} {:>3}% ({}/{})",
            row.user.name,
            row.summary.completion_rate,
            row.summary.completed_tasks,
            row.summary.total_tasks
        );
    }

    let checked_in = check_ins.get_todays_check_ins()?.len();
    println!("checked in today: {checked_in}/{}", team.len());

    Ok(())
}
