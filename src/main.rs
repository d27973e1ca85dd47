#[macro_use]
extern crate rocket;

mod analytics;
mod api;
mod auth;
mod db;
mod env;
mod error;
mod models;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;
mod wizard;

use api::{
    api_advance_wizard, api_archive_member, api_commit_result, api_competition_analytics,
    api_competition_overview, api_create_class, api_create_club, api_create_competition,
    api_create_discipline, api_create_location, api_create_martial_art, api_create_member,
    api_create_team, api_delete_bout, api_delete_class, api_delete_club, api_delete_competition,
    api_delete_discipline, api_delete_entry, api_delete_location, api_delete_martial_art,
    api_delete_result, api_delete_team, api_get_all_users, api_get_club, api_get_competition,
    api_get_member, api_list_classes, api_list_clubs, api_list_competitions,
    api_list_disciplines, api_list_locations, api_list_martial_arts, api_list_members, api_login,
    api_logout, api_me, api_member_analytics, api_register_entries, api_register_user,
    api_update_club, api_update_competition, api_update_martial_art, api_update_member, health,
};
use auth::{forbidden_api, unauthorized_api};
use db::clean_expired_sessions;
use env::{Settings, load_environment};
use rocket::{Build, Rocket, tokio};
use sqlx::SqlitePool;
use telemetry::{TelemetryFairing, init_tracing};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

async fn connect_database(settings: &Settings) -> Result<SqlitePool, Error> {
    let pool = SqlitePool::connect(&settings.database_url).await?;

    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations completed successfully");

    Ok(pool)
}

fn spawn_session_cleanup(pool: SqlitePool, interval_secs: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

        loop {
            match clean_expired_sessions(&pool).await {
                Ok(count) if count > 0 => info!("Cleaned up {} expired sessions", count),
                Ok(_) => {}
                Err(e) => error!("Failed to clean expired sessions: {}", e),
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(interval_secs)).await;
        }
    });
}

#[launch]
async fn rocket() -> _ {
    if let Err(e) = load_environment() {
        eprintln!("Failed to load environment files: {}", e);
    }

    let settings = Settings::from_env();
    let otel_guard = init_tracing(&settings);

    let pool = match connect_database(&settings).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Database setup failed: {}", e);
            std::process::exit(1);
        }
    };

    spawn_session_cleanup(pool.clone(), settings.session_cleanup_secs);

    init_rocket(pool, settings).await.manage(otel_guard)
}

pub async fn init_rocket(pool: SqlitePool, settings: Settings) -> Rocket<Build> {
    info!(environment = %settings.service_env, "Starting club console");

    rocket::build()
        .manage(pool)
        .manage(settings)
        .mount(
            "/api",
            routes![
                health,
                api_login,
                api_logout,
                api_me,
                api_register_user,
                api_get_all_users,
                api_list_clubs,
                api_get_club,
                api_create_club,
                api_update_club,
                api_delete_club,
                api_list_locations,
                api_create_location,
                api_delete_location,
                api_list_martial_arts,
                api_create_martial_art,
                api_update_martial_art,
                api_delete_martial_art,
                api_list_classes,
                api_create_class,
                api_delete_class,
                api_list_members,
                api_get_member,
                api_create_member,
                api_update_member,
                api_archive_member,
                api_list_competitions,
                api_get_competition,
                api_create_competition,
                api_update_competition,
                api_delete_competition,
                api_competition_overview,
                api_list_disciplines,
                api_create_discipline,
                api_delete_discipline,
                api_register_entries,
                api_delete_entry,
                api_create_team,
                api_delete_team,
                api_advance_wizard,
                api_commit_result,
                api_delete_bout,
                api_delete_result,
                api_member_analytics,
                api_competition_analytics,
            ],
        )
        .register("/api", catchers![unauthorized_api, forbidden_api])
        .attach(TelemetryFairing)
}
