#[cfg(test)]
pub mod test_db {
    use crate::auth::Role;
    use crate::db::{
        CompetitionFields, MemberFields, create_club, create_competition, create_discipline,
        create_martial_art, create_member, create_team, create_user, register_entry,
    };
    use crate::error::AppError;
    use crate::models::CompetitionStatus;
    use chrono::NaiveDate;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Pool, Sqlite};
    use std::collections::HashMap;
    use std::sync::Once;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";

    #[derive(Default)]
    pub struct TestDbBuilder {
        users: Vec<TestUser>,
        martial_arts: Vec<String>,
        clubs: Vec<String>,
        members: Vec<TestMember>,
        competitions: Vec<String>,
        disciplines: Vec<TestDiscipline>,
        entries: Vec<TestEntry>,
        teams: Vec<TestTeam>,
    }

    pub struct TestUser {
        pub username: String,
        pub role: Role,
        pub password: String,
    }

    pub struct TestMember {
        pub first_name: String,
        pub last_name: String,
        pub club: Option<String>,
        pub martial_art: Option<String>,
        pub is_coach: bool,
    }

    pub struct TestDiscipline {
        pub competition: String,
        pub name: String,
        pub is_team_event: bool,
    }

    pub struct TestEntry {
        pub discipline: String,
        pub member: String,
        pub coach: Option<String>,
    }

    pub struct TestTeam {
        pub discipline: String,
        pub name: String,
        pub members: Vec<String>,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        fn user(mut self, username: &str, role: Role) -> Self {
            self.users.push(TestUser {
                username: username.to_string(),
                role,
                password: STANDARD_PASSWORD.to_string(),
            });
            self
        }

        pub fn viewer(self, username: &str) -> Self {
            self.user(username, Role::Viewer)
        }

        pub fn coach(self, username: &str) -> Self {
            self.user(username, Role::Coach)
        }

        pub fn admin(self, username: &str) -> Self {
            self.user(username, Role::Admin)
        }

        pub fn martial_art(mut self, name: &str) -> Self {
            self.martial_arts.push(name.to_string());
            self
        }

        pub fn club(mut self, name: &str) -> Self {
            self.clubs.push(name.to_string());
            self
        }

        /// Members are keyed by "First Last" in the built `TestDb`.
        pub fn member(
            mut self,
            first_name: &str,
            last_name: &str,
            club: Option<&str>,
            martial_art: Option<&str>,
            is_coach: bool,
        ) -> Self {
            self.members.push(TestMember {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                club: club.map(String::from),
                martial_art: martial_art.map(String::from),
                is_coach,
            });
            self
        }

        pub fn competition(mut self, name: &str) -> Self {
            self.competitions.push(name.to_string());
            self
        }

        pub fn discipline(mut self, competition: &str, name: &str, is_team_event: bool) -> Self {
            self.disciplines.push(TestDiscipline {
                competition: competition.to_string(),
                name: name.to_string(),
                is_team_event,
            });
            self
        }

        pub fn entry(mut self, discipline: &str, member: &str, coach: Option<&str>) -> Self {
            self.entries.push(TestEntry {
                discipline: discipline.to_string(),
                member: member.to_string(),
                coach: coach.map(String::from),
            });
            self
        }

        pub fn team(mut self, discipline: &str, name: &str, members: &[&str]) -> Self {
            self.teams.push(TestTeam {
                discipline: discipline.to_string(),
                name: name.to_string(),
                members: members.iter().map(|m| m.to_string()).collect(),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::builder()
                    .parse_filters("debug")
                    .is_test(true)
                    .try_init();
            });

            // Every connection to sqlite::memory: opens its own database.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            let mut db = TestDb {
                pool,
                user_id_map: HashMap::new(),
                martial_art_id_map: HashMap::new(),
                club_id_map: HashMap::new(),
                member_id_map: HashMap::new(),
                competition_id_map: HashMap::new(),
                discipline_id_map: HashMap::new(),
                entry_id_map: HashMap::new(),
                team_id_map: HashMap::new(),
                discipline_competition: HashMap::new(),
            };

            for user in &self.users {
                let id =
                    create_user(&db.pool, &user.username, &user.password, user.role, None).await?;
                db.user_id_map.insert(user.username.clone(), id);
            }

            for name in &self.martial_arts {
                let id = create_martial_art(&db.pool, name, "").await?;
                db.martial_art_id_map.insert(name.clone(), id);
            }

            for name in &self.clubs {
                let id = create_club(&db.pool, name, None).await?;
                db.club_id_map.insert(name.clone(), id);
            }

            for member in &self.members {
                let fields = MemberFields {
                    first_name: &member.first_name,
                    last_name: &member.last_name,
                    club_id: member.club.as_ref().and_then(|c| db.club_id(c)),
                    martial_art_id: member.martial_art.as_ref().and_then(|m| db.martial_art_id(m)),
                    grade: None,
                    date_of_birth: None,
                    is_coach: member.is_coach,
                };
                let id = create_member(&db.pool, &fields).await?;
                db.member_id_map
                    .insert(format!("{} {}", member.first_name, member.last_name), id);
            }

            for (offset, name) in self.competitions.iter().enumerate() {
                let start_date = NaiveDate::from_ymd_opt(2025, 3, 1 + offset as u32)
                    .ok_or_else(|| AppError::Internal("Bad fixture date".to_string()))?;
                let fields = CompetitionFields {
                    name: name.clone(),
                    martial_art_id: None,
                    venue: "Town Hall".to_string(),
                    start_date,
                    end_date: None,
                    status: CompetitionStatus::Upcoming,
                    notes: String::new(),
                };
                let id = create_competition(&db.pool, &fields).await?;
                db.competition_id_map.insert(name.clone(), id);
            }

            for discipline in &self.disciplines {
                let competition_id = db.require(&db.competition_id_map, &discipline.competition)?;
                let id = create_discipline(
                    &db.pool,
                    competition_id,
                    &discipline.name,
                    discipline.is_team_event,
                )
                .await?;
                db.discipline_id_map.insert(discipline.name.clone(), id);
                db.discipline_competition.insert(id, competition_id);
            }

            for entry in &self.entries {
                let discipline_id = db.require(&db.discipline_id_map, &entry.discipline)?;
                let member_id = db.require(&db.member_id_map, &entry.member)?;
                let coach_id = match &entry.coach {
                    Some(coach) => Some(db.require(&db.member_id_map, coach)?),
                    None => None,
                };
                let competition_id = db.discipline_competition[&discipline_id];
                let id =
                    register_entry(&db.pool, competition_id, discipline_id, member_id, coach_id)
                        .await?;
                db.entry_id_map
                    .insert((entry.discipline.clone(), entry.member.clone()), id);
            }

            for team in &self.teams {
                let discipline_id = db.require(&db.discipline_id_map, &team.discipline)?;
                let member_ids = team
                    .members
                    .iter()
                    .map(|m| db.require(&db.member_id_map, m))
                    .collect::<Result<Vec<_>, _>>()?;
                let competition_id = db.discipline_competition[&discipline_id];
                let id =
                    create_team(&db.pool, competition_id, discipline_id, &team.name, &member_ids)
                        .await?;
                db.team_id_map.insert(team.name.clone(), id);
            }

            Ok(db)
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub user_id_map: HashMap<String, i64>,
        pub martial_art_id_map: HashMap<String, i64>,
        pub club_id_map: HashMap<String, i64>,
        pub member_id_map: HashMap<String, i64>,
        pub competition_id_map: HashMap<String, i64>,
        pub discipline_id_map: HashMap<String, i64>,
        pub entry_id_map: HashMap<(String, String), i64>,
        pub team_id_map: HashMap<String, i64>,
        discipline_competition: HashMap<i64, i64>,
    }

    impl TestDb {
        fn require(&self, map: &HashMap<String, i64>, key: &str) -> Result<i64, AppError> {
            map.get(key)
                .copied()
                .ok_or_else(|| AppError::NotFound(format!("No fixture named '{}'", key)))
        }

        pub fn user_id(&self, username: &str) -> Option<i64> {
            self.user_id_map.get(username).copied()
        }

        pub fn martial_art_id(&self, name: &str) -> Option<i64> {
            self.martial_art_id_map.get(name).copied()
        }

        pub fn club_id(&self, name: &str) -> Option<i64> {
            self.club_id_map.get(name).copied()
        }

        pub fn member_id(&self, name: &str) -> Option<i64> {
            self.member_id_map.get(name).copied()
        }

        pub fn competition_id(&self, name: &str) -> Option<i64> {
            self.competition_id_map.get(name).copied()
        }

        pub fn discipline_id(&self, name: &str) -> Option<i64> {
            self.discipline_id_map.get(name).copied()
        }

        pub fn entry_id(&self, discipline: &str, member: &str) -> Option<i64> {
            self.entry_id_map
                .get(&(discipline.to_string(), member.to_string()))
                .copied()
        }

        pub fn team_id(&self, name: &str) -> Option<i64> {
            self.team_id_map.get(name).copied()
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::json;

    use super::test_db::{STANDARD_PASSWORD, TestDb, TestDbBuilder};
    use crate::env::Settings;
    use crate::init_rocket;

    /// One club with a coach and three athletes, entered into an individual
    /// and a team discipline of "Spring Open".
    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .admin("admin_user")
            .coach("coach_user")
            .viewer("viewer_user")
            .martial_art("Judo")
            .club("Northside Judo")
            .club("Harbour Dojo")
            .member("Alice", "Tanaka", Some("Northside Judo"), Some("Judo"), true)
            .member("Ben", "Ortiz", Some("Northside Judo"), Some("Judo"), false)
            .member("Cara", "Lee", Some("Northside Judo"), Some("Judo"), false)
            .member("Dan", "Wu", Some("Harbour Dojo"), Some("Judo"), false)
            .competition("Spring Open")
            .discipline("Spring Open", "U18 -60kg", false)
            .discipline("Spring Open", "Team Kata", true)
            .entry("U18 -60kg", "Ben Ortiz", Some("Alice Tanaka"))
            .entry("U18 -60kg", "Dan Wu", None)
            .team("Team Kata", "Northside A", &["Ben Ortiz", "Cara Lee"])
            .build()
            .await
            .expect("Failed to build standard test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let rocket = init_rocket(test_db.pool.clone(), Settings::default()).await;
        let client = Client::tracked(rocket)
            .await
            .expect("Failed to build rocket client");
        (client, test_db)
    }

    pub async fn login_test_user(client: &Client, username: &str) {
        let response = client
            .post("/api/login")
            .header(ContentType::JSON)
            .body(
                json!({
                    "username": username,
                    "password": STANDARD_PASSWORD,
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response
            .into_json()
            .await
            .expect("Login response should be JSON");
        assert_eq!(body["success"], true, "login failed for {}", username);
    }
}
