#[cfg(test)]
mod tests {
    use crate::db::{
        create_team, delete_team, list_entries, list_teams, register_entries, register_entry,
    };
    use crate::error::AppError;
    use crate::test::test_utils::create_standard_test_db;

    #[rocket::async_test]
    async fn test_registering_twice_keeps_one_entry() {
        let test_db = create_standard_test_db().await;
        let competition_id = test_db.competition_id("Spring Open").unwrap();
        let discipline_id = test_db.discipline_id("U18 -60kg").unwrap();
        let ben = test_db.member_id("Ben Ortiz").unwrap();
        let cara = test_db.member_id("Cara Lee").unwrap();

        let ids = register_entries(
            &test_db.pool,
            competition_id,
            discipline_id,
            &[ben, cara, cara],
            test_db.member_id("Alice Tanaka"),
        )
        .await
        .expect("Failed to register entries");

        assert_eq!(ids.len(), 3);
        assert_eq!(Some(ids[0]), test_db.entry_id("U18 -60kg", "Ben Ortiz"));
        assert_eq!(ids[1], ids[2]);

        let entries = list_entries(&test_db.pool, competition_id).await.unwrap();
        assert_eq!(entries.len(), 3);
        let cara_entry = entries.iter().find(|e| e.member_id == cara).unwrap();
        assert_eq!(cara_entry.coach_name.as_deref(), Some("Alice Tanaka"));
        assert_eq!(cara_entry.club_id, test_db.club_id("Northside Judo"));
    }

    #[rocket::async_test]
    async fn test_coach_must_be_a_coach() {
        let test_db = create_standard_test_db().await;

        let result = register_entries(
            &test_db.pool,
            test_db.competition_id("Spring Open").unwrap(),
            test_db.discipline_id("U18 -60kg").unwrap(),
            &[test_db.member_id("Cara Lee").unwrap()],
            test_db.member_id("Dan Wu"),
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[rocket::async_test]
    async fn test_team_discipline_rejects_individual_entries() {
        let test_db = create_standard_test_db().await;
        let competition_id = test_db.competition_id("Spring Open").unwrap();

        let individual = register_entries(
            &test_db.pool,
            competition_id,
            test_db.discipline_id("Team Kata").unwrap(),
            &[test_db.member_id("Dan Wu").unwrap()],
            None,
        )
        .await;
        assert!(matches!(individual, Err(AppError::Validation(_))));

        let team = create_team(
            &test_db.pool,
            competition_id,
            test_db.discipline_id("U18 -60kg").unwrap(),
            "Wrong Place",
            &[test_db.member_id("Dan Wu").unwrap()],
        )
        .await;
        assert!(matches!(team, Err(AppError::Validation(_))));
    }

    #[rocket::async_test]
    async fn test_team_members_and_delete() {
        let test_db = create_standard_test_db().await;
        let competition_id = test_db.competition_id("Spring Open").unwrap();
        let dan = test_db.member_id("Dan Wu").unwrap();

        let team_id = create_team(
            &test_db.pool,
            competition_id,
            test_db.discipline_id("Team Kata").unwrap(),
            "Mixed B",
            &[dan, dan, test_db.member_id("Alice Tanaka").unwrap()],
        )
        .await
        .expect("Failed to create team");

        let teams = list_teams(&test_db.pool, competition_id).await.unwrap();
        let mixed = teams.iter().find(|t| t.id == team_id).unwrap();
        assert_eq!(mixed.members.len(), 2);

        delete_team(&test_db.pool, team_id).await.unwrap();
        let teams = list_teams(&test_db.pool, competition_id).await.unwrap();
        assert_eq!(teams.len(), 1);
    }

    #[rocket::async_test]
    async fn test_discipline_from_other_competition() {
        let test_db = create_standard_test_db().await;

        let result = register_entries(
            &test_db.pool,
            test_db.competition_id("Spring Open").unwrap() + 100,
            test_db.discipline_id("U18 -60kg").unwrap(),
            &[test_db.member_id("Cara Lee").unwrap()],
            None,
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[rocket::async_test]
    async fn test_unknown_member_registers_nobody() {
        let test_db = create_standard_test_db().await;
        let competition_id = test_db.competition_id("Spring Open").unwrap();

        let result = register_entries(
            &test_db.pool,
            competition_id,
            test_db.discipline_id("U18 -60kg").unwrap(),
            &[test_db.member_id("Cara Lee").unwrap(), 99999],
            None,
        )
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        let entries = list_entries(&test_db.pool, competition_id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.member_name != "Cara Lee"));
    }

    #[rocket::async_test]
    async fn test_single_registration_is_idempotent() {
        let test_db = create_standard_test_db().await;
        let competition_id = test_db.competition_id("Spring Open").unwrap();
        let discipline_id = test_db.discipline_id("U18 -60kg").unwrap();
        let cara = test_db.member_id("Cara Lee").unwrap();

        let first = register_entry(&test_db.pool, competition_id, discipline_id, cara, None)
            .await
            .expect("Failed to register entry");
        let second = register_entry(&test_db.pool, competition_id, discipline_id, cara, None)
            .await
            .expect("Failed to register entry again");

        assert_eq!(first, second);
        let entries = list_entries(&test_db.pool, competition_id).await.unwrap();
        assert_eq!(entries.len(), 3);
    }
}
