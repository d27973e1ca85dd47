#[cfg(test)]
mod tests {
    use crate::analytics::{
        MedalTally, ResultsLedger, competition_summary, filter_by_discipline, member_records,
    };
    use crate::db::{
        MemberFilter, get_competition_overview, list_members, load_results_ledger, record_result,
    };
    use crate::models::{BoutResult, Medal};
    use crate::test::test_db::{TestDb, TestDbBuilder};
    use crate::test::test_utils::create_standard_test_db;
    use crate::wizard::{Competitor, ResultSubmission};

    fn submission(
        discipline_id: i64,
        competitor: Competitor,
        result: BoutResult,
        medal: Option<Medal>,
    ) -> ResultSubmission {
        ResultSubmission {
            discipline_id,
            competitor,
            coach_id: None,
            result,
            score_for: 0,
            score_against: 0,
            round: None,
            is_final: medal.is_some(),
            medal,
            round_reached: None,
        }
    }

    /// Ben wins gold individually, Dan loses twice, and the Northside team
    /// takes silver.
    async fn seeded() -> TestDb {
        let test_db = create_standard_test_db().await;
        let competition_id = test_db.competition_id("Spring Open").unwrap();
        let individual = test_db.discipline_id("U18 -60kg").unwrap();
        let team = test_db.discipline_id("Team Kata").unwrap();
        let ben = Competitor::Entry(test_db.entry_id("U18 -60kg", "Ben Ortiz").unwrap());
        let dan = Competitor::Entry(test_db.entry_id("U18 -60kg", "Dan Wu").unwrap());
        let northside = Competitor::Team(test_db.team_id("Northside A").unwrap());

        for s in [
            submission(individual, ben, BoutResult::Win, None),
            submission(individual, ben, BoutResult::Win, Some(Medal::Gold)),
            submission(individual, dan, BoutResult::Loss, None),
            submission(individual, dan, BoutResult::Loss, None),
            submission(team, northside, BoutResult::Loss, Some(Medal::Silver)),
        ] {
            record_result(&test_db.pool, competition_id, &s)
                .await
                .expect("Failed to record result");
        }

        test_db
    }

    #[rocket::async_test]
    async fn test_empty_competition_summary() {
        let test_db = TestDbBuilder::new()
            .competition("Quiet Cup")
            .build()
            .await
            .expect("Failed to build test database");
        let overview = get_competition_overview(
            &test_db.pool,
            test_db.competition_id("Quiet Cup").unwrap(),
        )
        .await
        .unwrap();

        let summary = competition_summary(&overview);

        assert_eq!(summary.bouts, 0);
        assert_eq!(summary.medals, MedalTally::default());
        assert!(summary.clubs.is_empty());
    }

    #[rocket::async_test]
    async fn test_competition_summary_counts_team_once() {
        let test_db = seeded().await;
        let overview = get_competition_overview(
            &test_db.pool,
            test_db.competition_id("Spring Open").unwrap(),
        )
        .await
        .unwrap();

        let summary = competition_summary(&overview);

        assert_eq!(summary.bouts, 5);
        assert_eq!(summary.wins, 2);
        assert_eq!(summary.losses, 3);
        assert_eq!(
            summary.medals,
            MedalTally {
                gold: 1,
                silver: 1,
                bronze: 0
            }
        );

        let northside = test_db.club_id("Northside Judo");
        assert_eq!(summary.clubs.len(), 1);
        assert_eq!(summary.clubs[0].club_id, northside);
        assert_eq!(summary.clubs[0].tally.total(), 2);
    }

    #[rocket::async_test]
    async fn test_discipline_filter_narrows_overview() {
        let test_db = seeded().await;
        let overview = get_competition_overview(
            &test_db.pool,
            test_db.competition_id("Spring Open").unwrap(),
        )
        .await
        .unwrap();
        let team = test_db.discipline_id("Team Kata").unwrap();

        let filtered = filter_by_discipline(&overview, team);

        assert_eq!(filtered.disciplines.len(), 2);
        assert!(filtered.entries.is_empty());
        assert_eq!(filtered.teams.len(), 1);
        assert_eq!(filtered.bouts.len(), 1);
        assert_eq!(filtered.results.len(), 1);
        assert_eq!(competition_summary(&filtered).medals.silver, 1);
    }

    #[rocket::async_test]
    async fn test_member_records() {
        let test_db = seeded().await;
        let members = list_members(&test_db.pool, &MemberFilter::default())
            .await
            .unwrap();
        let ledger = load_results_ledger(&test_db.pool).await.unwrap();

        let records = member_records(&members, &ledger);
        let record = |name: &str| {
            let id = test_db.member_id(name).unwrap();
            records.iter().find(|r| r.member_id == id).unwrap().clone()
        };

        let ben = record("Ben Ortiz");
        assert_eq!((ben.bouts, ben.wins, ben.losses), (3, 2, 1));
        assert_eq!(ben.win_rate, 66.7);
        assert_eq!(ben.medals.gold, 1);
        assert_eq!(ben.medals.silver, 1);

        let cara = record("Cara Lee");
        assert_eq!((cara.bouts, cara.wins), (1, 0));
        assert_eq!(cara.medals.silver, 1);

        let dan = record("Dan Wu");
        assert_eq!(dan.win_rate, 0.0);
        assert_eq!(dan.medals.total(), 0);

        let alice = record("Alice Tanaka");
        assert_eq!(alice.bouts, 0);
    }

    #[test]
    fn test_empty_ledger_has_no_records_to_count() {
        let records = member_records(&[], &ResultsLedger::default());
        assert!(records.is_empty());
    }
}
