#[cfg(test)]
mod tests {
    use crate::db::{
        create_class, create_location, create_martial_art, delete_club, get_club, get_member,
        list_classes, list_locations,
    };
    use crate::error::AppError;
    use crate::test::test_db::TestDbBuilder;

    #[rocket::async_test]
    async fn test_delete_club_removes_locations() {
        let test_db = TestDbBuilder::new()
            .club("Northside Judo")
            .club("Harbour Dojo")
            .member("Ben", "Ortiz", Some("Northside Judo"), None, false)
            .build()
            .await
            .expect("Failed to build test database");
        let pool = &test_db.pool;
        let northside = test_db.club_id("Northside Judo").unwrap();
        let harbour = test_db.club_id("Harbour Dojo").unwrap();

        let hall = create_location(pool, northside, "Main Hall", "1 High St").await.unwrap();
        let annex = create_location(pool, northside, "Annex", "3 High St").await.unwrap();
        let pier = create_location(pool, harbour, "Pier Gym", "Dock 4").await.unwrap();

        let removed = delete_club(pool, northside).await.expect("Failed to delete club");

        assert_eq!(removed, vec![hall, annex]);
        assert!(matches!(get_club(pool, northside).await, Err(AppError::NotFound(_))));
        assert!(list_locations(pool, northside).await.unwrap().is_empty());
        assert_eq!(list_locations(pool, harbour).await.unwrap()[0].id, pier);

        let ben = get_member(pool, test_db.member_id("Ben Ortiz").unwrap())
            .await
            .unwrap();
        assert_eq!(ben.club_id, None, "members outlive their club");
    }

    #[rocket::async_test]
    async fn test_delete_missing_club() {
        let test_db = TestDbBuilder::new()
            .build()
            .await
            .expect("Failed to build test database");

        assert!(matches!(
            delete_club(&test_db.pool, 42).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[rocket::async_test]
    async fn test_classes_lose_deleted_location() {
        let test_db = TestDbBuilder::new()
            .club("Northside Judo")
            .martial_art("Judo")
            .build()
            .await
            .expect("Failed to build test database");
        let pool = &test_db.pool;
        let judo = test_db.martial_art_id("Judo").unwrap();
        let hall = create_location(pool, test_db.club_id("Northside Judo").unwrap(), "Main Hall", "")
            .await
            .unwrap();

        create_class(pool, judo, "Juniors", Some(hall), Some("Tuesday"), Some("17:30"))
            .await
            .unwrap();
        delete_club(pool, test_db.club_id("Northside Judo").unwrap())
            .await
            .unwrap();

        let classes = list_classes(pool, judo).await.unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].location_id, None);
    }

    #[rocket::async_test]
    async fn test_duplicate_martial_art_conflicts() {
        let test_db = TestDbBuilder::new()
            .martial_art("Judo")
            .build()
            .await
            .expect("Failed to build test database");

        assert!(matches!(
            create_martial_art(&test_db.pool, "Judo", "again").await,
            Err(AppError::Conflict(_))
        ));
    }
}
