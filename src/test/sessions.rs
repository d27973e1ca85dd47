#[cfg(test)]
mod tests {
    use crate::{
        db::{
            authenticate_user, clean_expired_sessions, create_user_session, get_session_by_token,
            invalidate_session,
        },
        error::AppError,
        test::test_db::{STANDARD_PASSWORD, TestDbBuilder},
    };
    use chrono::{Duration, NaiveDateTime, Utc};
    use sqlx::{Pool, Sqlite};
    use uuid::Uuid;

    async fn create_test_session() -> (i64, String, NaiveDateTime, Pool<Sqlite>) {
        let test_db = TestDbBuilder::new()
            .viewer("test_session_user")
            .build()
            .await
            .expect("Failed to build test database");

        let user_id = test_db
            .user_id("test_session_user")
            .expect("User not found");

        let token = format!("test_token_{}", Uuid::new_v4());

        let expires_at = (Utc::now() + Duration::hours(1)).naive_utc();

        (user_id, token, expires_at, test_db.pool)
    }

    #[rocket::async_test]
    async fn test_create_and_get_session() {
        let (user_id, token, expires_at, pool) = create_test_session().await;

        let session_id = create_user_session(&pool, user_id, &token, expires_at)
            .await
            .expect("Failed to create session");

        assert!(session_id > 0, "Session ID should be positive");

        let session = get_session_by_token(&pool, &token)
            .await
            .expect("Failed to get session");

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.token, token);
        assert!(session.is_valid());
    }

    #[rocket::async_test]
    async fn test_get_nonexistent_session() {
        let test_db = TestDbBuilder::new()
            .build()
            .await
            .expect("Failed to build test database");

        match get_session_by_token(&test_db.pool, "nonexistent_token").await {
            Err(AppError::Authentication(msg)) => assert_eq!(msg, "Invalid session token"),
            other => panic!("Expected Authentication error, got {:?}", other),
        }
    }

    #[rocket::async_test]
    async fn test_invalidate_session() {
        let (user_id, token, expires_at, pool) = create_test_session().await;

        create_user_session(&pool, user_id, &token, expires_at)
            .await
            .expect("Failed to create session");

        invalidate_session(&pool, &token)
            .await
            .expect("Failed to invalidate session");

        assert!(get_session_by_token(&pool, &token).await.is_err());
    }

    #[rocket::async_test]
    async fn test_clean_expired_sessions() {
        let (user_id, live_token, expires_at, pool) = create_test_session().await;
        let expired_token = format!("test_token_expired_{}", Uuid::new_v4());

        create_user_session(&pool, user_id, &live_token, expires_at)
            .await
            .expect("Failed to create session");
        create_user_session(
            &pool,
            user_id,
            &expired_token,
            (Utc::now() - Duration::hours(1)).naive_utc(),
        )
        .await
        .expect("Failed to create expired session");

        let expired = get_session_by_token(&pool, &expired_token)
            .await
            .expect("Expired session should still be readable before cleanup");
        assert!(!expired.is_valid());

        let cleaned = clean_expired_sessions(&pool)
            .await
            .expect("Failed to clean expired sessions");

        assert_eq!(cleaned, 1, "Should have cleaned exactly 1 expired session");
        assert!(get_session_by_token(&pool, &expired_token).await.is_err());
        assert!(get_session_by_token(&pool, &live_token).await.is_ok());
    }

    #[rocket::async_test]
    async fn test_authenticate_user() {
        let test_db = TestDbBuilder::new()
            .coach("coach_user")
            .build()
            .await
            .expect("Failed to build test database");

        let user = authenticate_user(&test_db.pool, "coach_user", STANDARD_PASSWORD)
            .await
            .expect("Query failed")
            .expect("Correct password should authenticate");
        assert_eq!(Some(user.id), test_db.user_id("coach_user"));

        let rejected = authenticate_user(&test_db.pool, "coach_user", "wrong_password")
            .await
            .expect("Query failed");
        assert!(rejected.is_none());
    }
}
