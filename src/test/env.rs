#[cfg(test)]
mod tests {
    use serial_test::serial;

    use crate::env::Settings;

    const KEYS: [&str; 5] = [
        "DATABASE_URL",
        "SESSION_HOURS",
        "SESSION_CLEANUP_SECS",
        "OTEL_SERVICE_ENV",
        "HONEYCOMB_API_KEY",
    ];

    #[test]
    #[serial]
    fn test_settings_from_env() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("sqlite://test.db")),
                ("SESSION_HOURS", Some("2")),
                ("SESSION_CLEANUP_SECS", Some("60")),
                ("OTEL_SERVICE_ENV", Some("staging")),
                ("HONEYCOMB_API_KEY", Some("abc123")),
            ],
            || {
                let settings = Settings::from_env();
                assert_eq!(settings.database_url, "sqlite://test.db");
                assert_eq!(settings.session_hours, 2);
                assert_eq!(settings.session_cleanup_secs, 60);
                assert_eq!(settings.service_env, "staging");
                assert_eq!(settings.honeycomb_api_key.as_deref(), Some("abc123"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_settings_fall_back_to_defaults() {
        temp_env::with_vars_unset(KEYS, || {
            let settings = Settings::from_env();
            assert_eq!(settings.session_hours, 12);
            assert_eq!(settings.session_cleanup_secs, 3600);
            assert_eq!(settings.service_env, "development");
            assert_eq!(settings.honeycomb_api_key, None);
        });
    }

    #[test]
    #[serial]
    fn test_bad_values_use_defaults() {
        temp_env::with_vars(
            [
                ("SESSION_HOURS", Some("twelve")),
                ("HONEYCOMB_API_KEY", Some("   ")),
            ],
            || {
                let settings = Settings::from_env();
                assert_eq!(settings.session_hours, 12);
                assert_eq!(settings.honeycomb_api_key, None);
            },
        );
    }
}
