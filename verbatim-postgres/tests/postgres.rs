#[cfg(test)]
mod tests {
    use std::{env, sync::Mutex};
    use verbatim_core::{Dialect, DialectRegistry, Executor};
    use verbatim_postgres::{PostgresConnection, PostgresDriver};
    use verbatim_tests::{execute_tests, init_logs, silent_logs};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn postgres() {
        init_logs();
        let Ok(url) = env::var("VERBATIM_POSTGRES_URL") else {
            log::warn!("VERBATIM_POSTGRES_URL is not set, skipping the Postgres tests");
            return;
        };
        let _guard = MUTEX.lock().unwrap();
        let error_msg = format!("Could not connect to `{url}`");
        let connection = PostgresConnection::connect(url.into())
            .await
            .expect(&error_msg);
        assert_eq!(connection.dialect(), Dialect::PostgreSQL);
        execute_tests(connection).await;
    }

    #[tokio::test]
    async fn wrong_url() {
        silent_logs! {
            assert!(
                PostgresConnection::connect("mysql://some_url".into())
                    .await
                    .is_err()
            );
        }
    }

    #[test]
    fn driver_registry() {
        let mut registry = DialectRegistry::empty();
        assert!(registry.from_url("postgres://localhost/db").is_err());
        PostgresDriver::new().register(&mut registry);
        assert_eq!(
            registry.from_url("postgres://localhost/db").unwrap(),
            Dialect::PostgreSQL
        );
        assert_eq!(registry.resolve("PostgreSQL").unwrap(), Dialect::PostgreSQL);
    }
}
