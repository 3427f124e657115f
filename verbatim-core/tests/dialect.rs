#[cfg(test)]
mod tests {
    use verbatim_core::{
        Dialect, DialectRegistry, PlaceholderStyle, Value, bind_positional, encode_json_array,
        expand_lists, rebind,
    };
    use time::macros::{date, datetime};
    use uuid::Uuid;

    const DIALECTS: [Dialect; 5] = [
        Dialect::SQLite,
        Dialect::PostgreSQL,
        Dialect::MariaDB,
        Dialect::MySQL,
        Dialect::DuckDB,
    ];

    #[test]
    fn placeholders() {
        for dialect in DIALECTS {
            let statement = bind_positional(
                "select ? from t where a in (?) and b = '?'",
                vec![1.into(), vec![2, 3].into()],
            )
            .unwrap();
            let prepared = rebind(dialect, expand_lists(statement).unwrap()).unwrap();
            let expected = match dialect.placeholder_style() {
                PlaceholderStyle::Question => "select ? from t where a in (?, ?) and b = '?'",
                PlaceholderStyle::Dollar => "select $1 from t where a in ($2, $3) and b = '?'",
            };
            assert_eq!(prepared.sql, expected, "{:?}", dialect);
            assert_eq!(prepared.args, [Value::from(1), Value::from(2), Value::from(3)]);
        }
    }

    #[test]
    fn properties() {
        assert_eq!(Dialect::SQLite.max_parameters(), 32766);
        assert_eq!(Dialect::PostgreSQL.max_parameters(), 65535);
        assert!(Dialect::PostgreSQL.supports_arrays());
        assert!(!Dialect::SQLite.supports_arrays());
        assert!(!Dialect::DuckDB.supports_arrays());
        assert!(!Dialect::MySQL.supports_returning());
        assert!(Dialect::MariaDB.supports_returning());
        assert_eq!(Dialect::SQLite.explain_prefix(), "EXPLAIN QUERY PLAN ");
        assert_eq!(Dialect::MySQL.explain_prefix(), "EXPLAIN ");
    }

    #[test]
    fn quoting() {
        let mut out = String::new();
        Dialect::PostgreSQL.write_table_quoted(&mut out, "my schema.ta\"ble");
        assert_eq!(out, r#""my schema"."ta""ble""#);
        let mut out = String::new();
        Dialect::MySQL.write_identifier_quoted(&mut out, "we`ird");
        assert_eq!(out, "`we``ird`");
        let mut out = String::new();
        Dialect::SQLite.write_table_quoted(&mut out, "tbl");
        assert_eq!(out, "\"tbl\"");
    }

    #[test]
    fn sqlite_booleans() {
        assert_eq!(
            Dialect::SQLite.encode_value(Value::from(true)).unwrap(),
            Value::Int64(Some(1))
        );
        assert_eq!(
            Dialect::SQLite.encode_value(Value::Boolean(None)).unwrap(),
            Value::Int64(None)
        );
        assert_eq!(
            Dialect::PostgreSQL.encode_value(Value::from(true)).unwrap(),
            Value::from(true)
        );
    }

    #[test]
    fn arrays() {
        let array = Value::Array(
            Some(
                vec![
                    Value::from(1),
                    Value::Int32(None),
                    Value::from("a\"b"),
                    Value::from(true),
                    Value::Blob(Some(Box::new([0xde, 0xad]))),
                ]
                .into(),
            ),
            Box::new(Value::Null),
        );
        assert_eq!(
            Dialect::PostgreSQL.encode_value(array.clone()).unwrap(),
            array
        );
        assert_eq!(
            Dialect::DuckDB.encode_value(array).unwrap(),
            Value::from(r#"[1,null,"a\"b",true,"dead"]"#)
        );
        assert_eq!(
            Dialect::MariaDB
                .encode_value(Value::Array(None, Box::new(Value::Int32(None))))
                .unwrap(),
            Value::Varchar(None)
        );
    }

    #[test]
    fn json_arrays() {
        assert_eq!(
            encode_json_array(&[
                Value::from(date!(2024 - 01 - 31)),
                Value::from(datetime!(2024-01-31 08:30:00)),
                Value::from(Uuid::nil()),
                Value::from(vec![1.5, 2.0]),
            ])
            .unwrap(),
            r#"["2024-01-31","2024-01-31 08:30:00.0","00000000-0000-0000-0000-000000000000",[1.5,2.0]]"#
        );
        assert!(encode_json_array(&[Value::from(f64::NAN)]).is_err());
    }

    #[test]
    fn registry() {
        let registry = DialectRegistry::default();
        assert_eq!(registry.resolve("postgres").unwrap(), Dialect::PostgreSQL);
        assert_eq!(registry.resolve("SQLite3").unwrap(), Dialect::SQLite);
        assert_eq!(
            registry.from_url("mysql://root@localhost/db").unwrap(),
            Dialect::MySQL
        );
        assert_eq!(
            registry.from_url("duckdb://:memory:").unwrap(),
            Dialect::DuckDB
        );
        assert_eq!(registry.from_url("sqlite:data.db").unwrap(), Dialect::SQLite);
        let error = registry.resolve("oracle").unwrap_err();
        assert!(error.to_string().starts_with("Unknown driver `oracle`"));
        assert!(registry.from_url("no scheme").is_err());
    }

    #[test]
    fn registry_is_explicit() {
        let mut registry = DialectRegistry::empty();
        assert!(registry.resolve("postgres").is_err());
        registry
            .register("cockroach", Dialect::PostgreSQL)
            .register("Turso", Dialect::SQLite);
        assert_eq!(registry.resolve("cockroach").unwrap(), Dialect::PostgreSQL);
        assert_eq!(registry.resolve("turso").unwrap(), Dialect::SQLite);
        registry.register("turso", Dialect::DuckDB);
        assert_eq!(registry.resolve("turso").unwrap(), Dialect::DuckDB);
    }
}
