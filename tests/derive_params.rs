#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rust_decimal::Decimal;
    use std::borrow::Cow;
    use time::macros::date;
    use uuid::Uuid;
    use verbatim::{AsValue, Dialect, Params, Value, normalize, params, prepare};

    #[derive(Params, Clone)]
    struct Invoice {
        id: Uuid,
        customer: String,
        #[param_name("total")]
        amount: Decimal,
        issued: time::Date,
        paid: Option<bool>,
        #[param_skip]
        #[allow(dead_code)]
        cache: Vec<u8>,
        r#type: &'static str,
    }

    #[derive(Params)]
    struct Range<T: AsValue + Clone> {
        low: T,
        high: T,
    }

    fn invoice() -> Invoice {
        Invoice {
            id: Uuid::nil(),
            customer: "ACME".into(),
            amount: Decimal::new(1250, 2),
            issued: date!(2025 - 03 - 01),
            paid: None,
            cache: vec![1, 2, 3],
            r#type: "standard",
        }
    }

    #[test]
    fn labels() {
        let labeled = invoice().labeled();
        let names = labeled.iter().map(|(k, _)| k.as_ref()).collect::<Vec<_>>();
        assert_eq!(names, ["id", "customer", "total", "issued", "paid", "type"]);
        assert!(labeled.iter().all(|(k, _)| matches!(k, Cow::Borrowed(..))));
        assert_eq!(labeled[1].1, Value::from("ACME"));
        assert_eq!(labeled[2].1, Value::Decimal(Some(Decimal::new(1250, 2))));
        assert_eq!(labeled[4].1, Value::Boolean(None));
    }

    #[test]
    fn record_binding() {
        let invoice = invoice();
        let prepared = prepare(
            Dialect::PostgreSQL,
            indoc! {"
                insert into invoice (id, customer, total, issued, paid, type)
                values (:id, :customer, :total, :issued, :paid, :type)
            "},
            params![&invoice],
        )
        .unwrap();
        assert_eq!(
            prepared.sql,
            indoc! {"
                insert into invoice (id, customer, total, issued, paid, type)
                values ($1, $2, $3, $4, $5, $6)
            "}
        );
        assert_eq!(prepared.args.len(), 6);
        assert_eq!(prepared.args[0], Value::Uuid(Some(Uuid::nil())));
        assert_eq!(prepared.args[3], Value::from(date!(2025 - 03 - 01)));

        let prepared = prepare(
            Dialect::SQLite,
            "update invoice set paid = true where id = :id {{:paid! and not paid}}",
            params![invoice],
        )
        .unwrap();
        assert_eq!(
            prepared.sql,
            "update invoice set paid = true where id = ? and not paid"
        );
    }

    #[test]
    fn skipped_fields_are_unknown() {
        let error = prepare(
            Dialect::MySQL,
            "select :cache",
            params![&invoice()],
        )
        .unwrap_err();
        assert!(format!("{:#}", error).contains("cache"));
    }

    #[test]
    fn generic_record() {
        let range = Range { low: 10, high: 20 };
        let prepared = prepare(
            Dialect::DuckDB,
            "select * from t where v between :low and :high",
            params![&range],
        )
        .unwrap();
        assert_eq!(prepared.sql, "select * from t where v between $1 and $2");
        assert_eq!(prepared.args, [Value::from(10), Value::from(20)]);

        let dates = Range {
            low: date!(2024 - 01 - 01),
            high: date!(2024 - 12 - 31),
        };
        assert_eq!(dates.labeled()[1].1, Value::from(date!(2024 - 12 - 31)));
    }

    #[test]
    fn records_merge() {
        let range = Range { low: 1i64, high: 2i64 };
        let normalized = normalize(params![
            &invoice(),
            &range,
            std::collections::HashMap::from([("extra", 3)]),
        ])
        .unwrap();
        assert!(normalized.arguments.is_named());

        let error = normalize(params![&range, &range]).unwrap_err();
        assert_eq!(error.to_string(), "Parameter given more than once: `low`");
        let error = normalize(params![1, &range]).unwrap_err();
        assert_eq!(error.to_string(), "Cannot mix named and positional parameters");
    }
}
