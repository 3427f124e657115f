use rust_decimal::Decimal;
use std::{collections::HashMap, sync::LazyLock};
use time::macros::{date, datetime};
use tokio::sync::Mutex;
use uuid::Uuid;
use verbatim::{Executor, Value, ZERO_TIMESTAMP, params};

pub async fn payments<E: Executor>(executor: &mut E) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    // Setup
    executor
        .exec("drop table if exists verbatim_payment", params![])
        .await
        .expect("Failed to drop the verbatim_payment table");
    executor
        .exec(
            "create table verbatim_payment (
                id uuid primary key,
                amount numeric(10, 2) not null,
                paid_on date not null,
                created timestamp not null,
                note text
            )",
            params![],
        )
        .await
        .expect("Failed to create the verbatim_payment table");

    let id = Uuid::new_v4();
    let result = executor
        .exec(
            "insert into verbatim_payment (id, amount, paid_on, created, note) \
            values (:id, :amount, :paid_on, :created, :note)",
            params![HashMap::from([
                ("id", Value::from(id)),
                ("amount", Value::from(Decimal::new(1999, 2))),
                ("paid_on", Value::from(date!(2025 - 06 - 30))),
                ("created", Value::from(datetime!(2025-06-30 12:15:00))),
                ("note", Value::Varchar(None)),
            ])],
        )
        .await
        .expect("Failed to insert a payment");
    assert_eq!(result.rows_affected, 1);

    // The zero timestamp drops the filter
    let row = executor
        .get(
            "select id, amount, paid_on, created, note from verbatim_payment \
            where id = :id {{:since and created > :since}}",
            params![HashMap::from([
                ("id", Value::from(id)),
                ("since", Value::from(ZERO_TIMESTAMP)),
            ])],
        )
        .await
        .expect("Failed to get the payment")
        .expect("The payment is missing");
    assert_eq!(row.get::<Uuid>("id").unwrap(), id);
    assert_eq!(row.get::<Decimal>("amount").unwrap(), Decimal::new(1999, 2));
    assert_eq!(row.get::<time::Date>("paid_on").unwrap(), date!(2025 - 06 - 30));
    assert_eq!(
        row.get::<time::PrimitiveDateTime>("created").unwrap(),
        datetime!(2025-06-30 12:15:00)
    );
    assert_eq!(row.get::<Option<String>>("note").unwrap(), None);

    let row = executor
        .get(
            "select id from verbatim_payment where id = :id {{:since and created > :since}}",
            params![HashMap::from([
                ("id", Value::from(id)),
                ("since", Value::from(datetime!(2026-01-01 0:00))),
            ])],
        )
        .await
        .expect("Failed to filter the payments");
    assert!(row.is_none());
}
