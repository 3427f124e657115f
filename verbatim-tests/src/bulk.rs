use std::sync::LazyLock;
use tokio::sync::Mutex;
#[cfg(not(feature = "disable-arrays"))]
use verbatim::encode_array;
use verbatim::{BulkInsert, Executor, Value, params};

pub async fn bulk<E: Executor>(executor: &mut E) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    // Setup
    executor
        .exec("drop table if exists verbatim_reading", params![])
        .await
        .expect("Failed to drop the verbatim_reading table");
    executor
        .exec(
            "create table verbatim_reading (id integer, reader varchar(50), pages integer)",
            params![],
        )
        .await
        .expect("Failed to create the verbatim_reading table");

    // Batches
    let insert = BulkInsert::new(&mut *executor, "verbatim_reading", ["id", "reader", "pages"])
        .await
        .expect("Failed to start the bulk insert")
        .limit(1000);
    for i in 0..2500 {
        insert
            .values([
                Value::from(i),
                Value::from(format!("reader {}", i % 7)),
                Value::from(i * 3),
            ])
            .await;
    }
    insert
        .values([Value::from(9999), Value::from("short")])
        .await;
    let error = insert
        .finish()
        .await
        .expect_err("The short row must be reported");
    let message = format!("{:#}", error);
    assert!(message.starts_with("1 error:"), "{}", message);
    assert!(message.contains("Row 2501 has 2 values but 3 columns were declared"));
    assert_eq!(insert.flushes().await, 3);
    assert_eq!(insert.rows_inserted().await, 2500);
    drop(insert);
    let count = executor
        .get("select count(*) as n from verbatim_reading", params![])
        .await
        .expect("Failed to count the rows")
        .expect("Count returned no row")
        .get::<i64>("n")
        .expect("Count is not an integer");
    assert_eq!(count, 2500);

    // Nulls
    let insert = BulkInsert::new(&mut *executor, "verbatim_reading", ["id", "reader", "pages"])
        .await
        .expect("Failed to start the bulk insert");
    insert
        .values([Value::from(5000), Value::Varchar(None), Value::Int32(None)])
        .await;
    insert
        .values([Value::from(5001), Value::from("late"), Value::Int32(None)])
        .await;
    insert.finish().await.expect("Failed to insert nulls");
    drop(insert);
    let row = executor
        .get(
            "select reader, pages from verbatim_reading where id = ?",
            params![5000],
        )
        .await
        .expect("Failed to read the nulls")
        .expect("Row 5000 is missing");
    assert_eq!(row.get::<Option<String>>("reader").unwrap(), None);
    assert_eq!(row.get::<Option<i32>>("pages").unwrap(), None);

    // Native arrays
    #[cfg(not(feature = "disable-arrays"))]
    {
        let count = executor
            .get(
                "select count(*) as n from verbatim_reading where id = any(?)",
                params![encode_array(vec![Value::from(5000), Value::from(5001)])],
            )
            .await
            .expect("Failed to query with an array")
            .expect("Count returned no row")
            .get::<i64>("n")
            .expect("Count is not an integer");
        assert_eq!(count, 2);
    }

    // Returning
    #[cfg(not(feature = "disable-returning"))]
    {
        let insert =
            BulkInsert::new(&mut *executor, "verbatim_reading", ["id", "reader", "pages"])
                .await
                .expect("Failed to start the bulk insert")
                .returning(["id"])
                .expect("Returning is not supported");
        for i in 6000..6003 {
            insert
                .values([Value::from(i), Value::from("back"), Value::from(1)])
                .await;
        }
        insert.flush().await;
        let mut ids = insert
            .returned()
            .await
            .iter()
            .map(|row| row.get::<i64>("id").expect("Returned id is not an integer"))
            .collect::<Vec<_>>();
        ids.sort_unstable();
        assert_eq!(ids, [6000, 6001, 6002]);
        assert!(insert.returned().await.is_empty());
        insert.finish().await.expect("Failed to finish the returning insert");
    }
}
