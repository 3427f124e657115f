mod recording;

#[cfg(test)]
mod tests {
    use super::recording::{RecordingExecutor, row};
    use verbatim_core::{
        BulkInsert, Dialect, Executor, Value, future::join_all, limit_for,
    };

    fn strings(values: &[&str]) -> Vec<Value> {
        values.iter().map(|v| Value::from(*v)).collect()
    }

    #[test]
    fn limit_leaves_headroom() {
        for max in [10, 999, 32766, 65535] {
            for columns in 1..=max / 2 {
                let limit = limit_for(max, columns);
                assert!(limit >= 1, "max {} columns {}", max, columns);
                assert!(limit * columns <= max - columns, "max {} columns {}", max, columns);
            }
        }
        assert_eq!(limit_for(65535, 3), 21844);
        assert_eq!(limit_for(100, 1000), 1);
    }

    #[tokio::test]
    async fn values_statement() {
        let mut executor = RecordingExecutor::new(Dialect::SQLite).width(3);
        let insert = BulkInsert::new(&mut executor, "tbl", ["aa", "bb", "cc"])
            .await
            .unwrap();
        insert.values(strings(&["one", "two", "three"])).await;
        insert.values(strings(&["a", "b", "c"])).await;
        insert.finish().await.unwrap();
        assert_eq!(insert.flushes().await, 1);
        assert_eq!(insert.rows_inserted().await, 2);
        drop(insert);
        assert_eq!(
            executor.sql(),
            [r#"insert into "tbl" (aa,bb,cc) values (?,?,?),(?,?,?)"#]
        );
        assert_eq!(
            executor.calls[0].args,
            strings(&["one", "two", "three", "a", "b", "c"])
        );
    }

    #[tokio::test]
    async fn values_statement_with_dollars() {
        let executor = RecordingExecutor::new(Dialect::DuckDB).width(2);
        let insert = executor.bulk_insert("s.t", ["a", "b"]).await.unwrap();
        insert.values([Value::from(1), Value::from(true)]).await;
        insert.values([Value::from(2), Value::Boolean(None)]).await;
        insert.finish().await.unwrap();
        let executor = insert.into_executor();
        assert_eq!(
            executor.sql(),
            [r#"insert into "s"."t" (a,b) values ($1,$2),($3,$4)"#]
        );
    }

    #[tokio::test]
    async fn rejected_row() {
        let mut executor = RecordingExecutor::new(Dialect::SQLite).width(3);
        let insert = BulkInsert::new(&mut executor, "tbl", ["aa", "bb", "cc"])
            .await
            .unwrap();
        insert.values(strings(&["one", "two", "three"])).await;
        insert.values(strings(&["one", "two"])).await;
        insert.values(strings(&["a", "b", "c"])).await;
        assert!(insert.errors().await.is_err());
        let error = insert.finish().await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "1 error:\nRow 2 has 2 values but 3 columns were declared"
        );
        assert_eq!(insert.rows_inserted().await, 2);
        drop(insert);
        assert_eq!(executor.calls.len(), 1);
        assert_eq!(executor.calls[0].args.len(), 6);
    }

    #[tokio::test]
    async fn flushes_at_the_limit() {
        for rows in 0usize..30 {
            for limit in 1usize..6 {
                let batch = limit.saturating_sub(1).max(1);
                let mut executor = RecordingExecutor::new(Dialect::MariaDB).width(2);
                let insert = BulkInsert::new(&mut executor, "tbl", ["a", "b"])
                    .await
                    .unwrap()
                    .limit(limit);
                for i in 0..rows as i64 {
                    insert.values([Value::from(i), Value::from(i * 2)]).await;
                }
                insert.finish().await.unwrap();
                assert_eq!(insert.flushes().await, rows.div_ceil(batch));
                assert_eq!(insert.rows_inserted().await, rows as u64);
                drop(insert);
                assert!(executor.calls.iter().all(|v| v.args.len() <= batch * 2));
                let args = executor
                    .calls
                    .iter()
                    .flat_map(|v| v.args.iter().cloned())
                    .collect::<Vec<_>>();
                let expected = (0..rows as i64)
                    .flat_map(|i| [Value::from(i), Value::from(i * 2)])
                    .collect::<Vec<_>>();
                assert_eq!(args, expected);
            }
        }
    }

    #[tokio::test]
    async fn flushes_before_reaching_the_limit() {
        let mut executor = RecordingExecutor::new(Dialect::SQLite);
        let insert = BulkInsert::new(&mut executor, "tbl", ["a"])
            .await
            .unwrap()
            .limit(3);
        for i in 0..3 {
            insert.values([Value::from(i)]).await;
        }
        assert_eq!(insert.flushes().await, 1);
        insert.finish().await.unwrap();
        assert_eq!(insert.flushes().await, 2);
        assert_eq!(insert.rows_inserted().await, 3);
        drop(insert);
        let rows = executor
            .calls
            .iter()
            .map(|v| v.args.len())
            .collect::<Vec<_>>();
        assert_eq!(rows, [2, 1]);
    }

    #[tokio::test]
    async fn list_cells_stay_in_their_column() {
        let mut executor = RecordingExecutor::new(Dialect::SQLite).width(2);
        let insert = BulkInsert::new(&mut executor, "t", ["a", "b"]).await.unwrap();
        insert.values([Value::from(vec![1, 2]), Value::from(3)]).await;
        insert.values([Value::from(Vec::<i32>::new()), Value::from(4)]).await;
        insert.finish().await.unwrap();
        assert_eq!(insert.rows_inserted().await, 2);
        drop(insert);
        assert_eq!(
            executor.sql(),
            [r#"insert into "t" (a,b) values (?,?),(?,?)"#]
        );
        assert_eq!(
            executor.calls[0].args,
            [
                Value::from("[1,2]"),
                Value::from(3),
                Value::from("[]"),
                Value::from(4),
            ]
        );
    }

    #[tokio::test]
    async fn unnest_rejects_arrays() {
        let mut executor = RecordingExecutor::new(Dialect::PostgreSQL)
            .with_columns(&[("id", "integer"), ("tags", "text[]")]);
        let error = BulkInsert::new(&mut executor, "tbl", ["id", "tags"])
            .await
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Column `tags` of `tbl` has the array type `text[]`, unnest cannot insert arrays"
        );
        let mut executor =
            RecordingExecutor::new(Dialect::PostgreSQL).with_columns(&[("tags", "_text")]);
        assert!(BulkInsert::new(&mut executor, "tbl", ["tags"]).await.is_err());

        let mut executor = RecordingExecutor::new(Dialect::PostgreSQL)
            .with_columns(&[("id", "integer"), ("name", "text")]);
        let insert = BulkInsert::new(&mut executor, "tbl", ["id", "name"])
            .await
            .unwrap();
        insert.values([Value::from(vec![1, 2]), Value::from("a")]).await;
        insert.values([Value::from(3), Value::from("b")]).await;
        let error = insert.finish().await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "1 error:\nRow 1 has a list in column `id`, unnest cannot insert arrays"
        );
        assert_eq!(insert.rows_inserted().await, 1);
    }

    #[tokio::test]
    async fn limit_is_clamped() {
        let mut executor = RecordingExecutor::new(Dialect::MySQL);
        let insert = BulkInsert::new(&mut executor, "tbl", ["a", "b", "c"])
            .await
            .unwrap();
        assert_eq!(insert.row_limit(), 21844);
        let insert = insert.limit(1_000_000);
        assert_eq!(insert.row_limit(), 21844);
        let insert = insert.limit(0);
        assert_eq!(insert.row_limit(), 1);
    }

    #[tokio::test]
    async fn failed_flushes_are_collected() {
        let mut executor = RecordingExecutor::new(Dialect::SQLite)
            .width(1)
            .failing(&[0]);
        let insert = BulkInsert::new(&mut executor, "tbl", ["a"])
            .await
            .unwrap()
            .limit(3);
        for i in 1..=5 {
            insert.values([Value::from(i)]).await;
        }
        insert.values(Vec::new()).await;
        let error = insert.finish().await.unwrap_err();
        assert_eq!(
            error.to_string(),
            indoc::indoc! {"
                2 errors:
                Rows 1 to 2: Call 0 failed
                Row 6 has 0 values but 1 columns were declared"}
        );
        assert_eq!(insert.flushes().await, 3);
        assert_eq!(insert.rows_inserted().await, 3);
        drop(insert);
        assert_eq!(executor.calls.len(), 3);
    }

    #[tokio::test]
    async fn unnest_statement() {
        let mut executor = RecordingExecutor::new(Dialect::PostgreSQL)
            .with_columns(&[("id", "integer"), ("name", "character varying(20)")]);
        let insert = BulkInsert::new(&mut executor, "tbl", ["ID", "name"])
            .await
            .unwrap()
            .on_conflict("on conflict (id) do nothing");
        insert.values([Value::from(1), Value::from("a")]).await;
        insert.values([Value::from(2), Value::Varchar(None)]).await;
        insert.finish().await.unwrap();
        assert_eq!(insert.rows_inserted().await, 2);
        drop(insert);
        assert_eq!(
            executor.sql(),
            [concat!(
                r#"insert into "tbl" (ID,name) select * from unnest("#,
                "$1::integer[], $2::character varying(20)[]) on conflict (id) do nothing"
            )]
        );
        assert_eq!(
            executor.calls[0].args,
            [
                Value::Array(
                    Some(vec![Value::from(1), Value::from(2)].into()),
                    Box::new(Value::Int32(None))
                ),
                Value::Array(
                    Some(vec![Value::from("a"), Value::Varchar(None)].into()),
                    Box::new(Value::Varchar(None))
                ),
            ]
        );
    }

    #[tokio::test]
    async fn unnest_needs_known_columns() {
        let mut executor =
            RecordingExecutor::new(Dialect::PostgreSQL).with_columns(&[("id", "int4")]);
        let error = BulkInsert::new(&mut executor, "tbl", ["id", "missing"])
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Table `tbl` has no column `missing`");

        let mut executor = RecordingExecutor::new(Dialect::PostgreSQL);
        let error = BulkInsert::new(&mut executor, "tbl", ["id"])
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "While reading the columns of `tbl`");
    }

    #[tokio::test]
    async fn needs_columns() {
        let mut executor = RecordingExecutor::new(Dialect::SQLite);
        let error = BulkInsert::new(&mut executor, "tbl", Vec::<&str>::new())
            .await
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "A bulk insert into `tbl` needs at least one column"
        );
    }

    #[tokio::test]
    async fn returning() {
        let mut executor = RecordingExecutor::new(Dialect::SQLite)
            .with_rows(vec![row(&["a"], vec![Value::from(1)])]);
        let insert = BulkInsert::new(&mut executor, "tbl", ["a"])
            .await
            .unwrap()
            .on_conflict("on conflict do nothing")
            .returning(["a"])
            .unwrap();
        insert.values([Value::from(1)]).await;
        assert!(insert.returned().await.is_empty());
        insert.flush().await;
        let returned = insert.returned().await;
        assert_eq!(returned.len(), 1);
        assert_eq!(returned[0].get::<i32>("a").unwrap(), 1);
        assert!(insert.returned().await.is_empty());
        insert.finish().await.unwrap();
        drop(insert);
        assert_eq!(
            executor.sql(),
            [r#"insert into "tbl" (a) values (?) on conflict do nothing returning a"#]
        );

        let mut executor = RecordingExecutor::new(Dialect::MySQL);
        let error = BulkInsert::new(&mut executor, "tbl", ["a"])
            .await
            .unwrap()
            .returning(["a"])
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "mysql does not support returning the inserted rows"
        );
    }

    #[tokio::test]
    async fn finish_without_rows() {
        let mut executor = RecordingExecutor::new(Dialect::SQLite);
        let insert = BulkInsert::new(&mut executor, "tbl", ["a"]).await.unwrap();
        insert.finish().await.unwrap();
        insert.flush().await;
        assert_eq!(insert.flushes().await, 0);
        drop(insert);
        assert!(executor.calls.is_empty());
    }

    #[tokio::test]
    async fn shared_between_tasks() {
        let mut executor = RecordingExecutor::new(Dialect::SQLite).width(2);
        let insert = BulkInsert::new(&mut executor, "tbl", ["task", "n"])
            .await
            .unwrap()
            .limit(11);
        join_all((0..4).map(|task| {
            let insert = &insert;
            async move {
                for n in 0..25 {
                    insert.values([Value::from(task), Value::from(n)]).await;
                }
            }
        }))
        .await;
        insert.finish().await.unwrap();
        assert_eq!(insert.rows_inserted().await, 100);
        assert_eq!(insert.flushes().await, 10);
        drop(insert);
        assert!(executor.calls.iter().all(|v| v.args.len() == 20));
    }
}
