use std::sync::{Arc, Mutex};
use verbatim::{Dump, DumpFlags, Executor, params};

pub async fn dumps<E: Executor>(executor: &mut E) {
    let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
    let rows = executor
        .query(
            "select title from verbatim_book where id = ?",
            params![1, Dump::new(DumpFlags::QUERY | DumpFlags::RESULT).to(buffer.clone())],
        )
        .await
        .expect("Failed to query with a dump");
    assert_eq!(rows.len(), 1);
    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(output.contains("select title from verbatim_book where id = "));
    assert!(output.contains("  1: 1"));
    assert!(output.contains("'Dune'"));

    let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
    executor
        .exec(
            "update verbatim_book set title = title where id > ?",
            params![Dump::new(DumpFlags::RESULT).to(buffer.clone()), 2],
        )
        .await
        .expect("Failed to update with a dump");
    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert_eq!(output, "2 rows affected\n");
}
