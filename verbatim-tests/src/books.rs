use std::{collections::HashMap, sync::LazyLock};
use tokio::sync::Mutex;
use verbatim::{Executor, Params, Value, params};

#[derive(Params, Clone)]
struct Book {
    id: i32,
    title: String,
    author: Option<String>,
    #[param_name("year")]
    published: i32,
    #[param_skip]
    #[allow(dead_code)]
    notes: String,
}

fn titles(rows: &[verbatim::RowLabeled]) -> Vec<String> {
    rows.iter()
        .map(|row| row.get::<String>("title").expect("Row has no title"))
        .collect()
}

pub async fn books<E: Executor>(executor: &mut E) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    // Setup
    executor
        .exec("drop table if exists verbatim_book", params![])
        .await
        .expect("Failed to drop the verbatim_book table");
    executor
        .exec(
            "create table verbatim_book (
                id integer primary key,
                title varchar(100) not null,
                author varchar(100),
                year integer not null
            )",
            params![],
        )
        .await
        .expect("Failed to create the verbatim_book table");

    // Insert from labeled records
    let books = [
        Book {
            id: 1,
            title: "Dune".into(),
            author: Some("Frank Herbert".into()),
            published: 1965,
            notes: "".into(),
        },
        Book {
            id: 2,
            title: "Dune Messiah".into(),
            author: Some("Frank Herbert".into()),
            published: 1969,
            notes: "".into(),
        },
        Book {
            id: 3,
            title: "Neuromancer".into(),
            author: Some("William Gibson".into()),
            published: 1984,
            notes: "".into(),
        },
        Book {
            id: 4,
            title: "Beowulf".into(),
            author: None,
            published: 1000,
            notes: "".into(),
        },
    ];
    for book in &books {
        let result = executor
            .exec(
                "insert into verbatim_book (id, title, author, year) \
                values (:id, :title, :author, :year)",
                params![book],
            )
            .await
            .expect("Failed to insert a book");
        assert_eq!(result.rows_affected, 1);
    }

    // Conditionals
    let filter = |author: &str, after: i32| {
        HashMap::from([
            ("author", Value::from(author.to_string())),
            ("after", Value::from(after)),
        ])
    };
    let query = "select title from verbatim_book where 1 = 1 \
        {{:author and author = :author}} \
        {{:after and year > :after}} \
        order by id";
    let rows = executor
        .query(query, params![filter("Frank Herbert", 0)])
        .await
        .expect("Failed to query by author");
    assert_eq!(titles(&rows), ["Dune", "Dune Messiah"]);
    let rows = executor
        .query(query, params![filter("", 1966)])
        .await
        .expect("Failed to query by year");
    assert_eq!(titles(&rows), ["Dune Messiah", "Neuromancer"]);
    let rows = executor
        .query(query, params![filter("", 0)])
        .await
        .expect("Failed to query without filters");
    assert_eq!(rows.len(), 4);
    let rows = executor
        .query(
            "select title from verbatim_book where {{:known! author is null}} {{:known author is not null}} order by id",
            params![HashMap::from([("known", false)])],
        )
        .await
        .expect("Failed to query the books without an author");
    assert_eq!(titles(&rows), ["Beowulf"]);

    // List expansion
    let rows = executor
        .query(
            "select title from verbatim_book where id in (?) and year > ? order by id",
            params![vec![1, 3, 4], 1500],
        )
        .await
        .expect("Failed to query a list of ids");
    assert_eq!(titles(&rows), ["Dune", "Neuromancer"]);
    let rows = executor
        .query(
            "select title from verbatim_book where id in (:ids) order by id",
            params![HashMap::from([("ids", vec![2, 4])])],
        )
        .await
        .expect("Failed to query a named list of ids");
    assert_eq!(titles(&rows), ["Dune Messiah", "Beowulf"]);

    // First row
    let row = executor
        .get("select title, year from verbatim_book where id = ?", params![3])
        .await
        .expect("Failed to get a book")
        .expect("Book 3 is missing");
    assert_eq!(row.get::<String>("title").unwrap(), "Neuromancer");
    assert_eq!(row.get::<i64>("year").unwrap(), 1984);
    let row = executor
        .get("select title from verbatim_book where id = ?", params![42])
        .await
        .expect("Failed to get a missing book");
    assert!(row.is_none());

    // Update through a labeled record
    let mut messiah = books[1].clone();
    messiah.published = 1970;
    let result = executor
        .exec(
            "update verbatim_book set year = :year where id = :id",
            params![messiah],
        )
        .await
        .expect("Failed to update a book");
    assert_eq!(result.rows_affected, 1);

    // Errors
    let error = executor
        .query("select 1", params![1, HashMap::from([("a", 1)])])
        .await
        .expect_err("Mixing parameters must fail");
    assert!(format!("{:#}", error).contains("Cannot mix named and positional parameters"));
    let error = executor
        .query(
            "select 1 {{:missing where 1 = 1}}",
            params![HashMap::from([("present", 1)])],
        )
        .await
        .expect_err("Conditional on a missing parameter must fail");
    assert!(format!("{:#}", error).contains("Could not find parameter `missing` for conditional"));
}
