use crate::ValueHolder;
use async_stream::try_stream;
use std::pin::pin;
use verbatim_core::{
    Error, Result, Row, RowLabeled, RowNames,
    stream::{Stream, StreamExt},
};

pub(crate) fn postgres_row_to_row(row: tokio_postgres::Row) -> Result<Row> {
    (0..row.len())
        .map(|i| match row.try_get::<_, ValueHolder>(i) {
            Ok(v) => Ok(v.0),
            Err(e) => {
                let column = &row.columns()[i];
                Err(Error::new(e).context(format!(
                    "Could not decode column {} `{}` of type {}",
                    i,
                    column.name(),
                    column.type_()
                )))
            }
        })
        .collect()
}

pub(crate) fn stream_postgres_rows<V>(
    stream: impl AsyncFnOnce() -> Result<V>,
) -> impl Stream<Item = Result<RowLabeled>>
where
    V: Stream<Item = std::result::Result<tokio_postgres::Row, tokio_postgres::Error>>,
{
    try_stream! {
        let stream = stream().await?;
        let mut stream = pin!(stream);
        let mut labels: Option<RowNames> = None;
        while let Some(row) = stream.next().await.transpose()? {
            let labels = labels.get_or_insert_with(|| {
                row.columns().iter().map(|c| c.name().to_string()).collect()
            });
            yield RowLabeled::new(labels.clone(), postgres_row_to_row(row)?);
        }
    }
}
