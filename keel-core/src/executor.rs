use crate::{Driver, Query, QueryResult, RowLabeled, RowsAffected};

/// Runs statements on a connection, one at a time.
///
/// Failures are reported as [`anyhow::Error`] and surface to callers of the
/// builder and entity layers as [`crate::Error::Storage`], unchanged.
pub trait Executor {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    /// Send any query and collect every result, rows and modify counts alike.
    fn run(&mut self, query: Query) -> anyhow::Result<Vec<QueryResult>>;

    /// Execute the query and return the rows.
    fn fetch(&mut self, query: Query) -> anyhow::Result<Vec<RowLabeled>> {
        Ok(self
            .run(query)?
            .into_iter()
            .filter_map(|v| match v {
                QueryResult::Row(v) => Some(v),
                _ => None,
            })
            .collect())
    }

    /// Execute the query and return the total number of rows affected.
    fn execute(&mut self, query: Query) -> anyhow::Result<RowsAffected> {
        let mut result = RowsAffected::default();
        result.extend(self.run(query)?.into_iter().filter_map(|v| match v {
            QueryResult::Affected(v) => Some(v),
            _ => None,
        }));
        Ok(result)
    }
}
