use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("write failed: {0}")]
    Insert(#[source] rusqlite::Error),

    #[error("delete failed: {0}")]
    Delete(#[source] rusqlite::Error),

    #[error("transaction failed: {0}")]
    Tx(#[source] rusqlite::Error),

    #[error("commit failed: {0}")]
    Commit(#[source] rusqlite::Error),
}
