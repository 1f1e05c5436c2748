use camino::Utf8PathBuf;

/// Configuration handed to [`Database::open`](crate::db::Database::open).
///
/// The in-memory database ignores the path; an on-disk engine roots its
/// files there.
#[derive(Debug)]
#[non_exhaustive]
pub struct StoreConfig {
    pub path: Utf8PathBuf,
}

impl StoreConfig {
    #[must_use]
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Utf8PathBuf::new())
    }
}
