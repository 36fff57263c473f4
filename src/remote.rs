use crate::error::Result;

/// Transport to the server publishing the listing pages and data files.
///
/// Any failure, including a missing page, is a `GoesSolarError::Transport`.
pub trait RemoteArchive {
    fn connect() -> Result<Self>
    where
        Self: Sized;

    /// Text of the listing page at `url`.
    fn retrieve_listing_page(&self, url: &str) -> Result<String>;

    /// Bytes of the file at `url`.
    fn retrieve_remote_file(&self, url: &str) -> Result<Vec<u8>>;
}
