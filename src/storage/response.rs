/// Outcome of a single fetch. Exactly one is delivered per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The fetch failed; the message is shown to the user as-is
    Error(String),
    /// Cached copy is still current; carries no data
    NotModified,
    /// The resource exists but is empty
    NoContent,
    Data(Vec<u8>),
}
