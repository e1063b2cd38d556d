use thiserror::Error;

/// Errors reported by maps, views and cursors. A missing key is never an
/// error; lookups report it through `Option`, `bool` or the map's default
/// return value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// first/last key or pop on a map or view with no entries
    #[error("the map is empty")]
    EmptyMap,

    /// a key was inserted into a view that does not cover it
    #[error("key {key} is outside the bounds of this view")]
    OutOfRange { key: String },

    /// a sub range was requested whose start lies after its end
    #[error("start key {from} is greater than end key {to}")]
    InvalidRange { from: String, to: String },

    /// remove or set_value on a cursor that has not returned an entry since
    /// it was created or since its last removal
    #[error("the cursor has no current entry")]
    NoCurrentEntry,

    /// bulk load input was not strictly ascending
    #[error("input is not strictly ascending at position {index}")]
    Unsorted { index: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
