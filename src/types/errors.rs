use std::fmt;

// === StoreError ===

/// Errors reported by a record store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Record with the given ID was not found.
    NotFound(String),
    /// A patch tried to rewrite an identity or ownership field.
    ImmutableField(String),
    /// The store could not be reached or refused the request.
    Unavailable(String),
    /// Database operation failed.
    DatabaseError(String),
    /// A record body could not be encoded or decoded.
    SerializationError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "Record not found: {}", id),
            StoreError::ImmutableField(field) => {
                write!(f, "Field cannot be patched: {}", field)
            }
            StoreError::Unavailable(msg) => write!(f, "Record store unavailable: {}", msg),
            StoreError::DatabaseError(msg) => write!(f, "Record store database error: {}", msg),
            StoreError::SerializationError(msg) => {
                write!(f, "Record serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StoreError {}

// === CollectionError ===

/// Errors from ordered-collection operations.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionError {
    /// The operation requires a signed-in owner.
    NoSession,
    /// A record in the request belongs to a different owner.
    ForeignItem(String),
    /// Some of the per-item order writes failed. Successful writes are not undone.
    ReorderFailed {
        failed: usize,
        total: usize,
        first: StoreError,
    },
    /// The underlying store call failed.
    Store(StoreError),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::NoSession => write!(f, "No signed-in owner"),
            CollectionError::ForeignItem(id) => {
                write!(f, "Record belongs to another owner: {}", id)
            }
            CollectionError::ReorderFailed {
                failed,
                total,
                first,
            } => write!(
                f,
                "Reorder failed for {} of {} records: {}",
                failed, total, first
            ),
            CollectionError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectionError::Store(e) => Some(e),
            CollectionError::ReorderFailed { first, .. } => Some(first),
            _ => None,
        }
    }
}

impl From<StoreError> for CollectionError {
    fn from(e: StoreError) -> Self {
        CollectionError::Store(e)
    }
}

// === MutationError ===

/// Errors surfaced by optimistic mutations.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationError {
    /// The operation requires a signed-in owner.
    NoSession,
    /// No item with the given ID is in the in-memory list.
    ItemNotFound(String),
    /// A delete was confirmed without a pending confirmation.
    NoPendingDelete,
    /// Creating a record failed. This is the one write failure shown to the user.
    AddFailed(String),
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationError::NoSession => write!(f, "No signed-in owner"),
            MutationError::ItemNotFound(id) => write!(f, "Item not found: {}", id),
            MutationError::NoPendingDelete => write!(f, "No delete awaiting confirmation"),
            MutationError::AddFailed(msg) => write!(f, "Failed to add item: {}", msg),
        }
    }
}

impl std::error::Error for MutationError {}

// === AuthError ===

/// Errors related to sign-in and the cached credential.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// The identity provider rejected the sign-in.
    Rejected(String),
    /// The user cancelled the sign-in flow.
    Cancelled,
    /// The cached credential could not be read or written.
    CredentialCache(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Rejected(msg) => write!(f, "Sign-in rejected: {}", msg),
            AuthError::Cancelled => write!(f, "Sign-in cancelled"),
            AuthError::CredentialCache(msg) => write!(f, "Credential cache error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

// === CalendarError ===

/// Errors from the calendar feed. Never shown to the user; the feed
/// degrades to an empty event list.
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarError {
    /// The request could not be sent or the body could not be read.
    Transport(String),
    /// The feed answered with a non-success HTTP status.
    Status(u16),
    /// The body is not a recognizable event list.
    Decode(String),
    /// The feed reported an error in its response body.
    Feed(String),
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarError::Transport(msg) => write!(f, "Calendar transport error: {}", msg),
            CalendarError::Status(code) => write!(f, "Calendar feed returned HTTP {}", code),
            CalendarError::Decode(msg) => write!(f, "Calendar decode error: {}", msg),
            CalendarError::Feed(msg) => write!(f, "Calendar feed error: {}", msg),
        }
    }
}

impl std::error::Error for CalendarError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
