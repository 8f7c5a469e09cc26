//! Error types for the address book and its workflow.

use thiserror::Error;

/// Failures of the durable storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot serialize address book: {0}")]
    Serialize(#[from] serde_json::Error),

    /// the stored blob exists but cannot be decoded
    #[error("stored address book under [{key}] is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

#[derive(Error, Debug)]
pub enum BookError {
    #[error("a record with id [{0}] is already in the address book")]
    Duplicate(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Invalid values in the environment
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{name}` must be a non-negative integer, got [{value}]")]
    NotANumber { name: &'static str, value: String },

    #[error("`{name}` must not be empty")]
    Empty { name: &'static str },

    #[error("`CARNET_DEDUP` must be `search-key` or `address-id`, got [{0}]")]
    UnknownDedupPolicy(String),
}

/// Errors shown to the user by the composition workflow.
///
/// They are all recoverable: the next successful step clears them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Veuillez renseigner la rue et le code postal.")]
    EmptySearch,

    #[error("Adresse introuvable. Veuillez réessayer.")]
    LookupNotFound,

    /// the service could not be reached or answered with an error
    #[error("Service d'adresses indisponible. Veuillez réessayer plus tard.")]
    LookupUnavailable(String),

    #[error("Adresse déjà ajoutée.")]
    DuplicateCandidate,

    #[error("Aucune adresse sélectionnée. Essayez de sélectionner une adresse ou cherchez-en une si vous n'en avez pas.")]
    NoSelection,

    #[error("Adresse déjà présente dans le carnet.")]
    AlreadyInBook(String),

    #[error("Impossible d'enregistrer le carnet d'adresses.")]
    PersistenceWrite(String),
}

impl From<BookError> for WorkflowError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Duplicate(id) => WorkflowError::AlreadyInBook(id),
            BookError::Storage(e) => WorkflowError::PersistenceWrite(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_in_french() {
        assert_eq!(WorkflowError::LookupNotFound.to_string(), "Adresse introuvable. Veuillez réessayer.");
        assert_eq!(WorkflowError::DuplicateCandidate.to_string(), "Adresse déjà ajoutée.");
        assert!(WorkflowError::NoSelection.to_string().starts_with("Aucune adresse sélectionnée."));
    }

    #[test]
    fn book_errors_map_to_workflow_errors() {
        let duplicate = WorkflowError::from(BookError::Duplicate("1_2".to_string()));
        assert_eq!(duplicate, WorkflowError::AlreadyInBook("1_2".to_string()));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let write = WorkflowError::from(BookError::Storage(StorageError::Io(io)));
        assert!(matches!(write, WorkflowError::PersistenceWrite(reason) if reason.contains("read-only")));
    }
}
