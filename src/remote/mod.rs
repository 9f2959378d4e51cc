//! Interfaces to the hosted services the app delegates to: identity,
//! document storage and blob storage.
//!
//! Only the operations the profile and event services need are modelled.
//! [`memory`] provides process-local implementations.

pub mod memory;

use serde_json::{Map, Value};

use crate::{common::error::AppError, store::StorageError};

/// A JSON object stored in a [`DocumentStore`] collection.
pub type Document = Map<String, Value>;

/// A signed-in user as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Where an uploaded blob lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    pub path: String,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RemoteError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("the email {0} is already registered")]
    EmailInUse(String),
    #[error("no user is signed in")]
    NotSignedIn,
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl From<RemoteError> for AppError {
    fn from(value: RemoteError) -> Self {
        match value {
            RemoteError::Unavailable(reason) => AppError::Storage(StorageError::Remote(reason)),
            error => AppError::Auth(error.to_string()),
        }
    }
}

pub trait IdentityService: Send + Sync {
    /// Create an account and sign it in.
    fn sign_up(&self, email: &str, password: &str) -> Result<Identity, RemoteError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<Identity, RemoteError>;
    fn current_user(&self) -> Option<Identity>;
    /// Confirm the signed-in user's password before a sensitive change.
    fn reauthenticate(&self, password: &str) -> Result<(), RemoteError>;
    fn update_display_name(&self, name: &str) -> Result<Identity, RemoteError>;
    fn sign_out(&self);
}

pub trait DocumentStore: Send + Sync {
    fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, RemoteError>;
    /// Write `fields` to the document. With `merge`, existing fields not in
    /// `fields` are kept; otherwise the document is replaced.
    fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        merge: bool,
    ) -> Result<(), RemoteError>;
    /// Store a new document under a generated id and return the id.
    fn add_document(&self, collection: &str, fields: Document) -> Result<String, RemoteError>;
    fn list_documents(&self, collection: &str) -> Result<Vec<(String, Document)>, RemoteError>;
    /// Returns whether the document existed.
    fn delete_document(&self, collection: &str, id: &str) -> Result<bool, RemoteError>;
}

pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path`, replacing anything already there.
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<BlobHandle, RemoteError>;
    fn public_url(&self, handle: &BlobHandle) -> Result<String, RemoteError>;
}
