//! Process-local implementations of the remote service traits.
use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::remote::{BlobHandle, BlobStore, Document, DocumentStore, Identity, IdentityService, RemoteError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RemoteError> {
    mutex
        .lock()
        .map_err(|_| RemoteError::Unavailable("lock poisoned".to_owned()))
}

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    password_hash: String,
}

/// Keeps accounts in memory with bcrypt-hashed passwords.
#[derive(Debug)]
pub struct InMemoryIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<String>>,
    next_uid: AtomicU64,
    cost: u32,
}

impl Default for InMemoryIdentity {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl InMemoryIdentity {
    /// `cost` is the bcrypt work factor (4 to 31).
    pub fn new(cost: u32) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
            next_uid: AtomicU64::new(1),
            cost,
        }
    }

    fn current_email(&self) -> Result<String, RemoteError> {
        lock(&self.current)?.clone().ok_or(RemoteError::NotSignedIn)
    }
}

impl IdentityService for InMemoryIdentity {
    fn sign_up(&self, email: &str, password: &str) -> Result<Identity, RemoteError> {
        let email = email.trim().to_lowercase();
        let mut accounts = lock(&self.accounts)?;
        if accounts.contains_key(&email) {
            return Err(RemoteError::EmailInUse(email));
        }

        let password_hash = bcrypt::hash(password, self.cost)
            .map_err(|e| RemoteError::Unavailable(format!("hashing failed: {e}")))?;
        let identity = Identity {
            uid: format!("uid-{}", self.next_uid.fetch_add(1, Ordering::SeqCst)),
            email: email.clone(),
            display_name: None,
        };
        accounts.insert(
            email.clone(),
            Account {
                identity: identity.clone(),
                password_hash,
            },
        );
        *lock(&self.current)? = Some(email);

        Ok(identity)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Identity, RemoteError> {
        let email = email.trim().to_lowercase();
        let accounts = lock(&self.accounts)?;
        let account = accounts.get(&email).ok_or(RemoteError::InvalidCredentials)?;

        match bcrypt::verify(password, &account.password_hash) {
            Ok(true) => {
                *lock(&self.current)? = Some(email);
                Ok(account.identity.clone())
            }
            Ok(false) => Err(RemoteError::InvalidCredentials),
            Err(e) => {
                tracing::error!("Error verifying password: {e}");
                Err(RemoteError::InvalidCredentials)
            }
        }
    }

    fn current_user(&self) -> Option<Identity> {
        let email = self.current_email().ok()?;
        let accounts = lock(&self.accounts).ok()?;
        accounts.get(&email).map(|a| a.identity.clone())
    }

    fn reauthenticate(&self, password: &str) -> Result<(), RemoteError> {
        let email = self.current_email()?;
        let accounts = lock(&self.accounts)?;
        let account = accounts.get(&email).ok_or(RemoteError::NotSignedIn)?;

        match bcrypt::verify(password, &account.password_hash) {
            Ok(true) => Ok(()),
            _ => Err(RemoteError::InvalidCredentials),
        }
    }

    fn update_display_name(&self, name: &str) -> Result<Identity, RemoteError> {
        let email = self.current_email()?;
        let mut accounts = lock(&self.accounts)?;
        let account = accounts.get_mut(&email).ok_or(RemoteError::NotSignedIn)?;
        account.identity.display_name = Some(name.to_owned());
        Ok(account.identity.clone())
    }

    fn sign_out(&self) {
        if let Ok(mut current) = lock(&self.current) {
            *current = None;
        }
    }
}

/// Collections of JSON documents kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryDocuments {
    collections: Mutex<HashMap<String, BTreeMap<String, Document>>>,
    next_id: AtomicU64,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryDocuments {
    fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, RemoteError> {
        let collections = lock(&self.collections)?;
        Ok(collections.get(collection).and_then(|c| c.get(id)).cloned())
    }

    fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        merge: bool,
    ) -> Result<(), RemoteError> {
        let mut collections = lock(&self.collections)?;
        let documents = collections.entry(collection.to_owned()).or_default();

        match documents.get_mut(id) {
            Some(existing) if merge => existing.extend(fields),
            _ => {
                documents.insert(id.to_owned(), fields);
            }
        }
        Ok(())
    }

    fn add_document(&self, collection: &str, fields: Document) -> Result<String, RemoteError> {
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.set_document(collection, &id, fields, false)?;
        Ok(id)
    }

    fn list_documents(&self, collection: &str) -> Result<Vec<(String, Document)>, RemoteError> {
        let collections = lock(&self.collections)?;
        Ok(collections
            .get(collection)
            .map(|c| c.iter().map(|(id, d)| (id.clone(), d.clone())).collect())
            .unwrap_or_default())
    }

    fn delete_document(&self, collection: &str, id: &str) -> Result<bool, RemoteError> {
        let mut collections = lock(&self.collections)?;
        Ok(collections
            .get_mut(collection)
            .and_then(|c| c.remove(id))
            .is_some())
    }
}

/// Blobs kept in memory, served from a fake base URL.
#[derive(Debug)]
pub struct InMemoryBlobs {
    base_url: String,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobs {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            blobs: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.blobs).ok()?.get(path).cloned()
    }
}

impl BlobStore for InMemoryBlobs {
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<BlobHandle, RemoteError> {
        lock(&self.blobs)?.insert(path.to_owned(), bytes.to_vec());
        Ok(BlobHandle {
            path: path.to_owned(),
        })
    }

    fn public_url(&self, handle: &BlobHandle) -> Result<String, RemoteError> {
        if !lock(&self.blobs)?.contains_key(&handle.path) {
            return Err(RemoteError::Unavailable(format!(
                "no blob at {}",
                handle.path
            )));
        }
        Ok(format!("{}/{}", self.base_url, handle.path))
    }
}
