//! Registration, login and the per-user profile document.
//!
//! Profiles live in the `usuarios` collection keyed by the identity uid.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::format_description::well_known::Rfc3339;

use crate::{
    common::{
        clock::{Clock, SystemClock},
        error::AppError,
    },
    remote::{BlobStore, Document, DocumentStore, Identity, IdentityService},
    store::StorageError,
};

pub const USERS_COLLECTION: &str = "usuarios";
pub const DEFAULT_NAME: &str = "Usuário";
pub const DEFAULT_PROFILE_IMAGE: &str = "https://via.placeholder.com/50";
/// How many recent photos a profile keeps.
pub const MAX_RECENT_PHOTOS: usize = 5;

fn default_name() -> String {
    DEFAULT_NAME.to_owned()
}

fn default_profile_image() -> String {
    DEFAULT_PROFILE_IMAGE.to_owned()
}

/// The stored user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "nome", default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "escola", default)]
    pub school: String,
    #[serde(rename = "termosAceitos", default)]
    pub accepted_terms: bool,
    #[serde(rename = "profileImageUrl", default = "default_profile_image")]
    pub profile_image_url: String,
    #[serde(rename = "aboutText", default)]
    pub about_text: String,
    #[serde(rename = "recentPhotos", default)]
    pub recent_photos: Vec<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
}

/// A signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub uid: String,
    pub document: UserDocument,
}

/// What the registration screen collects.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub repeat_password: String,
    pub school: String,
    pub accepted_terms: bool,
    pub profile_image: Option<Vec<u8>>,
}

impl RegistrationForm {
    fn validate(&self) -> Result<(), AppError> {
        if !self.accepted_terms {
            return Err(AppError::validation(
                "you must accept the terms of use to register",
            ));
        }

        let required = [
            &self.name,
            &self.email,
            &self.password,
            &self.repeat_password,
            &self.school,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AppError::validation("please fill in every field"));
        }

        if self.password != self.repeat_password {
            return Err(AppError::validation("the passwords do not match"));
        }

        Ok(())
    }
}

fn to_document<T: Serialize>(value: &T) -> Result<Document, AppError> {
    match serde_json::to_value(value).map_err(StorageError::from)? {
        Value::Object(fields) => Ok(fields),
        other => Err(AppError::Process(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

fn field(name: &str, value: Value) -> Document {
    let mut fields = Document::new();
    fields.insert(name.to_owned(), value);
    fields
}

fn profile_image_path(uid: &str) -> String {
    format!("profileImages/{uid}")
}

pub struct ProfileService {
    identity: Arc<dyn IdentityService>,
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self::with_clock(identity, documents, blobs, Arc::new(SystemClock))
    }

    pub fn with_clock(
        identity: Arc<dyn IdentityService>,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            documents,
            blobs,
            clock,
        }
    }

    fn timestamp(&self) -> Result<String, AppError> {
        self.clock
            .now()
            .format(&Rfc3339)
            .map_err(|e| AppError::Process(format!("could not format timestamp: {e}")))
    }

    fn signed_in(&self) -> Result<Identity, AppError> {
        self.identity
            .current_user()
            .ok_or_else(|| AppError::Auth("no user is signed in".to_owned()))
    }

    fn upload_profile_image(&self, uid: &str, bytes: &[u8]) -> Result<String, AppError> {
        let handle = self.blobs.upload(&profile_image_path(uid), bytes)?;
        Ok(self.blobs.public_url(&handle)?)
    }

    fn merge(&self, uid: &str, fields: Document) -> Result<(), AppError> {
        self.documents
            .set_document(USERS_COLLECTION, uid, fields, true)?;
        Ok(())
    }

    /// Create the account, its profile image and its user document.
    ///
    /// The steps are not transactional: a failure after sign-up leaves the
    /// account without a complete document.
    pub fn register(&self, form: &RegistrationForm) -> Result<UserProfile, AppError> {
        form.validate()?;

        let identity = self.identity.sign_up(&form.email, &form.password)?;
        tracing::info!("Registered user {}", identity.uid);

        let profile_image_url = match &form.profile_image {
            Some(bytes) => self.upload_profile_image(&identity.uid, bytes)?,
            None => DEFAULT_PROFILE_IMAGE.to_owned(),
        };

        let name = form.name.trim().to_owned();
        self.identity.update_display_name(&name)?;

        let document = UserDocument {
            name,
            email: identity.email.clone(),
            school: form.school.trim().to_owned(),
            accepted_terms: form.accepted_terms,
            profile_image_url,
            about_text: String::new(),
            recent_photos: Vec::new(),
            created_at: self.timestamp()?,
        };
        self.documents.set_document(
            USERS_COLLECTION,
            &identity.uid,
            to_document(&document)?,
            false,
        )?;

        Ok(UserProfile {
            uid: identity.uid,
            document,
        })
    }

    pub fn log_in(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(AppError::validation("please enter your email and password"));
        }

        Ok(self.identity.sign_in(email, password)?)
    }

    /// Load the signed-in user's profile, creating a default document when
    /// none exists yet.
    pub fn load_profile(&self) -> Result<UserProfile, AppError> {
        let identity = self.signed_in()?;

        let document: UserDocument = match self.documents.get_document(USERS_COLLECTION, &identity.uid)? {
            Some(fields) => serde_json::from_value(Value::Object(fields)).map_err(|e| {
                StorageError::Corrupt {
                    key: format!("{USERS_COLLECTION}/{}", identity.uid),
                    reason: e.to_string(),
                }
            })?,
            None => {
                tracing::warn!(
                    "No user document for {}, creating a default one",
                    identity.uid
                );
                let document = UserDocument {
                    name: identity
                        .display_name
                        .clone()
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or_else(default_name),
                    email: identity.email.clone(),
                    school: String::new(),
                    accepted_terms: false,
                    profile_image_url: default_profile_image(),
                    about_text: String::new(),
                    recent_photos: Vec::new(),
                    created_at: self.timestamp()?,
                };
                let fields = json!({
                    "nome": document.name,
                    "email": document.email,
                    "profileImageUrl": document.profile_image_url,
                    "createdAt": document.created_at,
                });
                self.documents.set_document(
                    USERS_COLLECTION,
                    &identity.uid,
                    to_document(&fields)?,
                    false,
                )?;
                document
            }
        };

        Ok(UserProfile {
            uid: identity.uid,
            document,
        })
    }

    /// Change the display name after confirming the current password.
    pub fn rename(&self, new_name: &str, current_password: &str) -> Result<String, AppError> {
        if current_password.trim().is_empty() {
            return Err(AppError::validation("please enter your current password"));
        }
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(AppError::validation("the name cannot be empty"));
        }

        let identity = self.signed_in()?;
        self.identity.reauthenticate(current_password)?;
        self.identity.update_display_name(new_name)?;
        self.merge(&identity.uid, field("nome", json!(new_name)))?;

        tracing::info!("Renamed user {}", identity.uid);
        Ok(new_name.to_owned())
    }

    pub fn set_about_text(&self, text: &str) -> Result<(), AppError> {
        let identity = self.signed_in()?;
        self.merge(&identity.uid, field("aboutText", json!(text)))
    }

    fn recent_photos(&self) -> Result<(String, Vec<String>), AppError> {
        let profile = self.load_profile()?;
        Ok((profile.uid, profile.document.recent_photos))
    }

    fn save_recent_photos(&self, uid: &str, photos: &[String]) -> Result<(), AppError> {
        self.merge(uid, field("recentPhotos", json!(photos)))
    }

    /// Append photos, keeping only the most recent [`MAX_RECENT_PHOTOS`].
    pub fn add_recent_photos(&self, urls: &[String]) -> Result<Vec<String>, AppError> {
        let (uid, mut photos) = self.recent_photos()?;
        photos.extend(urls.iter().cloned());
        if photos.len() > MAX_RECENT_PHOTOS {
            photos.drain(..photos.len() - MAX_RECENT_PHOTOS);
        }

        self.save_recent_photos(&uid, &photos)?;
        Ok(photos)
    }

    pub fn replace_recent_photo(&self, index: usize, url: &str) -> Result<Vec<String>, AppError> {
        let (uid, mut photos) = self.recent_photos()?;
        let slot = photos
            .get_mut(index)
            .ok_or_else(|| AppError::NotFound(format!("recent photo {index}")))?;
        *slot = url.to_owned();

        self.save_recent_photos(&uid, &photos)?;
        Ok(photos)
    }

    pub fn remove_recent_photo(&self, index: usize) -> Result<Vec<String>, AppError> {
        let (uid, mut photos) = self.recent_photos()?;
        if index >= photos.len() {
            return Err(AppError::NotFound(format!("recent photo {index}")));
        }
        photos.remove(index);

        self.save_recent_photos(&uid, &photos)?;
        Ok(photos)
    }

    /// Upload a new profile image and return its public URL.
    pub fn update_profile_image(&self, bytes: &[u8]) -> Result<String, AppError> {
        let identity = self.signed_in()?;
        let url = self.upload_profile_image(&identity.uid, bytes)?;
        self.merge(&identity.uid, field("profileImageUrl", json!(url)))?;
        Ok(url)
    }

    pub fn sign_out(&self) {
        self.identity.sign_out();
    }
}
