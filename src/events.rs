//! Shared event listings with a cover image and an optional gallery.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    common::{
        clock::{Clock, SystemClock, parse_display_date},
        error::AppError,
    },
    remote::{BlobStore, DocumentStore},
    store::StorageError,
};

pub const EVENTS_COLLECTION: &str = "events";
const SUBTITLE: &str = "Novo Evento";
const ICON: &str = "party-popper";

/// An event as stored in the `events` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Document id; not part of the stored fields.
    #[serde(skip)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Public URL of the cover image.
    pub image: String,
    /// `DD/MM/YYYY`.
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "additionalImages", default)]
    pub additional_images: Vec<String>,
    /// RFC 3339 creation time, used for ordering.
    #[serde(default)]
    pub timestamp: String,
}

impl Event {
    fn created_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.timestamp, &Rfc3339).ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: String,
    pub cover_image: Option<Vec<u8>>,
    pub gallery: Vec<Vec<u8>>,
}

impl NewEvent {
    fn validate(&self) -> Result<&[u8], AppError> {
        if [&self.title, &self.description, &self.date]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(AppError::validation("please fill in every field"));
        }

        let cover = self
            .cover_image
            .as_deref()
            .ok_or_else(|| AppError::validation("please choose a cover image"))?;

        if parse_display_date(&self.date).is_none() {
            return Err(AppError::validation(format!(
                "invalid date {:?}, use DD/MM/YYYY",
                self.date
            )));
        }

        Ok(cover)
    }
}

/// Formats digits typed into a date field as `DD`, `DD/MM` or `DD/MM/YYYY`.
///
/// Anything that is not an ASCII digit is dropped, as is everything past the
/// eighth digit.
///
/// # Examples
/// ```
/// use wallet_ledger::events::format_date_input;
///
/// assert_eq!(format_date_input("19"), "19");
/// assert_eq!(format_date_input("191"), "19/1");
/// assert_eq!(format_date_input("19/10/2026"), "19/10/2026");
/// assert_eq!(format_date_input("1910202699"), "19/10/2026");
/// ```
pub fn format_date_input(text: &str) -> String {
    let digits: String = text.chars().filter(char::is_ascii_digit).take(8).collect();

    match digits.len() {
        0..=2 => digits,
        3..=4 => format!("{}/{}", &digits[..2], &digits[2..]),
        _ => format!("{}/{}/{}", &digits[..2], &digits[2..4], &digits[4..]),
    }
}

pub struct EventService {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
}

impl EventService {
    pub fn new(documents: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self::with_clock(documents, blobs, Arc::new(SystemClock))
    }

    pub fn with_clock(
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            documents,
            blobs,
            clock,
        }
    }

    fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, AppError> {
        let handle = self.blobs.upload(path, bytes)?;
        Ok(self.blobs.public_url(&handle)?)
    }

    /// Upload the images and store the event.
    pub fn create_event(&self, new_event: &NewEvent) -> Result<Event, AppError> {
        let cover = new_event.validate()?;
        let title = new_event.title.trim();

        let image = self.upload(&format!("events/{title}/coverImage"), cover)?;
        let additional_images = new_event
            .gallery
            .iter()
            .enumerate()
            .map(|(index, bytes)| self.upload(&format!("events/{title}/gallery/{index}"), bytes))
            .collect::<Result<Vec<_>, _>>()?;

        let timestamp = self
            .clock
            .now()
            .format(&Rfc3339)
            .map_err(|e| AppError::Process(format!("could not format timestamp: {e}")))?;

        let mut event = Event {
            id: String::new(),
            title: title.to_owned(),
            subtitle: SUBTITLE.to_owned(),
            image,
            date: new_event.date.trim().to_owned(),
            description: new_event.description.trim().to_owned(),
            icon: ICON.to_owned(),
            additional_images,
            timestamp,
        };

        let fields = match serde_json::to_value(&event).map_err(StorageError::from)? {
            Value::Object(fields) => fields,
            other => {
                return Err(AppError::Process(format!(
                    "expected a JSON object, got {other}"
                )));
            }
        };
        event.id = self.documents.add_document(EVENTS_COLLECTION, fields)?;

        tracing::info!("Created event {} ({})", event.id, event.title);
        Ok(event)
    }

    /// Every event, newest first. Documents that do not decode are skipped.
    pub fn list_events(&self) -> Result<Vec<Event>, AppError> {
        let mut events: Vec<Event> = self
            .documents
            .list_documents(EVENTS_COLLECTION)?
            .into_iter()
            .filter_map(|(id, fields)| {
                match serde_json::from_value::<Event>(Value::Object(fields)) {
                    Ok(event) => Some(Event { id, ..event }),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable event {id}: {e}");
                        None
                    }
                }
            })
            .collect();

        events.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(events)
    }

    pub fn delete_event(&self, id: &str) -> Result<(), AppError> {
        if !self.documents.delete_document(EVENTS_COLLECTION, id)? {
            return Err(AppError::NotFound(format!("event {id}")));
        }

        tracing::info!("Deleted event {id}");
        Ok(())
    }
}
