//! App Core for Startpage.
//!
//! Owns the settings, both ordered collections, the identity provider and the
//! calendar source. Everything the signed-in user sees lives in a [`Session`]
//! that is created on sign-in and dropped on sign-out.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::database::{Database, DocumentStore, MemoryRecordStore, RecordStore};
use crate::managers::collection_controller::{CollectionController, Settlement};
use crate::managers::ordered_collection::OrderedCollection;
use crate::platform;
use crate::services::calendar_feed::{self, CalendarSource};
use crate::services::credential_cache::CredentialCache;
use crate::services::identity_provider::{IdentityProvider, LocalIdentityProvider};
use crate::services::link_safety::{self, Navigation};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::bookmark::Bookmark;
use crate::types::calendar::CalendarEvent;
use crate::types::errors::{AuthError, MutationError};
use crate::types::identity::Identity;
use crate::types::settings::{StorageBackend, StorageSettings};
use crate::types::task::{Task, TaskDraft};

/// State scoped to one signed-in user.
pub struct Session {
    identity: Identity,
    pub bookmarks: CollectionController<Bookmark>,
    pub tasks: CollectionController<Task>,
    pub events: Vec<CalendarEvent>,
    /// Text of the new-task input field.
    pub task_input: String,
}

impl Session {
    fn new(
        identity: Identity,
        bookmarks: Arc<OrderedCollection<Bookmark>>,
        tasks: Arc<OrderedCollection<Task>>,
    ) -> Self {
        let owner = identity.owner_id();
        Self {
            bookmarks: CollectionController::new(bookmarks, Some(owner.clone())),
            tasks: CollectionController::new(tasks, Some(owner)),
            identity,
            events: Vec::new(),
            task_input: String::new(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

/// Stores for both collections, built from the storage settings.
pub struct Stores {
    pub bookmarks: Arc<dyn RecordStore<Bookmark>>,
    pub tasks: Arc<dyn RecordStore<Task>>,
}

impl Stores {
    pub fn from_settings(storage: &StorageSettings) -> Result<Self, Box<dyn std::error::Error>> {
        match storage.backend {
            StorageBackend::Memory => Ok(Self {
                bookmarks: Arc::new(MemoryRecordStore::<Bookmark>::new()),
                tasks: Arc::new(MemoryRecordStore::<Task>::new()),
            }),
            StorageBackend::Sqlite => {
                let path = storage
                    .database_path
                    .as_ref()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| platform::get_data_dir().join("startpage.db"));
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let db = Arc::new(Database::open(&path)?);
                info!(path = %path.display(), "[App] opened record database");
                let store = Arc::new(DocumentStore::new(db));
                Ok(Self {
                    bookmarks: store.clone(),
                    tasks: store,
                })
            }
        }
    }
}

/// Central application struct.
pub struct App {
    pub settings_engine: SettingsEngine,
    bookmarks: Arc<OrderedCollection<Bookmark>>,
    tasks: Arc<OrderedCollection<Task>>,
    identity: Arc<dyn IdentityProvider>,
    identity_rx: watch::Receiver<Option<Identity>>,
    calendar: Box<dyn CalendarSource>,
    session: Option<Session>,
}

impl App {
    /// Creates the app from the settings file at `settings_path` (or the
    /// platform default). A settings file that cannot be read is logged and
    /// replaced by defaults.
    pub fn new(settings_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings_engine = SettingsEngine::new(settings_path);
        if let Err(e) = settings_engine.load() {
            warn!(error = %e, "[App] using default settings");
        }
        let settings = settings_engine.get_settings().clone();

        let stores = Stores::from_settings(&settings.storage)?;
        let identity = Arc::new(LocalIdentityProvider::new(
            &settings.account,
            CredentialCache::new(settings.account.credential_path.as_ref().map(PathBuf::from)),
        ));
        let calendar = calendar_feed::source_from_settings(&settings.calendar);

        Ok(Self::with_parts(settings_engine, stores, identity, calendar))
    }

    /// Assembles an app from explicit collaborators.
    pub fn with_parts(
        settings_engine: SettingsEngine,
        stores: Stores,
        identity: Arc<dyn IdentityProvider>,
        calendar: Box<dyn CalendarSource>,
    ) -> Self {
        // Mark the initial value as unseen so `start` picks up a restored session.
        let mut identity_rx = identity.subscribe();
        identity_rx.mark_changed();
        Self {
            settings_engine,
            bookmarks: Arc::new(OrderedCollection::new(stores.bookmarks)),
            tasks: Arc::new(OrderedCollection::new(stores.tasks)),
            identity,
            identity_rx,
            calendar,
            session: None,
        }
    }

    /// Applies the identity the provider currently reports, restoring a
    /// cached session if there is one.
    pub async fn start(&mut self) {
        self.sync_identity().await;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Result<&mut Session, MutationError> {
        self.session.as_mut().ok_or(MutationError::NoSession)
    }

    pub fn current_identity(&self) -> Option<&Identity> {
        self.session.as_ref().map(Session::identity)
    }

    pub async fn sign_in(&mut self) -> Result<Identity, AuthError> {
        match self.identity.sign_in().await {
            Ok(identity) => {
                self.sync_identity().await;
                Ok(identity)
            }
            Err(e) => {
                error!(error = %e, "[App] sign-in failed");
                Err(e)
            }
        }
    }

    /// Signs out. The session is dropped even if the provider reports an
    /// error while clearing its cached credential.
    pub async fn sign_out(&mut self) -> Result<(), AuthError> {
        let result = self.identity.sign_out().await;
        self.sync_identity().await;
        result
    }

    /// Applies an identity change published by the provider since the last
    /// call. Returns whether anything was applied.
    pub async fn sync_identity(&mut self) -> bool {
        if !self.identity_rx.has_changed().unwrap_or(false) {
            return false;
        }
        let identity = self.identity_rx.borrow_and_update().clone();
        self.handle_identity_change(identity).await;
        true
    }

    /// Starts a session for a new identity, or ends the session when the
    /// identity goes away. Re-announcing the current identity is a no-op.
    pub async fn handle_identity_change(&mut self, identity: Option<Identity>) {
        let Some(identity) = identity else {
            if self.session.take().is_some() {
                info!("[App] session ended");
            }
            return;
        };
        if self.current_identity().map(|i| &i.uid) == Some(&identity.uid) {
            return;
        }

        info!(uid = %identity.uid, "[App] session started");
        let mut session = Session::new(identity, self.bookmarks.clone(), self.tasks.clone());
        // Load failures are recorded on each controller and leave the list empty.
        let _ = session.bookmarks.reload().await;
        let _ = session.tasks.reload().await;
        session.events = calendar_feed::load_events(self.calendar.as_ref()).await;
        self.session = Some(session);
    }

    /// Reloads the calendar for the current session. Signed out there is
    /// nothing to show and the feed is not fetched.
    pub async fn refresh_events(&mut self) -> &[CalendarEvent] {
        if self.session.is_none() {
            return &[];
        }
        let events = calendar_feed::load_events(self.calendar.as_ref()).await;
        match self.session.as_mut() {
            Some(session) => {
                session.events = events;
                session.events.as_slice()
            }
            None => &[],
        }
    }

    /// Submits the new-task input. Whitespace-only input is ignored; otherwise
    /// the input is cleared before the task is added.
    pub async fn submit_task(&mut self) -> Result<Option<Settlement>, MutationError> {
        let session = self.session_mut()?;
        let text = session.task_input.trim().to_string();
        if text.is_empty() {
            return Ok(None);
        }
        session.task_input.clear();
        session.tasks.add(TaskDraft { text }).await.map(Some)
    }

    /// Resolves where opening a bookmark leads.
    pub fn open_bookmark(&self, id: &str) -> Result<Navigation, MutationError> {
        let session = self.session.as_ref().ok_or(MutationError::NoSession)?;
        let bookmark = session
            .bookmarks
            .find(id)
            .ok_or_else(|| MutationError::ItemNotFound(id.to_string()))?;
        Ok(link_safety::navigate(bookmark))
    }
}
