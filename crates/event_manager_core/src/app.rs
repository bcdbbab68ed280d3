//! Request-level facade over the event store.
//!
//! # Responsibility
//! - Own the connection, configuration, registry and injected seams
//!   (mailer, clock, form tokens).
//! - Expose one method per request handler.
//!
//! # Invariants
//! - Rendering and RSVP handlers never surface storage errors to visitors;
//!   they log and degrade to "nothing visible".
//! - Publication notices are sent after the status write commits.

use crate::clock::Clock;
use crate::config::SiteConfig;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::form::{EventDetailsForm, RsvpForm};
use crate::model::attendee::Attendee;
use crate::model::category::{Category, NewCategory};
use crate::model::event::{Event, EventId, EventStatus, StatusChange};
use crate::notify::{Mailer, NotificationOutcome, PublishNotifier};
use crate::registry::{ContentRegistry, RegistryError, EVENT_CONTENT_TYPE, EVENT_LIST_DIRECTIVE};
use crate::render::{
    admin_column_value, append_rsvp_form, render_event_detail, render_event_details_box,
    render_event_list, ListingItem, RenderError, RenderTarget, NO_EVENTS_MARKUP,
};
use crate::repo::attendee_repo::SqliteAttendeeRepository;
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::event_repo::{EventListQuery, EventRepository, SqliteEventRepository};
use crate::repo::RepoError;
use crate::rest::EventResource;
use crate::service::event_service::{EventDetailsInput, EventService};
use crate::service::listing_service::{ListingParams, ListingService};
use crate::service::rsvp_service::{ignored, RsvpOutcome, RsvpRejection, RsvpService};
use crate::token::{FormTokens, HashFormTokens, EVENT_DETAILS_ACTION, RSVP_ACTION};
use log::{error, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    Db(DbError),
    Repo(RepoError),
    Registry(RegistryError),
    Render(RenderError),
    /// Category slug that does not exist.
    UnknownCategory(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Registry(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "{err}"),
            Self::UnknownCategory(slug) => write!(f, "unknown category slug: {slug}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::UnknownCategory(_) => None,
        }
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RegistryError> for AppError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<RenderError> for AppError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

/// Why an "Event Details" save was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsRejection {
    InvalidToken,
    EventNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailsOutcome {
    Saved(Event),
    Ignored(DetailsRejection),
}

/// Result of a lifecycle write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleResult {
    pub event: Event,
    pub change: StatusChange,
    pub notification: NotificationOutcome,
}

pub struct EventManager {
    conn: Connection,
    config: SiteConfig,
    registry: ContentRegistry,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    tokens: HashFormTokens,
}

impl EventManager {
    /// Opens the configured database (in-memory when no path is set).
    pub fn open(
        config: SiteConfig,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let conn = match config.database_path.as_deref() {
            Some(path) => open_db(path)?,
            None => {
                warn!("event=db_open module=app status=in_memory no database_path configured");
                open_db_in_memory()?
            }
        };
        Self::with_connection(conn, config, mailer, clock)
    }

    /// Wraps an already migrated connection.
    pub fn with_connection(
        conn: Connection,
        config: SiteConfig,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let registry = ContentRegistry::builtin()?;
        let tokens = HashFormTokens::new(config.token_secret.clone(), Arc::clone(&clock));
        Ok(Self {
            conn,
            config,
            registry,
            mailer,
            clock,
            tokens,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn registry(&self) -> &ContentRegistry {
        &self.registry
    }

    /// Public link of an event.
    pub fn permalink(&self, id: EventId) -> String {
        let id_text = id.to_string();
        self.registry
            .permalink(&self.config.site_url, EVENT_CONTENT_TYPE, &id_text)
            .unwrap_or_else(|| format!("{}/?p={id_text}", self.config.site_url))
    }

    pub fn issue_token(&self, action: &str, scope: &str) -> String {
        self.tokens.issue(action, scope)
    }

    /// Stores a new event. Creating it directly as `publish` counts as a publication.
    pub fn create_event(&self, event: &Event) -> AppResult<LifecycleResult> {
        let service = EventService::new(SqliteEventRepository::try_new(&self.conn)?);
        let (event, change) = service.create_event(event)?;
        Ok(self.after_status_change(event, change))
    }

    pub fn set_status(&self, id: EventId, status: EventStatus) -> AppResult<LifecycleResult> {
        let service = EventService::new(SqliteEventRepository::try_new(&self.conn)?);
        let (event, change) = service.set_status(id, status)?;
        Ok(self.after_status_change(event, change))
    }

    pub fn get_event(&self, id: EventId) -> AppResult<Option<Event>> {
        Ok(SqliteEventRepository::try_new(&self.conn)?.get_event(id)?)
    }

    fn after_status_change(&self, event: Event, change: StatusChange) -> LifecycleResult {
        let notifier = PublishNotifier::new(self.mailer.as_ref(), &self.config.admin_email);
        let notification = notifier.on_status_change(&change, &event, &self.permalink(event.id));
        LifecycleResult {
            event,
            change,
            notification,
        }
    }

    pub fn create_category(&self, category: &NewCategory) -> AppResult<Category> {
        Ok(SqliteCategoryRepository::try_new(&self.conn)?.create_category(category)?)
    }

    pub fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(SqliteCategoryRepository::try_new(&self.conn)?.list_categories()?)
    }

    /// Replaces the categories of an event, addressed by slug.
    pub fn assign_categories(&self, id: EventId, slugs: &[&str]) -> AppResult<Vec<Category>> {
        let repo = SqliteCategoryRepository::try_new(&self.conn)?;
        let mut ids = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let category = repo
                .find_by_slug(slug)?
                .ok_or_else(|| AppError::UnknownCategory(slug.to_string()))?;
            ids.push(category.id);
        }
        repo.assign_event_categories(id, &ids)?;
        Ok(repo.categories_for_event(id)?)
    }

    pub fn render_details_box(&self, id: EventId) -> AppResult<Option<String>> {
        let Some(event) = self.get_event(id)? else {
            return Ok(None);
        };
        let token = self.issue_token(EVENT_DETAILS_ACTION, &id.to_string());
        Ok(Some(render_event_details_box(&event, &token)?))
    }

    /// Saves date and location from a submitted details form.
    pub fn save_event_details(&self, id: EventId, form: &EventDetailsForm) -> AppResult<DetailsOutcome> {
        let token = form.nonce.as_deref().unwrap_or("");
        if !self.tokens.verify(EVENT_DETAILS_ACTION, &id.to_string(), token) {
            warn!(
                "event=event_details module=app status=skip event_id={} reason=invalid_token",
                id
            );
            return Ok(DetailsOutcome::Ignored(DetailsRejection::InvalidToken));
        }

        let service = EventService::new(SqliteEventRepository::try_new(&self.conn)?);
        let input = EventDetailsInput {
            date: form.date.clone(),
            location: form.location.clone(),
        };
        match service.save_details(id, &input) {
            Ok(event) => Ok(DetailsOutcome::Saved(event)),
            Err(RepoError::NotFound(_)) => Ok(DetailsOutcome::Ignored(DetailsRejection::EventNotFound)),
            Err(err) => Err(err.into()),
        }
    }

    /// `(label, value)` cells of the admin list row for `event`.
    pub fn admin_columns(&self, event: &Event) -> Vec<(String, String)> {
        self.registry
            .admin_columns(EVENT_CONTENT_TYPE)
            .into_iter()
            .map(|column| (column.label.clone(), admin_column_value(event, &column.key)))
            .collect()
    }

    pub fn list_events(&self, params: &ListingParams) -> AppResult<Vec<Event>> {
        let service = ListingService::new(SqliteEventRepository::try_new(&self.conn)?);
        Ok(service.list_events(params, self.clock.today())?)
    }

    /// Expands the `event_list` directive. Never fails; errors render the
    /// "no events" placeholder.
    pub fn render_event_list<'a>(&self, attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
        let defaults = self
            .registry
            .directive(EVENT_LIST_DIRECTIVE)
            .map(|directive| directive.defaults.clone())
            .unwrap_or_default();
        let mut merged = defaults;
        for (key, value) in attributes {
            merged.insert(key.to_string(), value.to_string());
        }
        let params = ListingParams::from_attributes(
            merged.iter().map(|(key, value)| (key.as_str(), value.as_str())),
        );

        let rendered = self.list_events(&params).and_then(|events| {
            let items = events
                .iter()
                .map(|event| ListingItem::from_event(event, self.permalink(event.id)))
                .collect();
            Ok(render_event_list(items)?)
        });
        match rendered {
            Ok(html) => html,
            Err(err) => {
                error!(
                    "event=event_list module=app status=error error={}",
                    err
                );
                NO_EVENTS_MARKUP.to_string()
            }
        }
    }

    /// Renders the public page of a published event, with the RSVP form on
    /// the primary render. Unpublished or unknown events render nothing.
    pub fn render_event_page(&self, id: EventId, target: RenderTarget) -> AppResult<Option<String>> {
        let Some(event) = self.get_event(id)? else {
            return Ok(None);
        };
        if !event.is_published() {
            return Ok(None);
        }
        let labels = SqliteCategoryRepository::try_new(&self.conn)?
            .categories_for_event(id)?
            .into_iter()
            .map(|category| category.label)
            .collect();
        let body = render_event_detail(&event, labels)?;
        let page = append_rsvp_form(&body, &event, target, || {
            self.issue_token(RSVP_ACTION, &id.to_string())
        })?;
        Ok(Some(page))
    }

    /// Handles one RSVP submission. Every failure is reported as an ignored outcome.
    pub fn submit_rsvp(&self, id: EventId, form: &RsvpForm) -> RsvpOutcome {
        if !form.has_submit_marker() {
            return ignored(id, RsvpRejection::MissingSubmitMarker);
        }
        let token = form.nonce.as_deref().unwrap_or("");
        if !self.tokens.verify(RSVP_ACTION, &id.to_string(), token) {
            return ignored(id, RsvpRejection::InvalidToken);
        }

        let name = form.name.as_deref().unwrap_or("");
        let email = form.email.as_deref().unwrap_or("");
        let outcome = SqliteAttendeeRepository::try_new(&self.conn)
            .and_then(|repo| RsvpService::new(repo).submit(id, name, email));
        match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    "event=rsvp_submit module=app status=error event_id={} error={}",
                    id, err
                );
                RsvpOutcome::Ignored(RsvpRejection::StorageUnavailable)
            }
        }
    }

    pub fn attendees(&self, id: EventId) -> AppResult<Vec<Attendee>> {
        let service = RsvpService::new(SqliteAttendeeRepository::try_new(&self.conn)?);
        Ok(service.attendees(id)?)
    }

    pub fn attendee_count(&self, id: EventId) -> AppResult<u64> {
        let service = RsvpService::new(SqliteAttendeeRepository::try_new(&self.conn)?);
        Ok(service.attendee_count(id)?)
    }

    /// REST resource of a published event; `None` for anything else.
    pub fn event_resource(&self, id: EventId) -> AppResult<Option<EventResource>> {
        match self.get_event(id)? {
            Some(event) if event.is_published() => Ok(Some(self.build_resource(&event)?)),
            _ => Ok(None),
        }
    }

    /// REST collection of published events, newest first.
    pub fn list_resources(&self, limit: u32) -> AppResult<Vec<EventResource>> {
        let repo = SqliteEventRepository::try_new(&self.conn)?;
        let events = repo.list_events(&EventListQuery {
            status: Some(EventStatus::Publish),
            limit: Some(limit),
            ..EventListQuery::default()
        })?;
        events.iter().map(|event| self.build_resource(event)).collect()
    }

    fn build_resource(&self, event: &Event) -> AppResult<EventResource> {
        let categories = SqliteCategoryRepository::try_new(&self.conn)?
            .categories_for_event(event.id)?
            .into_iter()
            .map(|category| category.slug)
            .collect();
        let count = self.attendee_count(event.id)?;
        Ok(EventResource::build(
            &self.registry,
            event,
            self.permalink(event.id),
            categories,
            count,
        ))
    }
}
