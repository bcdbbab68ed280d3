use event_manager_core::db::open_db_in_memory;
use event_manager_core::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use event_manager_core::repo::event_repo::{EventRepository, SqliteEventRepository};
use event_manager_core::service::event_service::{EventDetailsInput, EventService};
use event_manager_core::{
    Event, EventDate, EventStatus, EventValidationError, NewCategory, RepoError,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let mut event = Event::new("Spring Fair");
    event.content = "Stalls and music".to_string();
    event.date = Some(EventDate::parse("2026-04-15").unwrap());
    event.location = Some("Hyderabad".to_string());
    let id = repo.create_event(&event).unwrap();

    let loaded = repo.get_event(id).unwrap().unwrap();
    assert_eq!(loaded.title, "Spring Fair");
    assert_eq!(loaded.content, "Stalls and music");
    assert_eq!(loaded.status, EventStatus::Draft);
    assert_eq!(loaded.date_text(), "2026-04-15");
    assert_eq!(loaded.location.as_deref(), Some("Hyderabad"));
    assert!(loaded.created_at > 0);
}

#[test]
fn blank_title_is_rejected_before_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let err = repo.create_event(&Event::new("   ")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(EventValidationError::EmptyTitle)
    ));
}

#[test]
fn get_unknown_event_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    assert!(repo.get_event(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn try_new_rejects_connection_without_schema() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteEventRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("events")));
}

#[test]
fn set_status_reports_previous_and_current() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    let id = repo.create_event(&Event::new("Spring Fair")).unwrap();

    let first = repo.set_status(id, EventStatus::Publish).unwrap();
    assert_eq!(first.previous, Some(EventStatus::Draft));
    assert_eq!(first.current, EventStatus::Publish);
    assert!(first.is_publication());

    let resave = repo.set_status(id, EventStatus::Publish).unwrap();
    assert_eq!(resave.previous, Some(EventStatus::Publish));
    assert!(!resave.is_publication());

    let err = repo
        .set_status(Uuid::new_v4(), EventStatus::Publish)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn save_details_sets_clears_and_ignores_malformed_dates() {
    let conn = open_db_in_memory().unwrap();
    let service = EventService::new(SqliteEventRepository::try_new(&conn).unwrap());
    let (event, _) = service.create_event(&Event::new("Spring Fair")).unwrap();

    let saved = service
        .save_details(
            event.id,
            &EventDetailsInput {
                date: Some("2026-04-15".to_string()),
                location: Some("  <b>Hyderabad</b> ".to_string()),
            },
        )
        .unwrap();
    assert_eq!(saved.date_text(), "2026-04-15");
    assert_eq!(saved.location.as_deref(), Some("Hyderabad"));

    let kept = service
        .save_details(
            event.id,
            &EventDetailsInput {
                date: Some("April 15".to_string()),
                location: None,
            },
        )
        .unwrap();
    assert_eq!(kept.date_text(), "2026-04-15");
    assert_eq!(kept.location.as_deref(), Some("Hyderabad"));

    let signed = service
        .save_details(
            event.id,
            &EventDetailsInput {
                date: Some("-999-01-01".to_string()),
                location: None,
            },
        )
        .unwrap();
    assert_eq!(signed.date_text(), "2026-04-15");

    let cleared = service
        .save_details(
            event.id,
            &EventDetailsInput {
                date: Some(String::new()),
                location: Some(" ".to_string()),
            },
        )
        .unwrap();
    assert!(cleared.date.is_none());
    assert!(cleared.location.is_none());
}

#[test]
fn categories_are_hierarchical_and_replaced_on_assign() {
    let conn = open_db_in_memory().unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();
    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();

    let music = categories.create_category(&NewCategory::new("Music")).unwrap();
    let jazz = categories
        .create_category(&NewCategory::new("Jazz Nights").with_parent(music.id))
        .unwrap();
    assert_eq!(jazz.slug, "jazz-nights");
    assert_eq!(jazz.parent_id, Some(music.id));

    let id = events.create_event(&Event::new("Late Set")).unwrap();
    categories
        .assign_event_categories(id, &[music.id, jazz.id, jazz.id])
        .unwrap();
    assert_eq!(categories.categories_for_event(id).unwrap().len(), 2);

    categories.assign_event_categories(id, &[jazz.id]).unwrap();
    let assigned = categories.categories_for_event(id).unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].slug, "jazz-nights");

    assert_eq!(
        categories.find_by_slug("music").unwrap().map(|c| c.id),
        Some(music.id)
    );
}

#[test]
fn category_errors_are_typed() {
    let conn = open_db_in_memory().unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();
    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();
    categories.create_category(&NewCategory::new("Music")).unwrap();

    let duplicate = categories
        .create_category(&NewCategory::new("music"))
        .unwrap_err();
    assert!(matches!(duplicate, RepoError::DuplicateSlug(slug) if slug == "music"));

    let orphan = categories
        .create_category(&NewCategory::new("Orphan").with_parent(404))
        .unwrap_err();
    assert!(matches!(orphan, RepoError::CategoryNotFound(404)));

    let id = events.create_event(&Event::new("Fair")).unwrap();
    let unknown = categories.assign_event_categories(id, &[404]).unwrap_err();
    assert!(matches!(unknown, RepoError::CategoryNotFound(404)));
}
