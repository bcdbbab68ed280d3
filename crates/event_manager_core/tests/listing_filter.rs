use chrono::NaiveDate;
use event_manager_core::db::open_db_in_memory;
use event_manager_core::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use event_manager_core::repo::event_repo::{EventRepository, SqliteEventRepository};
use event_manager_core::service::listing_service::ListingService;
use event_manager_core::{Event, EventDate, EventId, EventStatus, ListingParams, NewCategory};
use rusqlite::Connection;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 4, 10).unwrap()
}

fn insert(conn: &Connection, title: &str, date: Option<&str>, status: EventStatus) -> EventId {
    let repo = SqliteEventRepository::try_new(conn).unwrap();
    let mut event = Event::new(title);
    event.date = date.map(|raw| EventDate::parse(raw).unwrap());
    event.status = status;
    repo.create_event(&event).unwrap()
}

fn titles(conn: &Connection, params: &ListingParams) -> Vec<String> {
    let service = ListingService::new(SqliteEventRepository::try_new(conn).unwrap());
    service
        .list_events(params, today())
        .unwrap()
        .into_iter()
        .map(|event| event.title)
        .collect()
}

#[test]
fn only_published_events_are_listed_newest_first() {
    let conn = open_db_in_memory().unwrap();
    insert(&conn, "Old", Some("2026-01-01"), EventStatus::Publish);
    insert(&conn, "Draft", Some("2026-05-01"), EventStatus::Draft);
    insert(&conn, "Private", None, EventStatus::Private);
    insert(&conn, "Trashed", None, EventStatus::Trash);
    insert(&conn, "Undated", None, EventStatus::Publish);

    let listed = titles(&conn, &ListingParams::default());
    assert_eq!(listed, vec!["Undated".to_string(), "Old".to_string()]);
}

#[test]
fn upcoming_keeps_today_and_later_sorted_by_date() {
    let conn = open_db_in_memory().unwrap();
    insert(&conn, "Past", Some("2026-04-09"), EventStatus::Publish);
    insert(&conn, "Later", Some("2026-06-01"), EventStatus::Publish);
    insert(&conn, "Undated", None, EventStatus::Publish);
    insert(&conn, "Today", Some("2026-04-10"), EventStatus::Publish);
    insert(&conn, "Soon", Some("2026-04-15"), EventStatus::Publish);

    let listed = titles(&conn, &ListingParams::new(10, None, true));
    assert_eq!(
        listed,
        vec!["Today".to_string(), "Soon".to_string(), "Later".to_string()]
    );
}

#[test]
fn default_page_size_limits_to_five() {
    let conn = open_db_in_memory().unwrap();
    for index in 0..8 {
        insert(&conn, &format!("Event {index}"), None, EventStatus::Publish);
    }

    assert_eq!(titles(&conn, &ListingParams::new(0, None, false)).len(), 5);
    assert_eq!(
        titles(&conn, &ListingParams::from_attributes([("posts_per_page", "abc")])).len(),
        5
    );
    assert_eq!(titles(&conn, &ListingParams::new(3, None, false)).len(), 3);
}

#[test]
fn category_filter_matches_slug_and_descendants() {
    let conn = open_db_in_memory().unwrap();
    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();
    let music = categories.create_category(&NewCategory::new("Music")).unwrap();
    let jazz = categories
        .create_category(&NewCategory::new("Jazz").with_parent(music.id))
        .unwrap();
    let talks = categories.create_category(&NewCategory::new("Talks")).unwrap();

    let concert = insert(&conn, "Concert", None, EventStatus::Publish);
    let jam = insert(&conn, "Jam", None, EventStatus::Publish);
    let lecture = insert(&conn, "Lecture", None, EventStatus::Publish);
    let hidden = insert(&conn, "Hidden Gig", None, EventStatus::Draft);
    categories.assign_event_categories(concert, &[music.id]).unwrap();
    categories.assign_event_categories(jam, &[jazz.id]).unwrap();
    categories.assign_event_categories(lecture, &[talks.id]).unwrap();
    categories.assign_event_categories(hidden, &[music.id]).unwrap();

    let music_listing = titles(&conn, &ListingParams::new(10, Some("music"), false));
    assert_eq!(music_listing, vec!["Jam".to_string(), "Concert".to_string()]);

    let jazz_listing = titles(&conn, &ListingParams::new(10, Some(" jazz "), false));
    assert_eq!(jazz_listing, vec!["Jam".to_string()]);
}

#[test]
fn unknown_category_slug_yields_empty_listing() {
    let conn = open_db_in_memory().unwrap();
    insert(&conn, "Concert", None, EventStatus::Publish);

    let listed = titles(&conn, &ListingParams::new(5, Some("does-not-exist"), false));
    assert!(listed.is_empty());
}

#[test]
fn blank_category_slug_means_no_filter() {
    let conn = open_db_in_memory().unwrap();
    insert(&conn, "Concert", None, EventStatus::Publish);

    let listed = titles(&conn, &ListingParams::from_attributes([("event_type", "  ")]));
    assert_eq!(listed, vec!["Concert".to_string()]);
}
