use chrono::{TimeZone, Utc};
use pointstore_core::{
    Condition, CreatedAtInput, DiscourseService, MessageInput, Point, PointStore,
    SearchOptions, Selector, SortField, DEFAULT_PAGE_SIZE,
};

fn service() -> DiscourseService {
    let service = DiscourseService::open_in_memory("test://author").unwrap();
    service.init().unwrap();
    service
}

fn unsaved(id: &str, content: &str) -> Point {
    Point {
        id: Some(id.to_string()),
        content: Some(content.to_string()),
        ..Point::default()
    }
}

fn store_of(points: Vec<Point>) -> PointStore {
    points
        .into_iter()
        .map(|point| (point.id.clone().unwrap(), point))
        .collect()
}

fn add_message_at(service: &DiscourseService, main: &str, millis: i64) -> String {
    let mut input = MessageInput::with_main(main);
    input.created_at = Some(CreatedAtInput::Timestamp(
        Utc.timestamp_millis_opt(millis).unwrap(),
    ));
    let points = match service.get_point(main) {
        Ok(saved) => store_of(vec![saved]),
        Err(_) => store_of(vec![unsaved(main, "shared point")]),
    };
    service.add_message(&input, &points).unwrap()
}

#[test]
fn content_search_returns_newest_first() {
    let service = service();

    let mut one = unsaved("one", "Hello world");
    one.created_at = Some(1000);
    let mut two = unsaved("two", "Goodbye world");
    two.created_at = Some(2000);
    service.add_point(&one).unwrap();
    service.add_point(&two).unwrap();

    let world = service
        .search_points_by_content("world", &SearchOptions::default())
        .unwrap();
    let ids: Vec<&str> = world.iter().filter_map(|p| p.id.as_deref()).collect();
    assert_eq!(ids, vec!["two", "one"]);

    let hello = service
        .search_points_by_content("hello", &SearchOptions::default())
        .unwrap();
    let ids: Vec<&str> = hello.iter().filter_map(|p| p.id.as_deref()).collect();
    assert_eq!(ids, vec!["one"]);
}

#[test]
fn content_search_is_conjunctive_and_case_insensitive() {
    let service = service();

    service.add_point(&unsaved("both", "red and blue")).unwrap();
    service.add_point(&unsaved("red", "red only")).unwrap();

    let hits = service
        .search_points_by_content("BLUE red", &SearchOptions::default())
        .unwrap();
    let ids: Vec<&str> = hits.iter().filter_map(|p| p.id.as_deref()).collect();
    assert_eq!(ids, vec!["both"]);
}

#[test]
fn blank_content_query_returns_nothing() {
    let service = service();
    service.add_point(&unsaved("one", "anything")).unwrap();

    assert!(service
        .search_points_by_content("", &SearchOptions::default())
        .unwrap()
        .is_empty());
    assert!(service
        .search_points_by_content("!!! ...", &SearchOptions::default())
        .unwrap()
        .is_empty());
}

#[test]
fn content_search_never_returns_messages() {
    let service = service();

    // Message content lives in its points; the message document itself
    // must not leak into point search even though it shares the store.
    let mut input = MessageInput::with_main("p");
    input.created_at = Some(CreatedAtInput::Timestamp(
        Utc.timestamp_millis_opt(1000).unwrap(),
    ));
    service
        .add_message(&input, &store_of(vec![unsaved("p", "hello world")]))
        .unwrap();

    let hits = service
        .search_points_by_content("hello", &SearchOptions::default())
        .unwrap();
    let ids: Vec<&str> = hits.iter().filter_map(|p| p.id.as_deref()).collect();
    assert_eq!(ids, vec!["p"]);
}

#[test]
fn time_range_selector_filters_messages() {
    let service = service();

    add_message_at(&service, "p", 10);
    let mid = add_message_at(&service, "p", 2000);
    let late = add_message_at(&service, "p", 3000);

    let selector = Selector::new().field("createdAt", Condition::gt(100));
    let results = service
        .search_messages(selector, &SearchOptions::default())
        .unwrap();

    let ids: Vec<&str> = results.iter().map(|m| m.id.as_str()).collect();
    // Default sort surfaces the newest message first.
    assert_eq!(ids, vec![late.as_str(), mid.as_str()]);
    assert_eq!(results[0].created_at.timestamp_millis(), 3000);
}

#[test]
fn message_search_rehydrates_fields() {
    let service = service();

    let id = add_message_at(&service, "p", 2000);
    let results = service
        .search_messages(Selector::new(), &SearchOptions::default())
        .unwrap();

    assert_eq!(results.len(), 1);
    let message = &results[0];
    assert_eq!(message.id, id);
    assert_eq!(message.author, "test://author");
    assert_eq!(message.main, "p");
    assert_eq!(message.created_at.timestamp_millis(), 2000);
}

#[test]
fn message_search_ignores_points_and_the_author_record() {
    let service = service();

    service.add_point(&unsaved("p", "a point")).unwrap();
    service.get_author_info().unwrap();
    add_message_at(&service, "p", 1000);

    let results = service
        .search_messages(Selector::new(), &SearchOptions::default())
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn default_page_size_caps_unbounded_searches() {
    let service = service();

    for n in 0..(DEFAULT_PAGE_SIZE + 3) {
        add_message_at(&service, "p", 1000 + i64::from(n));
    }

    let page = service
        .search_messages(Selector::new(), &SearchOptions::default())
        .unwrap();
    assert_eq!(page.len(), DEFAULT_PAGE_SIZE as usize);

    let rest = service
        .search_messages(
            Selector::new(),
            &SearchOptions {
                skip: Some(DEFAULT_PAGE_SIZE),
                ..SearchOptions::default()
            },
        )
        .unwrap();
    assert_eq!(rest.len(), 3);
}

#[test]
fn explicit_sort_overrides_the_default() {
    let service = service();

    let early = add_message_at(&service, "p", 1000);
    add_message_at(&service, "p", 2000);

    let results = service
        .search_messages(
            Selector::new(),
            &SearchOptions {
                sort: Some(vec![SortField::asc("createdAt")]),
                ..SearchOptions::default()
            },
        )
        .unwrap();
    assert_eq!(results[0].id, early);
}

#[test]
fn messages_for_points_match_direct_and_history_references() {
    let service = service();

    // "old" is only reachable through q's reference history, so the
    // denormalized allPoints set is what makes it findable.
    let mut q = unsaved("q", "current version");
    q.reference_history = Some(vec![pointstore_core::PointReference::new("old")]);

    let mut with_q = MessageInput::with_main("p");
    with_q
        .shapes
        .insert("feelings".to_string(), vec!["q".to_string()]);
    with_q.created_at = Some(CreatedAtInput::Timestamp(
        Utc.timestamp_millis_opt(1000).unwrap(),
    ));
    let id_with_q = service
        .add_message(
            &with_q,
            &store_of(vec![unsaved("p", "main"), q, unsaved("old", "superseded")]),
        )
        .unwrap();

    let mut without_q = MessageInput::with_main("other");
    without_q.created_at = Some(CreatedAtInput::Timestamp(
        Utc.timestamp_millis_opt(2000).unwrap(),
    ));
    service
        .add_message(&without_q, &store_of(vec![unsaved("other", "unrelated")]))
        .unwrap();

    let old_point = service.get_point("old").unwrap();
    let results = service
        .search_messages_for_points(&[old_point], &SearchOptions::default())
        .unwrap();

    let ids: Vec<&str> = results.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec![id_with_q.as_str()]);
}

#[test]
fn messages_for_points_with_no_usable_ids_matches_nothing() {
    let service = service();
    add_message_at(&service, "p", 1000);

    assert!(service
        .search_messages_for_points(&[], &SearchOptions::default())
        .unwrap()
        .is_empty());
    assert!(service
        .search_messages_for_points(
            &[Point::with_content("never saved")],
            &SearchOptions::default()
        )
        .unwrap()
        .is_empty());
}
