//! Route table resolution through the public API.

mod common;

use common::*;
use serde_json::json;
use spa_navigator::*;

type Builder = RouteTableBuilder<MemoryContainer>;

#[test]
fn test_exact_paths_ignore_dynamic_registration_order() {
    for dynamic_first in [true, false] {
        let mut builder = Builder::new();
        if dynamic_first {
            builder = builder.route(Route::new("/:section", params_page("section")).name("section"));
        }
        builder = builder
            .route(Route::new("/events", static_page("Events")).name("events"))
            .route(Route::new("/search", static_page("Search")).name("search"));
        if !dynamic_first {
            builder = builder.route(Route::new("/:section", params_page("section")).name("section"));
        }
        let registry = builder.build().unwrap();

        let resolution = registry.resolve("/events");
        assert_eq!(resolution.route_name(), Some("events"));
        assert!(resolution.params().unwrap().is_empty());
        assert_eq!(registry.resolve("/search").route_name(), Some("search"));
        assert_eq!(registry.resolve("/places").route_name(), Some("section"));
    }
}

#[test]
fn test_event_id_with_dashes_does_not_match_place() {
    let registry = Builder::new()
        .route(Route::new("/event/:id", params_page("event")).name("event"))
        .route(Route::new("/place/:id", params_page("place")).name("place"))
        .build()
        .unwrap();

    let resolution = registry.resolve("/event/abc-123");
    assert_eq!(resolution.route_name(), Some("event"));
    assert_param_equals(resolution.params().unwrap(), "id", "abc-123");
    assert_eq!(resolution.params().unwrap().len(), 1);
}

#[test]
fn test_params_reject_unsafe_characters() {
    let registry = Builder::new()
        .register("/event/:id", params_page("event"))
        .build()
        .unwrap();

    assert!(registry.resolve("/event/abc_123-x").is_matched());
    assert!(!registry.resolve("/event/abc.123").is_matched());
    assert!(!registry.resolve("/event/42/tickets").is_matched());
    assert!(!registry.resolve("/event").is_matched());
}

#[test]
fn test_unknown_paths_resolve_to_not_found() {
    let registry = Builder::new()
        .register("/", static_page("Home"))
        .register("/event/:id", params_page("event"))
        .build()
        .unwrap();

    assert!(!registry.resolve("/nonexistent").is_matched());
    assert!(registry.resolve("").is_matched());
}

#[test]
fn test_validation_reports_shadowed_template() {
    let err = Builder::new()
        .register("/user/:username", params_page("user"))
        .register("/user/:id", params_page("user by id"))
        .build()
        .unwrap_err();

    assert_eq!(
        err,
        RouteTableError::Unreachable {
            pattern: "/user/:id".into(),
            shadowed_by: "/user/:username".into(),
        }
    );
}

#[test]
fn test_validation_reports_invalid_regex() {
    let err = Builder::new()
        .route(Route::regex(r"/media/([0-9]+", ["id"], static_page("Media")))
        .build()
        .unwrap_err();
    assert!(matches!(err, RouteTableError::InvalidPattern { .. }));
}

#[test]
fn test_regex_capture_count_must_match_names() {
    let err = Builder::new()
        .route(Route::regex(r"/media/(\d+)/(\d+)", ["id"], static_page("Media")))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("2 capture group(s) but 1 parameter name(s)"));
}

#[tokio::test]
async fn test_event_route_receives_id_param() {
    let transport = MockTransport::new();
    transport.reply("/events", Ok(json!([])));
    let registry = Builder::new()
        .register("/events", fetching_page("events", "/events", "Events"))
        .register("/event/:id", params_page("EventLoader"))
        .build()
        .unwrap();
    let app = TestApp::new(registry, transport);

    let result = app.router.navigate("/event/42").await;

    assert_eq!(
        result,
        NavigationResult::Rendered {
            path: "/event/42".into()
        }
    );
    assert_eq!(app.container.nodes(), vec!["EventLoader id=42"]);
    assert!(app.transport.requested_paths().is_empty());
}

#[test]
fn test_navigate_named_route() {
    let registry = Builder::new()
        .route(Route::new("/event/:id", params_page("event")).name("event"))
        .build()
        .unwrap();
    let app = TestApp::new(registry, MockTransport::new());

    let params = RouteParams::from_pairs([("id", "7")]);
    let result = pollster::block_on(app.router.navigate_named("event", &params)).unwrap();
    assert!(result.is_rendered());
    assert_eq!(app.router.url_for("event", &params).as_deref(), Some("/event/7"));
    assert!(app.container.contains("event id=7"));

    assert!(pollster::block_on(app.router.navigate_named("missing", &params)).is_none());
}
