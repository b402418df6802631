use super::*;

#[test]
fn join_location_adds_separators_once() {
    assert_eq!(join_location("/auth", "?a=1", "#top"), "/auth?a=1#top");
    assert_eq!(join_location("/auth", "a=1", "top"), "/auth?a=1#top");
}

#[test]
fn join_location_skips_empty_parts() {
    assert_eq!(join_location("/", "", ""), "/");
    assert_eq!(join_location("/", "?", "#"), "/");
}

#[test]
fn pathname_of_strips_query_and_fragment() {
    assert_eq!(pathname_of("/register?x=1"), "/register");
    assert_eq!(pathname_of("/register#form"), "/register");
    assert_eq!(pathname_of("/"), "/");
}

#[test]
fn memory_router_records_transitions() {
    let router = MemoryRouter::new("/?token=abc");
    assert_eq!(router.pathname(), "/");
    router.replace("/");
    router.navigate("/auth");
    assert_eq!(router.location(), "/auth");
    assert_eq!(
        router.history(),
        vec![RouteChange::Replace("/".to_owned()), RouteChange::Navigate("/auth".to_owned())]
    );
}

#[test]
fn memory_router_visit_is_not_recorded() {
    let router = MemoryRouter::default();
    router.visit("/profile");
    assert_eq!(router.pathname(), "/profile");
    assert!(router.history().is_empty());
}
