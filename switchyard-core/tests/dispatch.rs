use switchyard_core::{
    Action, Args, BoxError, Collector, ConfigurationError, Controller, DispatchError, Dispatcher,
    Group, Operation, Signature, TargetRef, handler,
};

fn render(args: Args) -> Result<String, BoxError> {
    Ok(args
        .values()
        .map(|v| v.unwrap_or("-"))
        .collect::<Vec<_>>()
        .join(","))
}

fn echo(tag: &'static str, sig: &[&str]) -> Action<String> {
    Action::handler(handler(Signature::of(sig), move |args| {
        Ok(format!("{tag}({})", render(args)?))
    }))
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_static_routes_resolve_with_empty_captures() {
    let mut routes = Collector::new();
    routes.get("/", echo("home", &[])).unwrap();
    routes.get("/about/team", echo("team", &[])).unwrap();
    routes.post("contact", echo("contact", &[])).unwrap();
    let dispatcher = routes.into_dispatcher();

    for (method, path) in [("get", "/"), ("get", "/about/team"), ("post", "/contact")] {
        let found = dispatcher.resolve(method, path).unwrap();
        assert!(found.route.is_static());
        assert!(found.params.is_empty());
    }
    assert_eq!(dispatcher.dispatch("GET", "").unwrap(), "home()");
}

#[test]
fn test_optional_segments() {
    let mut routes = Collector::new();
    routes
        .get("/user/{id}[/{name}]", echo("user", &["id", "name?"]))
        .unwrap();
    let dispatcher = routes.into_dispatcher();

    let short = dispatcher.resolve("get", "/user/18").unwrap();
    assert_eq!(short.params.get("id"), Some("18"));
    assert!(!short.params.contains("name"));

    let long = dispatcher.resolve("get", "/user/18/alex").unwrap();
    assert_eq!(
        long.params.iter().collect::<Vec<_>>(),
        [("id", "18"), ("name", "alex")]
    );

    assert!(dispatcher.resolve("get", "/user/").unwrap_err().is_not_found());
    assert_eq!(dispatcher.dispatch("get", "/user/18").unwrap(), "user(18,-)");
}

#[test]
fn test_nested_optional_segments() {
    let mut routes = Collector::new();
    routes
        .get(
            "/user/{id}[/{name}[/{extra}]]",
            echo("user", &["id", "name?", "extra?"]),
        )
        .unwrap();
    let dispatcher = routes.into_dispatcher();

    assert_eq!(dispatcher.dispatch("get", "/user/5").unwrap(), "user(5,-,-)");
    assert_eq!(dispatcher.dispatch("get", "/user/5/alex").unwrap(), "user(5,alex,-)");
    assert_eq!(dispatcher.dispatch("get", "/user/5/alex/x").unwrap(), "user(5,alex,x)");
}

#[test]
fn test_constraint_rejects_non_matching_segment() {
    let mut routes = Collector::new();
    routes.get("/a/{x:\\d+}", echo("a", &["x"])).unwrap();
    let dispatcher = routes.into_dispatcher();

    assert!(dispatcher.resolve("get", "/a/foo").unwrap_err().is_not_found());
    assert_eq!(dispatcher.resolve("get", "/a/7").unwrap().params.get("x"), Some("7"));
}

#[test]
fn test_digit_constraint_rejects_non_ascii_digits() {
    let mut routes = Collector::new();
    routes.get("/a/{x:\\d+}", echo("a", &["x"])).unwrap();
    let dispatcher = routes.into_dispatcher();

    assert!(dispatcher.dispatch("get", "/a/\u{0663}").unwrap_err().is_not_found());
    assert_eq!(dispatcher.dispatch("get", "/a/3").unwrap(), "a(3)");
}

#[test]
fn test_request_path_starting_with_bracket_gets_leading_slash() {
    let mut routes = Collector::new();
    routes.get("/{raw:\\[.*\\]}", echo("raw", &["raw"])).unwrap();
    let dispatcher = routes.into_dispatcher();

    assert_eq!(dispatcher.dispatch("get", "[x]").unwrap(), "raw([x])");
    match dispatcher.dispatch("post", "[x]") {
        Err(DispatchError::MethodNotAllowed(err)) => assert_eq!(err.requested_path, "[x]"),
        other => panic!("expected MethodNotAllowed, got {other:?}"),
    }
}

#[test]
fn test_first_registered_dynamic_route_wins() {
    let mut routes = Collector::new();
    routes.get("/post/{slug}", echo("slug", &["slug"])).unwrap();
    routes.get("/post/{id:\\d+}", echo("id", &["id"])).unwrap();
    let dispatcher = routes.into_dispatcher();

    assert_eq!(dispatcher.dispatch("get", "/post/42").unwrap(), "slug(42)");
}

// ============================================================================
// 404 vs 405
// ============================================================================

#[test]
fn test_not_found_echoes_request() {
    let dispatcher = Collector::<String>::new().into_dispatcher();

    match dispatcher.dispatch("DELETE", "/nothing/here") {
        Err(DispatchError::NotFound(err)) => {
            assert_eq!(err.requested_method, "delete");
            assert_eq!(err.requested_path, "/nothing/here");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_method_not_allowed() {
    let mut routes = Collector::new();
    routes.get("/user/{id}", echo("user", &["id"])).unwrap();
    let dispatcher = routes.into_dispatcher();

    match dispatcher.dispatch("post", "/user/18") {
        Err(DispatchError::MethodNotAllowed(err)) => {
            assert_eq!(err.allowed_methods.iter().collect::<Vec<_>>(), ["get"]);
            assert!(err.can("get"));
            assert!(!err.can("post"));
        }
        other => panic!("expected MethodNotAllowed, got {other:?}"),
    }
}

#[test]
fn test_allowed_methods_are_sorted_and_deduplicated() {
    let mut routes = Collector::new();
    routes.put("/doc/{id}", echo("put", &["id"])).unwrap();
    routes.get("/doc/{id}", echo("get", &["id"])).unwrap();
    routes.get("/doc/{slug}", echo("get2", &["slug"])).unwrap();
    let dispatcher = routes.into_dispatcher();

    let err = dispatcher.resolve("patch", "/doc/1").unwrap_err();
    match err {
        DispatchError::MethodNotAllowed(err) => {
            assert_eq!(err.allowed_methods.iter().collect::<Vec<_>>(), ["get", "put"]);
        }
        other => panic!("expected MethodNotAllowed, got {other:?}"),
    }
}

// ============================================================================
// Targets
// ============================================================================

struct Articles {
    operations: Vec<Operation>,
}

impl Articles {
    fn new() -> Self {
        Self {
            operations: vec![
                Operation::new("show", Signature::of(["id", "format=html"])),
                Operation::new("archive", Signature::of(["year", "month"])),
            ],
        }
    }
}

impl Controller<String> for Articles {
    fn name(&self) -> &str {
        "Articles"
    }

    fn operations(&self) -> &[Operation] {
        &self.operations
    }

    fn call(&self, member: &str, args: Args) -> Result<String, BoxError> {
        Ok(format!("{member}({})", render(args)?))
    }
}

#[test]
fn test_descriptor_targets_are_instantiated() {
    let mut routes = Collector::<String>::new();
    routes.target("Articles", Articles::new);
    routes.get("/article/{id:\\d+}[.{format}]", "Articles#show").unwrap();
    let dispatcher = routes.into_dispatcher();

    assert_eq!(dispatcher.dispatch("get", "/article/3").unwrap(), "show(3,html)");
    assert_eq!(dispatcher.dispatch("get", "/article/3.json").unwrap(), "show(3,json)");
}

#[test]
fn test_arguments_follow_declared_order() {
    let mut routes = Collector::<String>::new();
    routes
        .get(
            "/archive/{month}/{year}",
            (TargetRef::instance(Articles::new()), "archive"),
        )
        .unwrap();
    let dispatcher = routes.into_dispatcher();

    assert_eq!(
        dispatcher.dispatch("get", "/archive/05/2024").unwrap(),
        "archive(2024,05)"
    );
}

#[test]
fn test_missing_required_argument_is_configuration_error() {
    let mut routes = Collector::<String>::new();
    routes
        .get("/archive/{year}", (TargetRef::instance(Articles::new()), "archive"))
        .unwrap();
    let dispatcher = routes.into_dispatcher();

    let err = dispatcher.dispatch("get", "/archive/2024").unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Configuration(ConfigurationError::MissingDefault { ref param })
            if param == "month"
    ));
}

#[test]
fn test_namespaced_targets() {
    let mut routes = Collector::<String>::new();
    routes.target("Admin::Articles", Articles::new);
    routes
        .group(Group::new().prefix("/admin").namespace("Admin"), |r| {
            r.get("/article/{id}", "Articles#show")?;
            Ok(())
        })
        .unwrap();
    routes.get("/article/{id}", "Articles#show").unwrap();
    let dispatcher = routes.into_dispatcher();

    assert_eq!(
        dispatcher.dispatch("get", "/admin/article/1").unwrap(),
        "show(1,html)"
    );
    match dispatcher.dispatch("get", "/article/1") {
        Err(DispatchError::Configuration(ConfigurationError::UnknownTarget { name, available })) => {
            assert_eq!(name, "Articles");
            assert_eq!(available, vec!["Admin::Articles".to_string()]);
        }
        other => panic!("expected UnknownTarget, got {other:?}"),
    }
}

// Callers can stay generic over the output type without requiring `'static`.
fn dispatch_each<R>(dispatcher: &Dispatcher<R>, paths: &[&str]) -> Vec<Result<R, DispatchError>> {
    paths.iter().map(|path| dispatcher.dispatch("get", path)).collect()
}

#[test]
fn test_dispatch_from_generic_caller() {
    let mut routes = Collector::new();
    routes.get("/n/{n}", echo("n", &["n"])).unwrap();
    let dispatcher = routes.into_dispatcher();

    let results = dispatch_each(&dispatcher, &["/n/1", "/missing"]);
    assert_eq!(results[0].as_ref().unwrap(), "n(1)");
    assert!(results[1].as_ref().unwrap_err().is_not_found());
}

#[test]
fn test_dispatcher_is_shareable_across_threads() {
    let mut routes = Collector::new();
    routes.get("/n/{n:\\d+}", echo("n", &["n"])).unwrap();
    let dispatcher = std::sync::Arc::new(routes.into_dispatcher());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let dispatcher = std::sync::Arc::clone(&dispatcher);
            std::thread::spawn(move || dispatcher.dispatch("get", &format!("/n/{i}")))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap().unwrap(), format!("n({i})"));
    }
}
