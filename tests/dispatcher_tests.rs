use http::Method;
use std::sync::{Arc, Mutex};
use switchyard::{Handler, HandlerRequest, HandlerResponse, Router};

fn greeting(_req: &HandlerRequest, res: &mut HandlerResponse) {
    *res = HandlerResponse::json(200, serde_json::json!({ "greeting": "hi, switchyard" }));
}

fn dispatch(router: &Router, method: Method, path: &str) -> (HandlerRequest, HandlerResponse) {
    let mut req = HandlerRequest::new(method, path);
    let mut res = HandlerResponse::default();
    router.dispatch(&mut req, &mut res);
    (req, res)
}

#[test]
fn dispatch_invokes_matched_handler() {
    let router = Router::new();
    router.get("/hi", greeting);

    let (_req, res) = dispatch(&router, Method::GET, "/hi");
    assert_eq!(res.status, 200);
    assert_eq!(res.body["greeting"], "hi, switchyard");
    assert_eq!(res.get_header("content-type"), Some("application/json"));
}

#[test]
fn exact_match_dispatch_leaves_params_absent() {
    let router = Router::new();
    router.get("/hi", |req: &HandlerRequest, res: &mut HandlerResponse| {
        assert!(req.params().is_none());
        assert!(req.params_map().is_none());
        res.status = 204;
    });

    let (_req, res) = dispatch(&router, Method::GET, "/hi");
    assert_eq!(res.status, 204);
}

#[test]
fn params_are_attached_for_pattern_routes() {
    let router = Router::new();
    router.get(
        "/users/:user/events",
        |req: &HandlerRequest, res: &mut HandlerResponse| {
            let user = req.param("user").unwrap_or("").to_string();
            *res = HandlerResponse::json(200, serde_json::json!({ "user": user }));
        },
    );

    let (req, res) = dispatch(&router, Method::GET, "/users/alice/events");
    assert_eq!(res.body["user"], "alice");
    assert_eq!(req.param("user"), Some("alice"));
    assert_eq!(
        req.params_map().unwrap().get("user").map(String::as_str),
        Some("alice")
    );
}

#[test]
fn duplicate_param_names_read_last_write_wins() {
    let router = Router::new();
    router.get("/orgs/:name/teams/:name", |req: &HandlerRequest, res: &mut HandlerResponse| {
        *res = HandlerResponse::json(
            200,
            serde_json::json!({ "name": req.param("name").unwrap_or("") }),
        );
    });

    let (_req, res) = dispatch(&router, Method::GET, "/orgs/acme/teams/platform");
    assert_eq!(res.body["name"], "platform");
}

#[test]
fn middleware_wraps_in_registration_order() {
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let router = Router::new();
    for (label_in, label_out) in [("first-in", "first-out"), ("second-in", "second-out")] {
        let log = Arc::clone(&log);
        router.use_middleware(move |next: Handler| -> Handler {
            let log = Arc::clone(&log);
            Arc::new(move |req: &HandlerRequest, res: &mut HandlerResponse| {
                log.lock().unwrap().push(label_in);
                next(req, res);
                log.lock().unwrap().push(label_out);
            })
        });
    }
    {
        let log = Arc::clone(&log);
        router.get("/chain", move |_req: &HandlerRequest, res: &mut HandlerResponse| {
            log.lock().unwrap().push("handler");
            res.status = 200;
        });
    }

    let _ = dispatch(&router, Method::GET, "/chain");
    assert_eq!(
        *log.lock().unwrap(),
        vec!["first-in", "second-in", "handler", "second-out", "first-out"]
    );
}

#[test]
fn middleware_snapshot_is_captured_at_registration() {
    let hits = Arc::new(Mutex::new(0u32));

    let router = Router::new();
    router.get("/before", |_req: &HandlerRequest, res: &mut HandlerResponse| {
        res.status = 200;
    });

    {
        let hits = Arc::clone(&hits);
        router.use_middleware(move |next: Handler| -> Handler {
            let hits = Arc::clone(&hits);
            Arc::new(move |req: &HandlerRequest, res: &mut HandlerResponse| {
                *hits.lock().unwrap() += 1;
                next(req, res);
            })
        });
    }

    router.get("/after", |_req: &HandlerRequest, res: &mut HandlerResponse| {
        res.status = 200;
    });

    let _ = dispatch(&router, Method::GET, "/before");
    assert_eq!(*hits.lock().unwrap(), 0, "earlier route must keep its empty snapshot");

    let _ = dispatch(&router, Method::GET, "/after");
    assert_eq!(*hits.lock().unwrap(), 1);
}

#[test]
fn group_shares_parent_middleware_list() {
    let hits = Arc::new(Mutex::new(0u32));

    let router = Router::new();
    let group = router.group("/api");
    {
        let hits = Arc::clone(&hits);
        group.use_middleware(move |next: Handler| -> Handler {
            let hits = Arc::clone(&hits);
            Arc::new(move |req: &HandlerRequest, res: &mut HandlerResponse| {
                *hits.lock().unwrap() += 1;
                next(req, res);
            })
        });
    }

    // Registered through the parent after the group appended middleware:
    // the shared list applies.
    router.get("/direct", |_req: &HandlerRequest, res: &mut HandlerResponse| {
        res.status = 200;
    });
    let _ = dispatch(&router, Method::GET, "/direct");
    assert_eq!(*hits.lock().unwrap(), 1);
}

#[test]
fn not_found_handler_receives_unmatched_requests() {
    let router = Router::new();
    router.get("/hi", greeting);
    router.not_found(|req: &HandlerRequest, res: &mut HandlerResponse| {
        *res = HandlerResponse::json(404, serde_json::json!({ "missing": req.path.clone() }));
    });

    let (_req, res) = dispatch(&router, Method::GET, "/nope");
    assert_eq!(res.status, 404);
    assert_eq!(res.body["missing"], "/nope");
}

#[test]
fn not_found_runs_through_current_middleware() {
    let hits = Arc::new(Mutex::new(0u32));

    let router = Router::new();
    {
        let hits = Arc::clone(&hits);
        router.use_middleware(move |next: Handler| -> Handler {
            let hits = Arc::clone(&hits);
            Arc::new(move |req: &HandlerRequest, res: &mut HandlerResponse| {
                *hits.lock().unwrap() += 1;
                next(req, res);
            })
        });
    }
    router.not_found(|_req: &HandlerRequest, res: &mut HandlerResponse| {
        res.status = 404;
    });

    let (_req, res) = dispatch(&router, Method::GET, "/nope");
    assert_eq!(res.status, 404);
    assert_eq!(*hits.lock().unwrap(), 1);
}

#[test]
fn generic_backstop_when_no_not_found_handler() {
    let router = Router::new();
    let (_req, res) = dispatch(&router, Method::GET, "/nope");
    assert_eq!(res.status, 404);
    assert_eq!(res.body["error"], "404 page not found");
}

#[test]
fn fault_handler_receives_panic_payload() {
    let router = Router::new();
    router.get("/boom", |_req: &HandlerRequest, _res: &mut HandlerResponse| {
        panic!("boom");
    });
    router.fault_handler(|req: &HandlerRequest, res: &mut HandlerResponse, payload| {
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .unwrap_or("unknown fault");
        *res = HandlerResponse::json(
            500,
            serde_json::json!({ "fault": message, "path": req.path.clone() }),
        );
    });

    let (_req, res) = dispatch(&router, Method::GET, "/boom");
    assert_eq!(res.status, 500);
    assert_eq!(res.body["fault"], "boom");
    assert_eq!(res.body["path"], "/boom");
}

#[test]
fn fault_in_middleware_is_also_isolated() {
    let router = Router::new();
    router.use_middleware(|_next: Handler| -> Handler {
        Arc::new(|_req: &HandlerRequest, _res: &mut HandlerResponse| {
            panic!("middleware fault");
        })
    });
    router.get("/mw", |_req: &HandlerRequest, res: &mut HandlerResponse| {
        res.status = 200;
    });
    router.fault_handler(|_req: &HandlerRequest, res: &mut HandlerResponse, _payload| {
        res.status = 500;
    });

    let (_req, res) = dispatch(&router, Method::GET, "/mw");
    assert_eq!(res.status, 500);
}

#[test]
fn fault_propagates_without_fault_handler() {
    let router = Router::new();
    router.get("/boom", |_req: &HandlerRequest, _res: &mut HandlerResponse| {
        panic!("unhandled");
    });

    let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = dispatch(&router, Method::GET, "/boom");
    }));
    assert!(caught.is_err());
}
