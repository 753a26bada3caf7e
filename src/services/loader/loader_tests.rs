use super::*;
use crate::model::default_collections;
use serde_json::json;
use std::sync::mpsc;
use std::time::Duration;

#[test]
fn get_by_path_traverses_nested_objects() {
    let v = json!({
        "conditionals_counts": {
            "intrusion": {"alerts": {"0": 1}},
        },
        "meta": {"page": 1}
    });
    assert!(get_by_path(&v, "conditionals_counts.intrusion.alerts").is_some());
    assert_eq!(get_by_path(&v, "meta.page").unwrap().as_i64().unwrap(), 1);
    assert!(get_by_path(&v, "meta.missing").is_none());
    assert!(get_by_path(&v, "").is_none());
}

#[test]
fn collection_calls_follow_configured_endpoints() {
    let cols = default_collections();
    let stats = &cols[0];
    let exps = &cols[1];

    assert_eq!(listing_call(stats).path, "/emulationstatisticsdataids");
    assert_eq!(
        detail_call(stats, "12").unwrap().path,
        "/emulationstatisticsdata/get/12"
    );
    let rm = remove_call(stats, "12").unwrap();
    assert_eq!(rm.method, HttpMethod::Post);
    assert_eq!(rm.path, "/emulationstatisticsdata/remove/12");
    assert!(remove_all_call(stats).is_none());

    let rm = remove_call(exps, "3").unwrap();
    assert_eq!(rm.method, HttpMethod::Delete);
    assert_eq!(rm.path, "/experiments/3");
    let all = remove_all_call(exps).unwrap();
    assert_eq!((all.method, all.path.as_str()), (HttpMethod::Delete, "/experiments"));
}

#[test]
fn inline_collections_have_no_detail_call() {
    let spec = CollectionSpec {
        id: "switches".into(),
        listing: "/emulations/{emulation}/executions/{execution}/switches".into(),
        params: HashMap::from([
            ("emulation".to_string(), "e".to_string()),
            ("execution".to_string(), "2".to_string()),
        ]),
        ..Default::default()
    };
    assert!(detail_call(&spec, "1").is_none());
    assert_eq!(listing_call(&spec).path, "/emulations/e/executions/2/switches");
}

#[test]
fn update_user_call_targets_current_user() {
    let current = SessionData {
        id: "5".into(),
        token: "t".into(),
        ..Default::default()
    };
    let fields = AccountFields {
        username: "u".into(),
        password: "p".into(),
        ..Default::default()
    };
    let call = update_user_call(&AccountEndpoints::default(), &current, &fields);
    assert_eq!(call.method, HttpMethod::Put);
    assert_eq!(call.path, "/users/5");
    assert_eq!(call.body.unwrap()["user"]["username"], "u");
}

#[test]
fn spawn_call_reports_failures_with_their_kind() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = ApiClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let (tx, rx) = mpsc::channel();
    spawn_call(
        client,
        listing_call(&default_collections()[0]),
        None,
        "listing:statistics".into(),
        3,
        LoadKind::Listing {
            tab: 0,
            generation: 9,
        },
        tx,
    );
    let msg = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(msg.key, "listing:statistics");
    assert_eq!(msg.epoch, 3);
    assert!(matches!(
        msg.kind,
        LoadKind::Listing {
            tab: 0,
            generation: 9
        }
    ));
    assert!(matches!(msg.outcome, Err(crate::error::ApiError::Transport(_))));
}
