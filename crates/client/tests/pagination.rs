//! Lazy paging over `@iot.nextLink`

mod common;

use common::{service, BASE};
use pretty_assertions::assert_eq;
use serde_json::json;
use staplus_client::*;
use std::sync::{Arc, Mutex};

#[test]
fn test_iterates_all_pages_then_stops() -> anyhow::Result<()> {
    let (service, mock) = service();
    let next = format!("{}/Parties?$skip=2", BASE);
    mock.push_json(
        200,
        json!({
            "value": [
                {"@iot.id": "a", "displayName": "A"},
                {"@iot.id": "b", "displayName": "B"}
            ],
            "@iot.nextLink": next
        }),
    )
    .push_json(200, json!({"value": [{"@iot.id": "c", "displayName": "C"}]}));

    let parties = service.parties().query().fetch_many()?;
    assert_eq!(parties.len(), 2);
    assert_eq!(mock.requests().len(), 1);

    let names: Vec<String> = parties
        .into_iter()
        .map(|p| p.map(|p| p.display_name().cloned().unwrap_or_default()))
        .collect::<Result<_>>()?;
    assert_eq!(names, vec!["A", "B", "C"]);

    let urls = mock.request_urls();
    assert_eq!(urls.len(), 2);
    assert_eq!(urls[0], format!("{}/Parties", BASE));
    assert_eq!(urls[1], next);
    Ok(())
}

#[test]
fn test_fetched_pages_are_attached() -> anyhow::Result<()> {
    let (service, mock) = service();
    mock.push_json(
        200,
        json!({"value": [], "@iot.nextLink": format!("{}/Things?$skip=100", BASE)}),
    )
    .push_json(200, json!({"value": [{"@iot.id": 9, "name": "late"}]}));

    let mut iter = service.things().query().fetch_many()?.into_iter();
    let thing = iter.next().expect("one thing")?;
    assert!(thing.service().map(|s| s.ptr_eq(&service)).unwrap_or(false));
    assert!(iter.next().is_none());
    assert_eq!(mock.requests().len(), 2);
    Ok(())
}

#[test]
fn test_progress_callback_every_step() -> anyhow::Result<()> {
    let (service, mock) = service();
    let items: Vec<_> = (0..4).map(|i| json!({"@iot.id": i})).collect();
    mock.push_json(
        200,
        json!({"value": items[..3].to_vec(), "@iot.nextLink": format!("{}/Observations?$skip=3", BASE)}),
    )
    .push_json(200, json!({"value": items[3..].to_vec()}));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let observations = service
        .observations()
        .query()
        .fetch_many_with_progress(move |idx| sink.lock().unwrap().push(idx), 2)?;

    let count = observations.into_iter().collect::<Result<Vec<_>>>()?.len();
    assert_eq!(count, 4);
    assert_eq!(*seen.lock().unwrap(), vec![0, 2]);
    Ok(())
}

#[test]
fn test_continuation_error_surfaces_and_ends() -> anyhow::Result<()> {
    let (service, mock) = service();
    mock.push_json(
        200,
        json!({"value": [{"@iot.id": 1}], "@iot.nextLink": format!("{}/Sensors?$skip=1", BASE)}),
    )
    .push_json(500, json!({"code": 500, "message": "database went away"}));

    let mut iter = service.sensors().query().fetch_many()?.into_iter();
    assert!(iter.next().expect("first sensor").is_ok());

    match iter.next() {
        Some(Err(StaplusError::Server { status, message, .. })) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database went away");
        }
        other => panic!("expected a server error, got {:?}", other.map(|r| r.map(|_| ()))),
    }
    assert!(iter.next().is_none());
    assert_eq!(mock.requests().len(), 2);
    Ok(())
}

#[test]
fn test_continuation_with_broken_json_is_malformed() -> anyhow::Result<()> {
    let (service, mock) = service();
    mock.push_json(
        200,
        json!({"value": [], "@iot.nextLink": format!("{}/Licenses?$skip=1", BASE)}),
    )
    .push(HttpResponse::new(200, "<html>gateway</html>"));

    let mut iter = service.licenses().query().fetch_many()?.into_iter();
    let err = iter.next().expect("an error").unwrap_err();
    assert!(err.is_malformed_response(), "{}", err);
    Ok(())
}

#[test]
fn test_load_all_collects_in_memory() -> anyhow::Result<()> {
    let (service, mock) = service();
    mock.push_json(
        200,
        json!({
            "value": [{"@iot.id": 1}],
            "@iot.count": 3,
            "@iot.nextLink": format!("{}/Campaigns?$skip=1", BASE)
        }),
    )
    .push_json(
        200,
        json!({"value": [{"@iot.id": 2}], "@iot.nextLink": format!("{}/Campaigns?$skip=2", BASE)}),
    )
    .push_json(200, json!({"value": [{"@iot.id": 3}]}));

    let mut campaigns = service.campaigns().query().count(true).fetch_many()?;
    assert_eq!(campaigns.count(), Some(3));

    campaigns.load_all()?;
    let ids: Vec<_> = campaigns.entities().iter().filter_map(|c| c.id().cloned()).collect();
    assert_eq!(ids, vec![Id::Int(1), Id::Int(2), Id::Int(3)]);
    assert_eq!(campaigns.next_link(), None);
    assert_eq!(mock.requests().len(), 3);
    Ok(())
}

#[test]
fn test_dropped_service_detaches_iteration() -> anyhow::Result<()> {
    let (service, mock) = service();
    mock.push_json(
        200,
        json!({"value": [], "@iot.nextLink": format!("{}/Things?$skip=1", BASE)}),
    );

    let things = service.things().query().fetch_many()?;
    drop(service);

    let mut iter = things.into_iter();
    assert!(matches!(iter.next(), Some(Err(StaplusError::Detached(_)))));
    assert_eq!(mock.requests().len(), 1);
    Ok(())
}
