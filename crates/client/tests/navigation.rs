//! Relationship navigation, lookup and server errors

mod common;

use common::{service, BASE};
use pretty_assertions::assert_eq;
use serde_json::json;
use staplus_client::*;

fn collect<T: Entity>(query: Query<T>) -> staplus_client::Result<Vec<T>> {
    query.fetch_many()?.into_iter().collect()
}

fn observation(service: &Service, id: i64) -> Observation {
    let mut observation = Observation::new().with_result(json!(21.5));
    observation.set_id(Some(Id::Int(id)));
    observation.set_service(Some(service));
    observation
}

#[test]
fn test_relation_roles_from_both_observations() -> anyhow::Result<()> {
    let (service, mock) = service();
    let relation = json!({
        "@iot.id": "r1",
        "role": "derivedFrom",
        "Subject": {"@iot.id": 1},
        "Object": {"@iot.id": 2}
    });
    mock.push_json(200, json!({"value": [relation.clone()]}))
        .push_json(200, json!({"value": []}))
        .push_json(200, json!({"value": [relation]}))
        .push_json(200, json!({"value": []}));

    let subject = observation(&service, 1);
    let object = observation(&service, 2);

    let objects_of_subject = collect(subject.query_objects()?)?;
    let subjects_of_subject = collect(subject.query_subjects()?)?;
    let subjects_of_object = collect(object.query_subjects()?)?;
    let objects_of_object = collect(object.query_objects()?)?;

    assert_eq!(objects_of_subject.len(), 1);
    assert_eq!(objects_of_subject[0].id(), Some(&Id::from("r1")));
    assert_eq!(
        objects_of_subject[0].subject().and_then(|o| o.id()),
        Some(&Id::Int(1))
    );
    assert!(subjects_of_subject.is_empty());
    assert_eq!(subjects_of_object.len(), 1);
    assert_eq!(subjects_of_object[0].role().map(String::as_str), Some("derivedFrom"));
    assert!(objects_of_object.is_empty());

    assert_eq!(
        mock.request_urls(),
        vec![
            format!("{}/Observations(1)/Objects", BASE),
            format!("{}/Observations(1)/Subjects", BASE),
            format!("{}/Observations(2)/Subjects", BASE),
            format!("{}/Observations(2)/Objects", BASE),
        ]
    );
    Ok(())
}

#[test]
fn test_role_views_from_a_relation() -> anyhow::Result<()> {
    let (service, mock) = service();
    mock.push_json(200, json!({"@iot.id": 1, "result": 3}))
        .push_json(200, json!({"value": [{"@iot.id": "r1"}]}));

    let mut relation = Relation::new();
    relation.set_id(Some(Id::from("r1")));

    let subject = service.subject().for_parent(&relation)?.query().fetch_one()?;
    assert_eq!(subject.id(), Some(&Id::Int(1)));
    assert!(subject.service().is_some());

    let observation = observation(&service, 9);
    let objects = service.objects().for_parent(&observation)?.query().fetch_many()?;
    assert_eq!(objects.len(), 1);

    assert_eq!(
        mock.request_urls(),
        vec![
            format!("{}/Relations('r1')/Subject", BASE),
            format!("{}/Observations(9)/Objects", BASE),
        ]
    );
    assert_eq!(service.subjects().segment(), "Subjects");
    assert_eq!(service.object().segment(), "Object");
    Ok(())
}

#[test]
fn test_not_found_surfaces_server_message() {
    let (service, mock) = service();
    mock.push_json(404, json!({"code": 404, "type": "error", "message": "not found"}))
        .push_json(404, json!({"code": 404, "type": "error", "message": "not found"}));

    let one = service.things().find(Id::Int(99)).unwrap_err();
    assert_eq!(one.status(), Some(404));
    assert!(one.to_string().contains("not found"));

    let many = service.things().query().fetch_many().unwrap_err();
    assert_eq!(many.status(), Some(404));
    assert!(many.to_string().contains("not found"));
}

#[test]
fn test_error_without_json_body_uses_reason() {
    let (service, mock) = service();
    mock.push(HttpResponse::new(503, ""));

    let err = service.sensors().query().fetch_many().unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("Service Unavailable"));
}

#[test]
fn test_string_ids_are_quoted_in_paths() -> anyhow::Result<()> {
    let (service, mock) = service();
    mock.push_json(200, json!({"value": []}));

    let mut party = Party::new();
    party.set_id(Some(Id::from("o'neil")));
    party.set_service(Some(&service));
    party.query_campaigns()?.fetch_many()?;

    let url = mock.requests()[0].url().clone();
    assert_eq!(url.path(), "/FROST-Server/v1.1/Parties('o''neil')/Campaigns");
    Ok(())
}

#[test]
fn test_reserved_characters_in_ids_stay_in_the_path() -> anyhow::Result<()> {
    let (service, mock) = service();
    mock.push_json(200, json!({"value": []}))
        .push_json(200, json!({"@iot.id": "a/b?c", "name": "CC BY"}));

    let mut party = Party::new();
    party.set_id(Some(Id::from("team#1")));
    party.set_service(Some(&service));
    party.query_campaigns()?.fetch_many()?;

    let license = service.licenses().find("a/b?c")?;
    assert_eq!(license.id(), Some(&Id::from("a/b?c")));

    let urls: Vec<_> = mock.requests().iter().map(|r| r.url().clone()).collect();
    assert_eq!(urls[0].path(), "/FROST-Server/v1.1/Parties('team%231')/Campaigns");
    assert_eq!(urls[0].fragment(), None);
    assert_eq!(urls[1].path(), "/FROST-Server/v1.1/Licenses('a%2Fb%3Fc')");
    assert_eq!(urls[1].query(), None);
    Ok(())
}

#[test]
fn test_query_options_reach_the_url() -> anyhow::Result<()> {
    let (service, mock) = service();
    mock.push_json(200, json!({"@iot.count": 0, "value": []}));

    let mut datastream = Datastream::new();
    datastream.set_id(Some(Id::Int(5)));
    datastream.set_service(Some(&service));

    let list = datastream
        .query_observations()?
        .order_by("phenomenonTime desc")
        .filter("result gt 20")
        .filter("result lt 30")
        .top(50)
        .count(true)
        .fetch_many()?;
    assert_eq!(list.count(), Some(0));

    let url = mock.requests()[0].url().clone();
    assert_eq!(url.path(), "/FROST-Server/v1.1/Datastreams(5)/Observations");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("$filter".to_string(), "(result gt 20) and (result lt 30)".to_string()),
            ("$orderby".to_string(), "phenomenonTime desc".to_string()),
            ("$top".to_string(), "50".to_string()),
            ("$count".to_string(), "true".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn test_navigation_needs_id_and_service() {
    let (service, mock) = service();

    let unsaved = Thing::new().with_name("draft");
    assert!(matches!(
        unsaved.query_datastreams().unwrap_err(),
        StaplusError::Detached("Thing")
    ));

    let mut attached = Thing::new();
    attached.set_service(Some(&service));
    assert!(matches!(
        attached.query_datastreams().unwrap_err(),
        StaplusError::MissingId("Thing")
    ));

    assert!(matches!(
        service.datastreams().for_parent(&unsaved).unwrap_err(),
        StaplusError::MissingId("Thing")
    ));
    assert!(mock.requests().is_empty());
}

#[test]
fn test_fetched_entities_can_navigate() -> anyhow::Result<()> {
    let (service, mock) = service();
    mock.push_json(
        200,
        json!({"@iot.id": 3, "name": "Station", "@iot.selfLink": format!("{}/Things(3)", BASE)}),
    )
    .push_json(200, json!({"@iot.id": "p1", "displayName": "Jo", "role": "individual"}));

    let thing = service.things().find(Id::Int(3))?;
    assert_eq!(thing.name().map(String::as_str), Some("Station"));
    assert_eq!(thing.self_link().map(str::to_string), Some(format!("{}/Things(3)", BASE)));

    let party = thing.query_party()?.fetch_one()?;
    assert_eq!(party.display_name().map(String::as_str), Some("Jo"));
    assert_eq!(
        mock.request_urls(),
        vec![format!("{}/Things(3)", BASE), format!("{}/Things(3)/Party", BASE)]
    );
    Ok(())
}

#[test]
fn test_get_any_by_type_name() -> anyhow::Result<()> {
    let (service, mock) = service();
    mock.push_json(200, json!({"@iot.id": "l1", "name": "CC BY 3.0"}));

    let any = service.get_any("License", &Id::from("l1"))?;
    assert_eq!(any.kind(), EntityKind::License);
    let license = any.downcast::<License>().expect("a license");
    assert_eq!(license.name().map(String::as_str), Some("CC BY 3.0"));
    assert!(license.service().is_some());
    assert_eq!(mock.request_urls(), vec![format!("{}/Licenses('l1')", BASE)]);

    let err = service.get_any("Tasks", &Id::Int(1)).unwrap_err();
    assert!(matches!(err, StaplusError::UnknownType(_)));
    Ok(())
}

#[test]
fn test_non_json_success_is_malformed() {
    let (service, mock) = service();
    mock.push(HttpResponse::new(200, "<html>proxy</html>"));
    let err = service.parties().query().fetch_many().unwrap_err();
    assert!(err.is_malformed_response());

    mock.push_json(200, json!([1, 2]));
    let err = service.parties().find("p1").unwrap_err();
    assert!(err.is_malformed_response());
}
