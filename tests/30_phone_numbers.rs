mod common;

use axum::http::{header, StatusCode};
use common::{keys, phone_number_doc, TestApp};
use serde_json::json;

#[tokio::test]
async fn create_links_phone_number_to_contact() {
    let app = TestApp::new();
    let contact_id = app.create_contact("Joe", "Bloggs").await;

    let res = app.post("/phone_numbers", phone_number_doc(&contact_id, "home", "(603) 555-1212")).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.headers[header::LOCATION], "/phone_numbers/1");

    let data = &res.body["data"];
    assert_eq!(keys(&data["attributes"]), vec!["name", "phone_number"]);
    assert_eq!(keys(&data["relationships"]), vec!["contact"]);
    assert_eq!(data["relationships"]["contact"]["data"], json!({ "type": "contacts", "id": contact_id }));
    assert_eq!(data["attributes"]["phone_number"], "(603) 555-1212");
}

#[tokio::test]
async fn create_requires_existing_contact() {
    let app = TestApp::new();

    let res = app.post("/phone_numbers", phone_number_doc("42", "home", "555")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["errors"][0]["detail"], "contacts 42 does not exist");

    let res = app
        .post(
            "/phone_numbers",
            json!({ "data": { "type": "phone_numbers", "attributes": { "name": "home" } } }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_sources(), vec!["/data/relationships/contact"]);

    assert_eq!(app.get("/phone_numbers").await.body["meta"]["record_count"], 0);
}

#[tokio::test]
async fn filter_by_contact_returns_exactly_its_phone_numbers() {
    let app = TestApp::new();
    let joe = app.create_contact("Joe", "Bloggs").await;
    let jane = app.create_contact("Jane", "Doe").await;
    let joe_home = app.create_phone_number(&joe, "home", "(603) 555-1212").await;
    app.create_phone_number(&jane, "home", "(603) 555-9999").await;
    let joe_work = app.create_phone_number(&joe, "work", "(603) 555-1313").await;

    let res = app.get(&format!("/phone_numbers?filter%5Bcontact%5D={}", joe)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["meta"]["record_count"], 2);

    let ids: Vec<&str> = res.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![joe_home.as_str(), joe_work.as_str()]);
    for phone in res.body["data"].as_array().unwrap() {
        assert_eq!(phone["relationships"]["contact"]["data"]["id"], joe.as_str());
    }

    let res = app.get(&format!("/phone_numbers?filter%5Bcontact%5D={},{}", joe, jane)).await;
    assert_eq!(res.body["meta"]["record_count"], 3);

    let res = app.get("/phone_numbers?filter%5Bcontact%5D=77").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"], json!([]));
}

#[tokio::test]
async fn malformed_or_unknown_filters_are_rejected() {
    let app = TestApp::new();

    let res = app.get("/phone_numbers?filter%5Bcontact%5D=joe").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");
    assert_eq!(res.error_sources(), vec!["filter[contact]"]);

    let res = app.get("/phone_numbers?filter%5Bname%5D=home").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_sources(), vec!["filter[name]"]);
}

#[tokio::test]
async fn include_contact_is_deduplicated() {
    let app = TestApp::new();
    let joe = app.create_contact("Joe", "Bloggs").await;
    app.create_phone_number(&joe, "home", "(603) 555-1212").await;
    app.create_phone_number(&joe, "work", "(603) 555-1313").await;

    let res = app.get("/phone_numbers?include=contact").await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let included = res.body["included"].as_array().unwrap();
    assert_eq!(included.len(), 1);
    assert_eq!(included[0]["type"], "contacts");
    assert_eq!(included[0]["relationships"]["phone_numbers"]["data"].as_array().unwrap().len(), 2);

    let res = app.get("/phone_numbers?include=contact.phone_numbers").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_sources(), vec!["include"]);
}

#[tokio::test]
async fn update_moves_phone_number_between_contacts() {
    let app = TestApp::new();
    let joe = app.create_contact("Joe", "Bloggs").await;
    let jane = app.create_contact("Jane", "Doe").await;
    let phone = app.create_phone_number(&joe, "home", "(603) 555-1212").await;
    let uri = format!("/phone_numbers/{}", phone);

    let res = app
        .patch(
            &uri,
            json!({
                "data": {
                    "type": "phone_numbers",
                    "id": phone,
                    "attributes": { "name": "cell" },
                    "relationships": { "contact": { "data": { "type": "contacts", "id": jane } } }
                }
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["data"]["attributes"]["name"], "cell");
    assert_eq!(res.body["data"]["attributes"]["phone_number"], "(603) 555-1212");
    assert_eq!(res.body["data"]["relationships"]["contact"]["data"]["id"], jane.as_str());

    let res = app
        .patch(
            &uri,
            json!({
                "data": {
                    "type": "phone_numbers",
                    "id": phone,
                    "relationships": { "contact": { "data": { "type": "contacts", "id": "99" } } }
                }
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&uri).await.body["data"]["relationships"]["contact"]["data"]["id"], jane.as_str());
}

#[tokio::test]
async fn contact_relationship_endpoints() {
    let app = TestApp::new();
    let joe = app.create_contact("Joe", "Bloggs").await;
    let jane = app.create_contact("Jane", "Doe").await;
    let phone = app.create_phone_number(&joe, "home", "(603) 555-1212").await;

    let res = app.get(&format!("/phone_numbers/{}/contact", phone)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["type"], "contacts");
    assert_eq!(res.body["data"]["attributes"]["name_first"], "Joe");

    let linkage_uri = format!("/phone_numbers/{}/relationships/contact", phone);
    let res = app.get(&linkage_uri).await;
    assert_eq!(res.body["data"], json!({ "type": "contacts", "id": joe }));

    let res = app.patch(&linkage_uri, json!({ "data": { "type": "contacts", "id": jane } })).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&linkage_uri).await.body["data"]["id"], jane.as_str());

    let res = app.patch(&linkage_uri, json!({ "data": null })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_sources(), vec!["/data"]);

    let res = app.patch(&linkage_uri, json!({ "data": { "type": "contacts", "id": "404" } })).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_phone_number() {
    let app = TestApp::new();
    let joe = app.create_contact("Joe", "Bloggs").await;
    let phone = app.create_phone_number(&joe, "home", "(603) 555-1212").await;

    assert_eq!(app.delete(&format!("/phone_numbers/{}", phone)).await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&format!("/phone_numbers/{}", phone)).await.status, StatusCode::NOT_FOUND);

    let res = app.get(&format!("/contacts/{}", joe)).await;
    assert_eq!(res.body["data"]["relationships"]["phone_numbers"]["data"], json!([]));
}
