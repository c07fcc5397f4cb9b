mod common;

use common::{API_KEY, MockSession, URL, body_json, respond};
use reqwest::Method;
use serde_json::json;
use shmdash::{Attribute, AttributeType, Client, ClientError, VirtualChannel};

fn attributes() -> Vec<Attribute> {
    vec![
        Attribute::new("AbsDateTime", AttributeType::DateTime)
            .with_description("Absolute time UTC")
            .with_soft_limits(None, None),
        Attribute::new("Temperature", AttributeType::Float32).with_unit("°C"),
        Attribute::new("WindDegree", AttributeType::Uint16).with_soft_limits(Some(0.0), Some(360.0)),
    ]
}

fn virtual_channels() -> Vec<VirtualChannel> {
    vec![
        VirtualChannel::new("100", ["AbsDateTime", "Temperature", "WindDegree"])
            .with_name("Weather")
            .with_properties(["STREAM", "PAR"]),
    ]
}

const FULL_SETUP: &str = r#"{
    "attributes": {
        "AbsDateTime": {"descr": "Absolute time UTC", "type": "dateTime", "softLimits": [null, null]},
        "Temperature": {"unit": "°C", "type": "float32"},
        "WindDegree": {"type": "uint16", "softLimits": [0, 360]}
    },
    "virtual_channels": {
        "100": {"name": "Weather", "attributes": ["AbsDateTime", "Temperature", "WindDegree"], "prop": ["STREAM", "PAR"]}
    }
}"#;

const PARTIAL_SETUP: &str = r#"{
    "attributes": {
        "AbsDateTime": {"descr": "Absolute time UTC", "type": "dateTime"}
    },
    "virtual_channels": {}
}"#;

/// Serve `setup` for GET and accept every write.
fn server(setup: &'static str) -> MockSession {
    MockSession::new(move |request| {
        if request.method == Method::GET && request.url.ends_with("/setup") {
            Ok(respond(request, 200, setup))
        } else {
            Ok(respond(request, 200, ""))
        }
    })
}

fn client(session: MockSession) -> Client<MockSession> {
    Client::with_session(URL, API_KEY, session).unwrap()
}

#[tokio::test]
async fn test_setup_on_empty_schema_posts_everything() {
    let client = client(server("{}"));

    client.setup(&attributes(), &virtual_channels()).await.unwrap();

    let requests = client.session().requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].url, "https://shmdash.example/upload/vjson/v1/setup");
    assert_eq!(requests[1].method, Method::POST);
    assert_eq!(requests[1].url, "https://shmdash.example/upload/vjson/v1/setup");

    let expected: serde_json::Value = serde_json::from_str(FULL_SETUP).unwrap();
    assert_eq!(body_json(&requests[1]).unwrap(), expected);
}

#[tokio::test]
async fn test_setup_posted_in_declaration_order() {
    let client = client(server("{}"));

    client.setup(&attributes(), &virtual_channels()).await.unwrap();

    let requests = client.session().requests();
    let body = requests[1].content.as_deref().unwrap();
    let abs = body.find("AbsDateTime").unwrap();
    let temperature = body.find("Temperature").unwrap();
    let wind = body.find("WindDegree").unwrap();
    assert!(abs < temperature && temperature < wind);
}

#[tokio::test]
async fn test_setup_on_identical_schema_only_reads() {
    let client = client(server(FULL_SETUP));

    client.setup(&attributes(), &virtual_channels()).await.unwrap();

    let requests = client.session().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
}

#[tokio::test]
async fn test_setup_on_partial_schema_adds_missing() {
    let client = client(server(PARTIAL_SETUP));

    client.setup(&attributes(), &virtual_channels()).await.unwrap();

    let requests = client.session().requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[0].method, Method::GET);

    let commands: Vec<serde_json::Value> = requests[1..]
        .iter()
        .map(|request| {
            assert_eq!(request.method, Method::POST);
            assert_eq!(request.url, "https://shmdash.example/upload/vjson/v1/commands");
            body_json(request).unwrap()
        })
        .collect();

    assert_eq!(
        commands[0],
        json!({"commands": [{"cmdName": "addAttribute", "attributeId": "Temperature", "unit": "°C", "type": "float32"}]})
    );
    assert_eq!(
        commands[1],
        json!({"commands": [{"cmdName": "addAttribute", "attributeId": "WindDegree", "type": "uint16", "softLimits": [0, 360]}]})
    );
    assert_eq!(
        commands[2],
        json!({"commands": [{
            "cmdName": "addVirtualChannel",
            "virtualChannelId": "100",
            "name": "Weather",
            "attributes": ["AbsDateTime", "Temperature", "WindDegree"],
            "prop": ["STREAM", "PAR"],
        }]})
    );
}

#[tokio::test]
async fn test_setup_is_idempotent() {
    let client = client(server(FULL_SETUP));

    for _ in 0..3 {
        client.setup(&attributes(), &virtual_channels()).await.unwrap();
    }

    assert!(
        client
            .session()
            .requests()
            .iter()
            .all(|request| request.method == Method::GET)
    );
}

#[tokio::test]
async fn test_setup_stops_on_first_error() {
    let session = MockSession::new(|request| {
        if request.method == Method::GET {
            Ok(respond(request, 200, PARTIAL_SETUP))
        } else {
            Ok(respond(request, 400, r#"{"message": "invalid attribute type"}"#))
        }
    });
    let client = client(session);

    let error = client.setup(&attributes(), &virtual_channels()).await.unwrap_err();

    assert_eq!(client.session().requests().len(), 2);
    assert_eq!(
        error.to_string(),
        "POST request to https://shmdash.example/upload/vjson/v1/commands failed with status 400 (Bad Request): invalid attribute type"
    );
}

#[tokio::test]
async fn test_get_setup() {
    let client = client(server(FULL_SETUP));

    let setup = client.get_setup().await.unwrap();
    assert_eq!(setup.attributes, attributes());
    assert_eq!(setup.virtual_channels, virtual_channels());

    assert_eq!(client.get_attributes().await.unwrap().len(), 3);
    assert_eq!(client.get_virtual_channels().await.unwrap()[0].identifier, "100");
}

#[tokio::test]
async fn test_non_json_error_body_is_message() {
    let client = client(MockSession::always(400, "Bad things happened"));

    let error = client.get_setup().await.unwrap_err();

    match error {
        ClientError::Response(e) => {
            assert_eq!(e.status.as_u16(), 400);
            assert_eq!(e.method, Method::GET);
            assert_eq!(e.message.as_deref(), Some("Bad things happened"));
        }
        other => panic!("Expected response error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_setup_body() {
    let client = client(MockSession::always(200, r#"{"attributes": {"X": {"type": "float128"}}}"#));

    let error = client.get_setup().await.unwrap_err();
    assert!(matches!(error, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_add_virtual_channel_attributes() {
    let client = client(server("{}"));

    client
        .add_virtual_channel_attributes("100", &["Humidity".to_string()])
        .await
        .unwrap();

    let requests = client.session().requests();
    assert_eq!(
        body_json(&requests[0]).unwrap(),
        json!({"commands": [{"cmdName": "addVirtualChannelAttributes", "virtualChannelId": "100", "attributes": ["Humidity"]}]})
    );
}

#[tokio::test]
async fn test_dev_endpoints() {
    let client = client(server("{}"));

    client.delete_data().await.unwrap();
    client.recreate().await.unwrap();

    let requests = client.session().requests();
    assert_eq!(requests[0].method, Method::DELETE);
    assert_eq!(requests[0].url, "https://shmdash.example/dev/timeseriesdata");
    assert_eq!(requests[1].method, Method::GET);
    assert_eq!(requests[1].url, "https://shmdash.example/dev/recreate");
    assert!(requests.iter().all(|request| request.content.is_none()));
}

#[tokio::test]
async fn test_close_releases_session() {
    let client = client(server("{}"));
    assert!(!client.session().is_closed());

    client.close().await;
    assert!(client.session().is_closed());
}
