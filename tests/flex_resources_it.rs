// crates.io
use httpmock::prelude::*;
// self
use flex_broker::{
	auth::Credentials,
	broker::TokenBroker,
	error::Error,
	http::ReqwestAuthClient,
	resources::{Department, FlexClient, Store},
	url::Url,
};

const AUTH_PATH: &str = "/v1.1/auth";

fn build_client(server: &MockServer) -> FlexClient<ReqwestAuthClient> {
	let broker = TokenBroker::new(
		Url::parse(&server.url(AUTH_PATH)).expect("Auth endpoint URL should parse."),
		Credentials::new("simulador@example.com", "s3cret"),
	);

	FlexClient::new(broker, Url::parse(&server.url("/")).expect("Base URL should parse."))
}

async fn mount_auth(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(AUTH_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"token":"flex-token","expiresIn":3600}"#);
		})
		.await
}

#[tokio::test]
async fn departments_carry_the_token_header_and_decode_the_envelope() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let auth = mount_auth(&server).await;
	let resource = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1.0/departamentos").header("token", "flex-token");
			then.status(200).header("content-type", "application/json").body(
				r#"{"response":{"departamentos":[
					{"codigo":"10","descricao":"Padaria"},
					{"codigo":"20","descricao":"Hortifruti"}
				]}}"#,
			);
		})
		.await;
	let departments =
		client.departments().await.expect("Department listing should decode successfully.");

	assert_eq!(
		departments,
		vec![
			Department { code: "10".into(), description: "Padaria".into() },
			Department { code: "20".into(), description: "Hortifruti".into() },
		],
	);

	auth.assert_calls_async(1).await;
	resource.assert_async().await;
}

#[tokio::test]
async fn stores_filter_to_the_operating_company() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	mount_auth(&server).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1.5/unidades").header("token", "flex-token");
			then.status(200).header("content-type", "application/json").body(
				r#"{"response":{"unidades":[
					{"Codigo":"001","Nome":"Centro","Municipio":"Belo Horizonte","Empresa":"01"},
					{"Codigo":"002","Nome":"Savassi","Municipio":"Belo Horizonte","Empresa":"01"},
					{"Codigo":"900","Nome":"Atacado","Municipio":"Contagem","Empresa":"02"}
				]}}"#,
			);
		})
		.await;

	let stores = client.stores().await.expect("Store listing should decode successfully.");

	assert_eq!(stores.len(), 2);
	assert!(stores.iter().all(|store: &Store| store.company == "01"));
	assert_eq!(stores[0].code, "001");
	assert_eq!(stores[1].name, "Savassi");
}

#[tokio::test]
async fn missing_envelopes_read_as_empty_listings() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	mount_auth(&server).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1.0/departamentos");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;

	let departments =
		client.departments().await.expect("An empty envelope should decode as no rows.");

	assert!(departments.is_empty());
}

#[tokio::test]
async fn resource_failures_map_through_the_status_taxonomy() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	mount_auth(&server).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1.5/unidades");
			then.status(500);
		})
		.await;

	let err = client.stores().await.expect_err("A 5xx resource reply should surface.");

	assert_eq!(err, Error::UpstreamServer);
}

#[tokio::test]
async fn authentication_failures_short_circuit_resource_calls() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let auth = server
		.mock_async(|when, then| {
			when.method(POST).path(AUTH_PATH);
			then.status(404);
		})
		.await;
	let resource = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1.0/departamentos");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let err = client.departments().await.expect_err("A failed login should stop the fetch.");

	assert_eq!(err, Error::NotFound);

	auth.assert_async().await;
	resource.assert_calls_async(0).await;
}

#[tokio::test]
async fn sibling_resource_calls_reuse_one_token_grant() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let auth = mount_auth(&server).await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1.0/departamentos").header("token", "flex-token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"response":{"departamentos":[]}}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1.5/unidades").header("token", "flex-token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"response":{"unidades":[]}}"#);
		})
		.await;

	client.departments().await.expect("Department fetch should succeed.");
	client.stores().await.expect("Store fetch should succeed.");

	// Both fetches ran inside the cached token's validity window.
	auth.assert_calls_async(1).await;
}
