//! Typed clients for the Flex resource endpoints (departments, stores).
//!
//! Each call obtains a token from the broker, issues a GET carrying the `token` header, and
//! decodes the Flex response envelope. A missing envelope or listing decodes as an empty list,
//! matching the endpoint's observed behavior; HTTP failures map through the same taxonomy as
//! authentication.

// self
use crate::{_prelude::*, broker::TokenBroker, http::AuthHttpClient, wire};

/// Path of the departments resource, relative to the API base.
const DEPARTMENTS_PATH: &str = "v1.0/departamentos";
/// Path of the stores resource, relative to the API base.
const STORES_PATH: &str = "v1.5/unidades";
/// Company code the stores listing is filtered to.
const STORE_COMPANY: &str = "01";

/// Department row returned by the Flex API.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Department {
	/// Department code.
	#[serde(rename = "codigo")]
	pub code: String,
	/// Human-readable description.
	#[serde(rename = "descricao")]
	pub description: String,
}

/// Store (sales unit) row returned by the Flex API.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Store {
	/// Store code.
	#[serde(rename = "Codigo")]
	pub code: String,
	/// Store name.
	#[serde(rename = "Nome")]
	pub name: String,
	/// Municipality the store operates in.
	#[serde(rename = "Municipio")]
	pub municipality: String,
	/// Owning company code.
	#[serde(rename = "Empresa")]
	pub company: String,
}

#[derive(Deserialize)]
struct DepartmentsEnvelope {
	#[serde(default)]
	response: Option<DepartmentsBody>,
}
#[derive(Deserialize)]
struct DepartmentsBody {
	#[serde(default, rename = "departamentos")]
	departments: Option<Vec<Department>>,
}

#[derive(Deserialize)]
struct StoresEnvelope {
	#[serde(default)]
	response: Option<StoresBody>,
}
#[derive(Deserialize)]
struct StoresBody {
	#[serde(default, rename = "unidades")]
	stores: Option<Vec<Store>>,
}

/// Client for Flex resource endpoints, authenticated through a [`TokenBroker`].
///
/// The client shares the broker's transport and timeout, so one reqwest client serves both the
/// identity endpoint and the resource endpoints.
#[derive(Clone)]
pub struct FlexClient<C>
where
	C: ?Sized + AuthHttpClient,
{
	broker: TokenBroker<C>,
	base: Url,
}
impl<C> FlexClient<C>
where
	C: ?Sized + AuthHttpClient,
{
	/// Creates a client that authenticates through `broker` and resolves resource paths
	/// against `base`.
	///
	/// `base` should end with a trailing slash (for example `https://host/api/flex/`) so
	/// relative paths resolve underneath it.
	pub fn new(broker: TokenBroker<C>, base: Url) -> Self {
		Self { broker, base }
	}

	/// Lists the departments known to the Flex API.
	pub async fn departments(&self) -> Result<Vec<Department>> {
		let body = self.fetch(DEPARTMENTS_PATH).await?;
		let envelope: DepartmentsEnvelope = decode_resource(&body)?;

		Ok(envelope.response.and_then(|body| body.departments).unwrap_or_default())
	}

	/// Lists the stores the dashboard operates, filtered to the owning company.
	pub async fn stores(&self) -> Result<Vec<Store>> {
		let body = self.fetch(STORES_PATH).await?;
		let envelope: StoresEnvelope = decode_resource(&body)?;
		let stores = envelope
			.response
			.and_then(|body| body.stores)
			.unwrap_or_default()
			.into_iter()
			.filter(|store| store.company == STORE_COMPANY)
			.collect();

		Ok(stores)
	}

	async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
		let token = self.broker.valid_token().await?;
		let url = self
			.base
			.join(path)
			.map_err(|e| Error::Config { detail: format!("cannot resolve `{path}`: {e}") })?;
		let reply = self
			.broker
			.http_client
			.get_with_token(&url, token.expose(), self.broker.request_timeout)
			.await?;

		if !reply.is_success() {
			return Err(Error::from_status(reply.status));
		}

		Ok(reply.body)
	}
}
impl<C> Debug for FlexClient<C>
where
	C: ?Sized + AuthHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FlexClient")
			.field("broker", &self.broker)
			.field("base", &self.base.as_str())
			.finish()
	}
}

fn decode_resource<T>(body: &[u8]) -> Result<T>
where
	T: for<'de> Deserialize<'de>,
{
	wire::decode_json(body).map_err(|detail| Error::ProtocolShape { detail })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn department_envelope_tolerates_missing_layers() {
		for body in [r#"{}"#, r#"{"response":null}"#, r#"{"response":{}}"#] {
			let envelope: DepartmentsEnvelope = decode_resource(body.as_bytes())
				.expect("Degenerate department envelopes should decode.");

			assert!(envelope.response.and_then(|body| body.departments).is_none());
		}
	}

	#[test]
	fn department_rows_map_portuguese_field_names() {
		let body = r#"{"response":{"departamentos":[{"codigo":"10","descricao":"Padaria"}]}}"#;
		let envelope: DepartmentsEnvelope =
			decode_resource(body.as_bytes()).expect("Department envelope should decode.");
		let departments = envelope
			.response
			.and_then(|body| body.departments)
			.expect("Department listing should be present.");

		assert_eq!(
			departments,
			vec![Department { code: "10".into(), description: "Padaria".into() }],
		);
	}

	#[test]
	fn store_rows_map_pascal_case_field_names() {
		let body = r#"{"response":{"unidades":[
			{"Codigo":"001","Nome":"Centro","Municipio":"Belo Horizonte","Empresa":"01"}
		]}}"#;
		let envelope: StoresEnvelope =
			decode_resource(body.as_bytes()).expect("Store envelope should decode.");
		let stores =
			envelope.response.and_then(|body| body.stores).expect("Store listing should be present.");

		assert_eq!(stores[0].code, "001");
		assert_eq!(stores[0].municipality, "Belo Horizonte");
	}
}
