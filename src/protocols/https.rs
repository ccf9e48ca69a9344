use async_trait::async_trait;
use base64::Engine;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Request, Uri};
use log::debug;
use serde::Deserialize;

use crate::error::KetraError;
use crate::n4::state::{Envelope, GroupContent, StateUpdate};
use crate::protocols::N4Transport;

pub type HyperHttpsClient = hyper::Client<hyper_tls::HttpsConnector<hyper::client::HttpConnector>>;

pub fn mk_hyper_https_client(
    disable_certificate_verification: bool,
) -> Result<HyperHttpsClient, KetraError> {
    // https://github.com/spietika/restson-rust/pull/20
    let mut http = hyper::client::HttpConnector::new();
    http.enforce_http(false);

    let mut tls_connector_builder = native_tls::TlsConnector::builder();

    // The N4 serves a self-signed certificate, so talking to it at all
    // usually means turning verification off.
    // See https://docs.rs/native-tls/0.2.2/native_tls/struct.TlsConnectorBuilder.html#method.danger_accept_invalid_certs
    if disable_certificate_verification {
        tls_connector_builder.danger_accept_invalid_certs(true);
        tls_connector_builder.danger_accept_invalid_hostnames(true);
    }

    let tls_connector = tls_connector_builder.build()?;
    let https = hyper_tls::HttpsConnector::<hyper::client::HttpConnector>::from((
        http,
        tls_connector.into(),
    ));

    // Build the hyper client
    let client = hyper::Client::builder().build(https);

    Ok(client)
}

/// HTTPS transport against the N4's `/ketra.cgi/api/v1` endpoints, using
/// basic auth with an empty user name and the API password.
pub struct HttpsTransport {
    client: HyperHttpsClient,
    host: String,
    auth_header: String,
}

impl HttpsTransport {
    pub fn new(
        host: &str,
        password: &str,
        disable_certificate_verification: bool,
    ) -> Result<Self, KetraError> {
        let credentials = base64::engine::general_purpose::STANDARD.encode(format!(":{password}"));
        Ok(Self {
            client: mk_hyper_https_client(disable_certificate_verification)?,
            host: host.to_owned(),
            auth_header: format!("Basic {credentials}"),
        })
    }

    fn uri(&self, path: &str) -> Result<Uri, KetraError> {
        Ok(format!("https://{}/ketra.cgi/api/v1/{path}", self.host).parse()?)
    }

    async fn get_json<T: for<'a> Deserialize<'a>>(&self, uri: &Uri) -> Result<T, KetraError> {
        let body = self.get_raw(uri).await?;
        let de = &mut serde_json::Deserializer::from_str(&body);
        let response: T = serde_path_to_error::deserialize(de)?;
        Ok(response)
    }

    async fn get_raw(&self, uri: &Uri) -> Result<String, KetraError> {
        let request = Request::builder()
            .method("GET")
            .header(AUTHORIZATION, &self.auth_header)
            .uri(uri)
            .body(hyper::Body::empty())?;

        let result = self.client.request(request).await?;
        let status = result.status();
        if !status.is_success() {
            return Err(KetraError::HttpStatus(status.as_u16()));
        }
        let body_bytes = hyper::body::to_bytes(result.into_body()).await?;
        Ok(String::from_utf8_lossy(&body_bytes).into_owned())
    }
}

#[async_trait]
impl N4Transport for HttpsTransport {
    async fn fetch_groups(&self) -> Result<String, KetraError> {
        let uri = self.uri("groups")?;
        debug!("GET {uri}");
        self.get_raw(&uri).await
    }

    async fn get_group(&self, name: &str) -> Result<GroupContent, KetraError> {
        let uri = self.uri(&format!("Groups/{}", encode_path_segment(name)))?;
        debug!("GET {uri}");
        let envelope: Envelope<GroupContent> = self.get_json(&uri).await?;
        Ok(envelope.content)
    }

    async fn put_group_state(&self, name: &str, update: &StateUpdate) -> Result<(), KetraError> {
        let uri = self.uri(&format!("Groups/{}/State", encode_path_segment(name)))?;
        debug!("PUT {uri}");
        let body = serde_json::to_string(update)?;

        let request = Request::builder()
            .method("PUT")
            .header(AUTHORIZATION, &self.auth_header)
            .header(CONTENT_TYPE, "application/json")
            .uri(uri)
            .body(body.into())?;

        let result = self.client.request(request).await?;
        let status = result.status();
        if !status.is_success() {
            return Err(KetraError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}

/// Percent-encode one path segment; group names regularly contain spaces.
fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
