//! The CarsXE client: endpoint validation, URL building and one round trip
//! per call.
//!
//! Every call goes through the same three steps:
//! - [`CarsxeClient::build_request`] checks arguments and produces an [`ApiRequest`]
//! - the [`Transport`] executes it
//! - [`decode_response`] turns the raw response into a [`JsonMap`]
//!
//! Argument errors are reported before anything touches the network.

use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::CarsxeConfig;
use crate::endpoint::{Endpoint, IMAGE_URL};
use crate::error::{CarsxeError, Result};
use crate::request::{build_url, ApiRequest, Params};
use crate::strict::StrictClient;
use crate::transport::{decode_response, HttpTransport, JsonMap, Transport};

/// JSON body of the image endpoints.
#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    image: &'a str,
}

#[derive(Clone, Debug)]
pub struct CarsxeClient {
    config: Arc<CarsxeConfig>,
    transport: Arc<dyn Transport>,
}

impl CarsxeClient {
    /// Create a client that talks HTTP with the configured timeout.
    pub fn new(config: CarsxeConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client from `CARSXE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(CarsxeConfig::from_env()?)
    }

    /// Create a client on top of any transport, e.g. [`crate::MockTransport`].
    pub fn with_transport(config: CarsxeConfig, transport: impl Transport + 'static) -> Self {
        info!(base_url = %config.base_url, source = %config.source, "Creating new CarsXE client");
        if config.api_key.trim().is_empty() {
            warn!("CarsXE client created without an API key");
        }
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CarsxeConfig {
        &self.config
    }

    /// Same operations, but failures panic instead of returning `Err`.
    #[must_use]
    pub fn strict(&self) -> StrictClient {
        StrictClient::new(self.clone())
    }

    /// Validate arguments for `endpoint` and build the request it would send.
    ///
    /// Image endpoints read the image URL from the `imageURL` parameter and
    /// send it as the JSON body; all other parameters are ignored for them.
    pub fn build_request(&self, endpoint: Endpoint, params: Params) -> Result<ApiRequest> {
        if endpoint.is_image() {
            let image_url = params.get(IMAGE_URL).unwrap_or_default();
            return self.build_image_request(endpoint, image_url);
        }
        let params = endpoint.prepare(params)?;
        let url = build_url(&self.config, endpoint.path(), &params)?;
        Ok(ApiRequest::get(url))
    }

    fn build_image_request(&self, endpoint: Endpoint, image_url: &str) -> Result<ApiRequest> {
        if image_url.trim().is_empty() {
            return Err(CarsxeError::MissingArgument(IMAGE_URL));
        }
        let url = build_url(&self.config, endpoint.path(), &Params::new())?;
        let body = serde_json::to_value(ImageRequest { image: image_url }).map_err(CarsxeError::Encode)?;
        Ok(ApiRequest::post_json(url, body))
    }

    /// Call any endpoint from the table.
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    pub async fn call(&self, endpoint: Endpoint, params: impl Into<Params>) -> Result<JsonMap> {
        let request = self.build_request(endpoint, params.into()).map_err(|e| {
            warn!(error = %e, "Rejected request before sending");
            e
        })?;
        self.send(request).await
    }

    /// Like [`Self::call`], but gives up with [`CarsxeError::Cancelled`] as
    /// soon as `token` is cancelled, dropping the in-flight request.
    pub async fn call_with_cancel(
        &self,
        endpoint: Endpoint,
        params: impl Into<Params>,
        token: &CancellationToken,
    ) -> Result<JsonMap> {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                warn!(endpoint = %endpoint, "CarsXE request cancelled");
                Err(CarsxeError::Cancelled)
            }
            result = self.call(endpoint, params) => result,
        }
    }

    /// GET any path under the base URL, for endpoints not in the table.
    /// No parameter is required.
    #[instrument(skip_all, fields(path = %path))]
    pub async fn get(&self, path: &str, params: impl Into<Params>) -> Result<JsonMap> {
        let url = build_url(&self.config, path, &params.into())?;
        self.send(ApiRequest::get(url)).await
    }

    async fn send(&self, request: ApiRequest) -> Result<JsonMap> {
        debug!(method = %request.method, path = %request.path(), "Dispatching CarsXE request");
        let response = self.transport.execute(request).await?;
        decode_response(response).map_err(|e| {
            error!(error = %e, "CarsXE call failed");
            e
        })
    }

    /// `GET specs`: decode a VIN. Requires `vin`; accepts `deepdata`,
    /// `disableIntVINDecoding`.
    pub async fn specs(&self, params: impl Into<Params>) -> Result<JsonMap> {
        self.call(Endpoint::Specs, params).await
    }

    /// `GET v1/international-vin-decoder`. Requires `vin`.
    pub async fn international_vin_decoder(&self, params: impl Into<Params>) -> Result<JsonMap> {
        self.call(Endpoint::InternationalVinDecoder, params).await
    }

    /// `GET v2/platedecoder`. Requires `plate`; `country` defaults to `US`.
    ///
    /// Some countries also need `state` or `district`. That is left to the
    /// service to enforce.
    pub async fn plate_decoder(&self, params: impl Into<Params>) -> Result<JsonMap> {
        self.call(Endpoint::PlateDecoder, params).await
    }

    /// `GET v2/marketvalue`. Requires `vin`.
    pub async fn market_value(&self, params: impl Into<Params>) -> Result<JsonMap> {
        self.call(Endpoint::MarketValue, params).await
    }

    /// `GET history`. Requires `vin`.
    pub async fn history(&self, params: impl Into<Params>) -> Result<JsonMap> {
        self.call(Endpoint::History, params).await
    }

    /// `GET images`. Requires `make` and `model`.
    pub async fn images(&self, params: impl Into<Params>) -> Result<JsonMap> {
        self.call(Endpoint::Images, params).await
    }

    /// `GET v1/recalls`. Requires `vin`.
    pub async fn recalls(&self, params: impl Into<Params>) -> Result<JsonMap> {
        self.call(Endpoint::Recalls, params).await
    }

    /// `POST platerecognition` with `{"image": image_url}`.
    pub async fn plate_image_recognition(&self, image_url: &str) -> Result<JsonMap> {
        self.call(Endpoint::PlateImageRecognition, [(IMAGE_URL, image_url)]).await
    }

    /// `POST v1/vinocr` with `{"image": image_url}`.
    pub async fn vin_ocr(&self, image_url: &str) -> Result<JsonMap> {
        self.call(Endpoint::VinOcr, [(IMAGE_URL, image_url)]).await
    }

    /// `GET v1/ymm`. Requires `year`, `make`, `model`; accepts `trim`.
    pub async fn year_make_model(&self, params: impl Into<Params>) -> Result<JsonMap> {
        self.call(Endpoint::YearMakeModel, params).await
    }

    /// `GET obdcodesdecoder`. Requires `code`.
    pub async fn obd_codes_decoder(&self, params: impl Into<Params>) -> Result<JsonMap> {
        self.call(Endpoint::ObdCodesDecoder, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HttpMethod;
    use crate::transport::{MockResponse, MockTransport, RawResponse};
    use serde_json::json;
    use std::sync::Arc;

    fn client() -> (CarsxeClient, Arc<crate::transport::MockHandle>) {
        let (transport, handle) = MockTransport::new();
        let config = CarsxeConfig::new("test-key").with_base_url("https://api.example.test");
        (CarsxeClient::with_transport(config, transport), handle)
    }

    fn query(request: &ApiRequest) -> Vec<(String, String)> {
        request
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[tokio::test]
    async fn plate_decoder_builds_expected_get() {
        let (client, handle) = client();
        client
            .plate_decoder([("plate", "7XER187"), ("state", "CA"), ("country", "US")])
            .await
            .unwrap();

        let request = handle.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url.path(), "/v2/platedecoder");
        assert!(request.body.is_none());
        let pairs = query(&request);
        for (k, v) in [("key", "test-key"), ("source", "rust"), ("plate", "7XER187"), ("state", "CA"), ("country", "US")] {
            assert!(pairs.contains(&(k.to_string(), v.to_string())), "missing {k}={v}");
        }
    }

    #[tokio::test]
    async fn every_get_endpoint_hits_its_path() {
        let cases: [(Endpoint, Params); 9] = [
            (Endpoint::Specs, Params::from([("vin", "V")])),
            (Endpoint::InternationalVinDecoder, Params::from([("vin", "V")])),
            (Endpoint::PlateDecoder, Params::from([("plate", "P")])),
            (Endpoint::MarketValue, Params::from([("vin", "V")])),
            (Endpoint::History, Params::from([("vin", "V")])),
            (Endpoint::Images, Params::from([("make", "BMW"), ("model", "X5")])),
            (Endpoint::Recalls, Params::from([("vin", "V")])),
            (Endpoint::YearMakeModel, Params::from([("year", "2011"), ("make", "Toyota"), ("model", "Camry")])),
            (Endpoint::ObdCodesDecoder, Params::from([("code", "P0115")])),
        ];
        let (client, handle) = client();
        for (endpoint, params) in cases {
            client.call(endpoint, params).await.unwrap();
            let request = handle.last_request().unwrap();
            assert_eq!(request.url.path(), format!("/{}", endpoint.path()));
            assert_eq!(request.method, HttpMethod::Get);
        }
        assert_eq!(handle.request_count(), 9);
    }

    #[tokio::test]
    async fn image_endpoints_post_json_body() {
        let (client, handle) = client();
        client.vin_ocr("https://img.example/vin.jpg").await.unwrap();
        client.plate_image_recognition("https://img.example/plate.jpg").await.unwrap();

        let requests = handle.requests();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url.path(), "/v1/vinocr");
        assert_eq!(requests[0].body, Some(json!({ "image": "https://img.example/vin.jpg" })));
        assert_eq!(requests[1].url.path(), "/platerecognition");
        let pairs = query(&requests[1]);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&("key".to_string(), "test-key".to_string())));
    }

    #[tokio::test]
    async fn blank_image_url_is_rejected_before_any_request() {
        let (client, handle) = client();
        for bad in ["", "   ", "\t\n"] {
            let err = client.vin_ocr(bad).await.unwrap_err();
            assert!(matches!(err, CarsxeError::MissingArgument("imageURL")));
            let err = client.plate_image_recognition(bad).await.unwrap_err();
            assert!(matches!(err, CarsxeError::MissingArgument("imageURL")));
        }
        assert_eq!(handle.request_count(), 0);
    }

    #[tokio::test]
    async fn missing_required_param_never_reaches_transport() {
        let (client, handle) = client();
        let err = client.specs(Params::new()).await.unwrap_err();
        assert!(matches!(err, CarsxeError::MissingArgument("vin")));
        assert_eq!(handle.request_count(), 0);
    }

    #[tokio::test]
    async fn transport_and_status_errors_surface() {
        let (transport, handle) = MockTransport::with_responses(vec![
            MockResponse::TransportError("connection refused".into()),
            MockResponse::status(429, "slow down"),
        ]);
        let client = CarsxeClient::with_transport(CarsxeConfig::new("k"), transport);

        let err = client.history([("vin", "V")]).await.unwrap_err();
        assert!(matches!(err, CarsxeError::Transport(_)));

        let err = client.history([("vin", "V")]).await.unwrap_err();
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.body(), Some("slow down"));
        assert_eq!(handle.request_count(), 2);
    }

    #[tokio::test]
    async fn generic_get_passes_params_through() {
        let (client, handle) = client();
        handle.push(MockResponse::Success(RawResponse::new(200, r#"{"ok":true}"#)));
        let map = client.get("v1/lien-theft", [("vin", "V"), ("extra", "")]).await.unwrap();
        assert_eq!(map["ok"], true);

        let request = handle.last_request().unwrap();
        assert_eq!(request.url.path(), "/v1/lien-theft");
        assert!(!query(&request).iter().any(|(k, _)| k == "extra"));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let (client, _handle) = client();
        let token = CancellationToken::new();
        token.cancel();
        let err = client
            .call_with_cancel(Endpoint::Recalls, [("vin", "V")], &token)
            .await
            .unwrap_err();
        assert!(matches!(err, CarsxeError::Cancelled));
    }

    #[tokio::test]
    async fn live_token_lets_call_complete() {
        let (client, handle) = client();
        handle.push(MockResponse::ok(r#"{"recalls":[]}"#));
        let token = CancellationToken::new();
        let map = client
            .call_with_cancel(Endpoint::Recalls, [("vin", "V")], &token)
            .await
            .unwrap();
        assert!(map["recalls"].as_array().unwrap().is_empty());
    }

    #[test]
    fn clones_share_transport() {
        let (client, _handle) = client();
        let other = client.clone();
        assert!(Arc::ptr_eq(&client.transport, &other.transport));
        assert!(Arc::ptr_eq(&client.config, &other.config));
    }
}
