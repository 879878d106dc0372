//! Panicking front end over [`CarsxeClient`].
//!
//! Each method forwards to the `Result`-returning one and panics with the
//! error's message on failure. Use it where a failed lookup should abort the
//! task.

use tokio_util::sync::CancellationToken;

use crate::client::CarsxeClient;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::request::Params;
use crate::transport::JsonMap;

#[derive(Clone, Debug)]
pub struct StrictClient {
    inner: CarsxeClient,
}

fn raise(result: Result<JsonMap>) -> JsonMap {
    match result {
        Ok(map) => map,
        Err(e) => panic!("carsxe: {e}"),
    }
}

/// # Panics
///
/// Every method panics on any error its [`CarsxeClient`] counterpart would
/// return.
impl StrictClient {
    #[must_use]
    pub fn new(inner: CarsxeClient) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn inner(&self) -> &CarsxeClient {
        &self.inner
    }

    pub async fn call(&self, endpoint: Endpoint, params: impl Into<Params>) -> JsonMap {
        raise(self.inner.call(endpoint, params).await)
    }

    pub async fn call_with_cancel(
        &self,
        endpoint: Endpoint,
        params: impl Into<Params>,
        token: &CancellationToken,
    ) -> JsonMap {
        raise(self.inner.call_with_cancel(endpoint, params, token).await)
    }

    pub async fn get(&self, path: &str, params: impl Into<Params>) -> JsonMap {
        raise(self.inner.get(path, params).await)
    }

    pub async fn specs(&self, params: impl Into<Params>) -> JsonMap {
        self.call(Endpoint::Specs, params).await
    }

    pub async fn international_vin_decoder(&self, params: impl Into<Params>) -> JsonMap {
        self.call(Endpoint::InternationalVinDecoder, params).await
    }

    pub async fn plate_decoder(&self, params: impl Into<Params>) -> JsonMap {
        self.call(Endpoint::PlateDecoder, params).await
    }

    pub async fn market_value(&self, params: impl Into<Params>) -> JsonMap {
        self.call(Endpoint::MarketValue, params).await
    }

    pub async fn history(&self, params: impl Into<Params>) -> JsonMap {
        self.call(Endpoint::History, params).await
    }

    pub async fn images(&self, params: impl Into<Params>) -> JsonMap {
        self.call(Endpoint::Images, params).await
    }

    pub async fn recalls(&self, params: impl Into<Params>) -> JsonMap {
        self.call(Endpoint::Recalls, params).await
    }

    pub async fn plate_image_recognition(&self, image_url: &str) -> JsonMap {
        raise(self.inner.plate_image_recognition(image_url).await)
    }

    pub async fn vin_ocr(&self, image_url: &str) -> JsonMap {
        raise(self.inner.vin_ocr(image_url).await)
    }

    pub async fn year_make_model(&self, params: impl Into<Params>) -> JsonMap {
        self.call(Endpoint::YearMakeModel, params).await
    }

    pub async fn obd_codes_decoder(&self, params: impl Into<Params>) -> JsonMap {
        self.call(Endpoint::ObdCodesDecoder, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CarsxeConfig;
    use crate::transport::{MockResponse, MockTransport};

    fn strict(responses: Vec<MockResponse>) -> StrictClient {
        let (transport, _handle) = MockTransport::with_responses(responses);
        CarsxeClient::with_transport(CarsxeConfig::new("k"), transport).strict()
    }

    #[tokio::test]
    async fn returns_map_on_success() {
        let client = strict(vec![MockResponse::ok(r#"{"code":"P0115"}"#)]);
        let map = client.obd_codes_decoder([("code", "P0115")]).await;
        assert_eq!(map["code"], "P0115");
    }

    #[tokio::test]
    #[should_panic(expected = "non-2xx response (500)")]
    async fn panics_on_status_error() {
        let client = strict(vec![MockResponse::status(500, "boom")]);
        client.recalls([("vin", "V")]).await;
    }

    #[tokio::test]
    #[should_panic(expected = "imageURL required")]
    async fn panics_on_blank_image_url() {
        strict(Vec::new()).vin_ocr(" ").await;
    }
}
