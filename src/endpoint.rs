//! Static table of the CarsXE endpoints this client knows about.

use crate::error::{CarsxeError, Result};
use crate::request::{HttpMethod, Params};

/// Name of the image URL argument of the POST endpoints.
pub const IMAGE_URL: &str = "imageURL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Specs,
    InternationalVinDecoder,
    PlateDecoder,
    MarketValue,
    History,
    Images,
    Recalls,
    PlateImageRecognition,
    VinOcr,
    YearMakeModel,
    ObdCodesDecoder,
}

/// Verb, path and parameter rules of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSpec {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub required: &'static [&'static str],
    /// Applied when the caller leaves the parameter absent or blank.
    pub defaults: &'static [(&'static str, &'static str)],
    /// Passed through as-is; listed for documentation and the CLI.
    pub optional: &'static [&'static str],
}

static ENDPOINTS: [EndpointSpec; 11] = [
    EndpointSpec {
        name: "specs",
        method: HttpMethod::Get,
        path: "specs",
        required: &["vin"],
        defaults: &[],
        optional: &["deepdata", "disableIntVINDecoding"],
    },
    EndpointSpec {
        name: "international-vin-decoder",
        method: HttpMethod::Get,
        path: "v1/international-vin-decoder",
        required: &["vin"],
        defaults: &[],
        optional: &[],
    },
    EndpointSpec {
        name: "plate-decoder",
        method: HttpMethod::Get,
        path: "v2/platedecoder",
        required: &["plate", "country"],
        defaults: &[("country", "US")],
        // some countries need state or district; the service enforces that
        optional: &["state", "district"],
    },
    EndpointSpec {
        name: "market-value",
        method: HttpMethod::Get,
        path: "v2/marketvalue",
        required: &["vin"],
        defaults: &[],
        optional: &["state", "mileage", "condition"],
    },
    EndpointSpec {
        name: "history",
        method: HttpMethod::Get,
        path: "history",
        required: &["vin"],
        defaults: &[],
        optional: &[],
    },
    EndpointSpec {
        name: "images",
        method: HttpMethod::Get,
        path: "images",
        required: &["make", "model"],
        defaults: &[],
        optional: &["year", "trim", "color", "transparent", "angle", "photoType", "size", "license"],
    },
    EndpointSpec {
        name: "recalls",
        method: HttpMethod::Get,
        path: "v1/recalls",
        required: &["vin"],
        defaults: &[],
        optional: &[],
    },
    EndpointSpec {
        name: "plate-image-recognition",
        method: HttpMethod::Post,
        path: "platerecognition",
        required: &[IMAGE_URL],
        defaults: &[],
        optional: &[],
    },
    EndpointSpec {
        name: "vin-ocr",
        method: HttpMethod::Post,
        path: "v1/vinocr",
        required: &[IMAGE_URL],
        defaults: &[],
        optional: &[],
    },
    EndpointSpec {
        name: "year-make-model",
        method: HttpMethod::Get,
        path: "v1/ymm",
        required: &["year", "make", "model"],
        defaults: &[],
        optional: &["trim"],
    },
    EndpointSpec {
        name: "obd-codes-decoder",
        method: HttpMethod::Get,
        path: "obdcodesdecoder",
        required: &["code"],
        defaults: &[],
        optional: &[],
    },
];

impl Endpoint {
    pub const ALL: [Endpoint; 11] = [
        Self::Specs,
        Self::InternationalVinDecoder,
        Self::PlateDecoder,
        Self::MarketValue,
        Self::History,
        Self::Images,
        Self::Recalls,
        Self::PlateImageRecognition,
        Self::VinOcr,
        Self::YearMakeModel,
        Self::ObdCodesDecoder,
    ];

    #[must_use]
    pub fn spec(self) -> &'static EndpointSpec {
        &ENDPOINTS[self as usize]
    }

    #[must_use]
    pub fn method(self) -> HttpMethod {
        self.spec().method
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        self.spec().path
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(self.spec().method, HttpMethod::Post)
    }

    /// Look an endpoint up by its kebab-case name or its path.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('/');
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(name) || e.path().eq_ignore_ascii_case(name))
    }

    /// Fill in defaults, then check every required parameter is present and
    /// not blank. Only meaningful for GET endpoints.
    pub fn prepare(self, mut params: Params) -> Result<Params> {
        let spec = self.spec();
        for &(name, value) in spec.defaults {
            if !params.has_value(name) {
                params.insert(name, value);
            }
        }
        if let Some(missing) = spec.required.iter().find(|name| !params.has_value(name)) {
            return Err(CarsxeError::MissingArgument(*missing));
        }
        Ok(params)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

impl std::str::FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            let known: Vec<_> = Self::ALL.iter().map(|e| e.name()).collect();
            format!("Unknown endpoint: '{}'. Supported: {}", s, known.join(", "))
        })
    }
}
