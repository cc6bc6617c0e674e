use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TOP_TEXT: &str = "Up Top";
pub const DEFAULT_BOTTOM_TEXT: &str = "Bottom Text";
pub const DEFAULT_IMAGE_LOCATION: &str = "Nowhere and everywhere";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meme {
    pub top_text: String,
    pub bottom_text: String,
    pub image_location: String,
}

impl Default for Meme {
    fn default() -> Self {
        Self {
            top_text: DEFAULT_TOP_TEXT.to_string(),
            bottom_text: DEFAULT_BOTTOM_TEXT.to_string(),
            image_location: DEFAULT_IMAGE_LOCATION.to_string(),
        }
    }
}

impl Meme {
    #[must_use]
    pub fn with_top_text(mut self, top_text: impl Into<String>) -> Self {
        self.top_text = top_text.into();
        self
    }

    #[must_use]
    pub fn with_image_location(mut self, image_location: impl Into<String>) -> Self {
        self.image_location = image_location.into();
        self
    }
}

/// Raw `GET /memes` query string, before numeric parsing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemeQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid value for '{field}': {value}")]
pub struct ParamError {
    pub field: &'static str,
    pub value: String,
}

/// Parsed meme parameters. Missing coordinates default to zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemeParams {
    pub lat: f64,
    pub lon: f64,
    pub query: String,
}

impl TryFrom<&MemeQuery> for MemeParams {
    type Error = ParamError;

    fn try_from(raw: &MemeQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            lat: parse_coordinate("lat", raw.lat.as_deref())?,
            lon: parse_coordinate("lon", raw.lon.as_deref())?,
            query: raw.query.clone().unwrap_or_default(),
        })
    }
}

fn parse_coordinate(field: &'static str, value: Option<&str>) -> Result<f64, ParamError> {
    match value {
        None | Some("") => Ok(0.0),
        Some(raw) => raw.parse().map_err(|_| ParamError {
            field,
            value: raw.to_string(),
        }),
    }
}
