//! Builds memes from parsed query parameters.

use crate::models::meme::{Meme, MemeParams};

/// Produces the payload of a metered meme request.
pub trait MemeProvider: Send + Sync {
    fn build_meme(&self, params: &MemeParams) -> anyhow::Result<Meme>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemeMaker;

impl MemeProvider for MemeMaker {
    fn build_meme(&self, params: &MemeParams) -> anyhow::Result<Meme> {
        let mut meme = Meme::default();

        if !params.query.is_empty() {
            meme = meme.with_top_text(params.query.clone());
        }

        // Zero means "not supplied"; both coordinates are needed for a location
        if params.lat != 0.0 && params.lon != 0.0 {
            meme = meme.with_image_location(format!("{:.6} x {:.6}", params.lat, params.lon));
        }

        Ok(meme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::meme::{DEFAULT_IMAGE_LOCATION, DEFAULT_TOP_TEXT};

    fn build(lat: f64, lon: f64, query: &str) -> Meme {
        MemeMaker
            .build_meme(&MemeParams {
                lat,
                lon,
                query: query.to_string(),
            })
            .unwrap()
    }

    #[test]
    fn empty_params_build_default_meme() {
        assert_eq!(build(0.0, 0.0, ""), Meme::default());
    }

    #[test]
    fn query_sets_top_text() {
        let meme = build(0.0, 0.0, "Test");
        assert_eq!(meme.top_text, "Test");
        assert_eq!(meme.image_location, DEFAULT_IMAGE_LOCATION);
    }

    #[test]
    fn lat_and_lon_set_image_location() {
        let meme = build(1.0, 2.0, "");
        assert_eq!(meme.image_location, "1.000000 x 2.000000");
        assert_eq!(meme.top_text, DEFAULT_TOP_TEXT);
    }

    #[test]
    fn one_coordinate_is_not_enough() {
        assert_eq!(build(1.0, 0.0, "").image_location, DEFAULT_IMAGE_LOCATION);
        assert_eq!(build(0.0, 2.0, "").image_location, DEFAULT_IMAGE_LOCATION);
    }

    #[test]
    fn all_params_together() {
        assert_eq!(
            build(1.0, 2.0, "Test"),
            Meme {
                top_text: "Test".to_string(),
                bottom_text: "Bottom Text".to_string(),
                image_location: "1.000000 x 2.000000".to_string(),
            }
        );
    }
}
