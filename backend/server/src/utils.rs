use bank::{
    effects::{Submission, SubmissionStatus, Variant},
    radar::RadarShape,
    sanitize,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError::{self, ValidationError};

const MAX_TITLE_CHARS: usize = 120;
const MAX_VARIANT_CHARS: usize = 200;
const MAX_TEXT_CHARS: usize = 500;

pub fn parse_id(raw: &str) -> Result<u32, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError(format!("Invalid effect id {raw:?}")))
}

pub fn parse_variant(raw: &str) -> Result<Variant, AppError> {
    raw.parse().map_err(|e| ValidationError(format!("{e}")))
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub title: String,
    pub question: String,
    pub variant_a: String,
    pub variant_b: String,
    pub category: String,
    #[serde(default)]
    pub source_link: Option<String>,
}

fn required(field: &str, value: &str, max_chars: usize) -> Result<String, AppError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError(format!("{field} is required")));
    }

    if value.chars().count() > max_chars {
        return Err(ValidationError(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }

    Ok(value.to_string())
}

/// Trims and checks a submission, then stamps it as pending.
pub fn build_submission(request: SubmissionRequest) -> Result<Submission, AppError> {
    let title = required("title", &request.title, MAX_TITLE_CHARS)?;
    let question = required("question", &request.question, MAX_TEXT_CHARS)?;
    let variant_a = required("variantA", &request.variant_a, MAX_VARIANT_CHARS)?;
    let variant_b = required("variantB", &request.variant_b, MAX_VARIANT_CHARS)?;

    if variant_a.eq_ignore_ascii_case(&variant_b) {
        return Err(ValidationError("Variants must differ".to_string()));
    }

    let category = sanitize(&request.category);
    if category.is_empty() {
        return Err(ValidationError("category is required".to_string()));
    }

    let source_link = match request.source_link.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(link) if link.starts_with("http://") || link.starts_with("https://") => {
            Some(link.to_string())
        }
        Some(_) => {
            return Err(ValidationError(
                "sourceLink must be an http(s) URL".to_string(),
            ));
        }
    };

    Ok(Submission {
        id: Uuid::new_v4().to_string(),
        title,
        question,
        variant_a,
        variant_b,
        category,
        source_link,
        submitted_at: Utc::now(),
        status: SubmissionStatus::Pending,
    })
}

#[derive(Deserialize, Debug, Default)]
pub struct RadarQuery {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub padding: Option<f64>,
    pub distortion: Option<f64>,
    pub seed: Option<f64>,
}

impl RadarQuery {
    pub fn shape(&self) -> Result<RadarShape, AppError> {
        let defaults = RadarShape::default();
        let shape = RadarShape {
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            padding: self.padding.unwrap_or(defaults.padding),
            distortion: self.distortion.unwrap_or(defaults.distortion),
            seed: self.seed.unwrap_or(defaults.seed),
        };

        let finite = [shape.width, shape.height, shape.padding, shape.distortion, shape.seed]
            .iter()
            .all(|v| v.is_finite());

        if !finite || shape.width <= 0.0 || shape.height <= 0.0 || shape.radius() <= 0.0 {
            return Err(ValidationError(
                "width and height must leave room after padding".to_string(),
            ));
        }

        Ok(shape)
    }
}
