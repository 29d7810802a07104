use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State as AxumState,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use bank::{
    effects::{Effect, Submission},
    flavor::flavor_text,
    radar::radar_path,
    stats::{CategorySummary, SiteStats, VoteAggregate, summarize_categories},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    auth::{Admin, verify_password},
    error::AppError,
    state::State,
    utils::{RadarQuery, SubmissionRequest, build_submission, parse_id, parse_variant},
};

type AppState = AxumState<Arc<State>>;

#[derive(Deserialize, Debug, Default)]
pub struct EffectsQuery {
    pub category: Option<String>,
}

pub async fn effects_handler(
    AxumState(state): AppState,
    query: Result<Query<EffectsQuery>, QueryRejection>,
) -> Result<Json<Vec<Effect>>, AppError> {
    let Query(query) = query?;
    let category = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let effects = state.repository.list(category).await?;

    if let Some(category) = category {
        if effects.is_empty() {
            return Err(AppError::NotFound(format!("Category {category:?} not found")));
        }
    }

    Ok(Json(effects))
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EffectDetail {
    #[serde(flatten)]
    pub effect: Effect,
    pub percent_a: f64,
    pub percent_b: f64,
    pub total_votes: u64,
    pub flavor_text: &'static str,
}

impl From<Effect> for EffectDetail {
    fn from(effect: Effect) -> Self {
        let aggregate = VoteAggregate::of(&effect);
        let flavor_text = flavor_text(&effect.title);

        Self {
            effect,
            percent_a: aggregate.percent_for,
            percent_b: aggregate.percent_against,
            total_votes: aggregate.total,
            flavor_text,
        }
    }
}

pub async fn effect_handler(
    AxumState(state): AppState,
    Path(raw_id): Path<String>,
) -> Result<Json<EffectDetail>, AppError> {
    let id = parse_id(&raw_id)?;
    let effect = state.repository.get(id).await?;

    Ok(Json(effect.into()))
}

pub async fn categories_handler(
    AxumState(state): AppState,
) -> Result<Json<Vec<CategorySummary>>, AppError> {
    let effects = state.repository.all().await?;

    Ok(Json(summarize_categories(&effects)))
}

#[derive(Serialize, Debug)]
pub struct RadarResponse {
    pub categories: Vec<String>,
    pub path: String,
}

/// One spoke per category, scaled against the biggest category.
pub async fn radar_handler(
    AxumState(state): AppState,
    query: Result<Query<RadarQuery>, QueryRejection>,
) -> Result<Json<RadarResponse>, AppError> {
    let Query(query) = query?;
    let shape = query.shape()?;
    let summaries = summarize_categories(&state.repository.all().await?);

    let max = summaries.iter().map(|s| s.count).max().unwrap_or(0).max(1) as f64;
    let values: Vec<f64> = summaries
        .iter()
        .map(|s| s.count as f64 / max * 100.0)
        .collect();

    Ok(Json(RadarResponse {
        categories: summaries.into_iter().map(|s| s.category).collect(),
        path: radar_path(&values, &shape),
    }))
}

/// Always answers, a failed read degrades to the configured numbers.
pub async fn stats_handler(AxumState(state): AppState) -> Json<SiteStats> {
    match state.repository.all().await {
        Ok(effects) => Json(SiteStats::from_effects(&effects)),
        Err(e) => {
            warn!("Stats read failed, serving fallback: {e}");
            Json(state.config.stats_fallback)
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub effect_id: u32,
    pub variant: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub effect_id: u32,
    pub variant: String,
    #[serde(flatten)]
    pub aggregate: VoteAggregate,
}

pub async fn vote_handler(
    AxumState(state): AppState,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<VoteResponse>, AppError> {
    let Json(request) = payload?;
    let variant = parse_variant(&request.variant)?;

    let aggregate = state.repository.increment(request.effect_id, variant).await?;

    #[cfg(feature = "verbose")]
    info!("Vote {variant} on effect {}", request.effect_id);

    Ok(Json(VoteResponse {
        effect_id: request.effect_id,
        variant: variant.to_string(),
        aggregate,
    }))
}

pub async fn submission_handler(
    AxumState(state): AppState,
    payload: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Submission>), AppError> {
    let Json(request) = payload?;
    let submission = build_submission(request)?;

    state.repository.add_submission(submission.clone()).await?;
    info!("New submission {} queued for moderation", submission.id);

    Ok((StatusCode::CREATED, Json(submission)))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
}

pub async fn login_handler(
    AxumState(state): AppState,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload?;

    let (Some(hash), Some(tokens)) = (&state.config.admin_password_hash, &state.tokens) else {
        return Err(AppError::AuthError("Admin access is disabled".to_string()));
    };

    if !verify_password(&request.password, hash)? {
        warn!("Rejected admin login");
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    info!("Admin logged in");

    Ok(Json(LoginResponse {
        token: tokens.issue()?,
        expires_in: tokens.ttl_secs(),
    }))
}

pub async fn admin_effects_handler(
    _admin: Admin,
    AxumState(state): AppState,
) -> Result<Json<Vec<Effect>>, AppError> {
    Ok(Json(state.repository.all().await?))
}

pub async fn admin_delete_handler(
    _admin: Admin,
    AxumState(state): AppState,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&raw_id)?;
    state.repository.delete(id).await?;

    info!("Deleted effect {id}");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn admin_submissions_handler(
    _admin: Admin,
    AxumState(state): AppState,
) -> Result<Json<Vec<Submission>>, AppError> {
    Ok(Json(state.repository.submissions().await?))
}
