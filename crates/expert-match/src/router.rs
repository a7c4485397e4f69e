//! HTTP surface of the matching core, consumed by the expert- and
//! client-facing UIs and by admin tooling.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::invitations::domain::{InviteAction, InviteId, InviteStatus, ProposalDetails};
use crate::invitations::repository::InviteRepository;
use crate::invitations::selection::{SelectionCoordinator, SelectionError, SelectionOutcome};
use crate::invitations::service::{InvitationService, InviteError};
use crate::matching::domain::{BriefId, ExpertId};
use crate::matching::ranker::{CandidateRanker, RankOptions};
use crate::matching::repository::{MarketplaceStore, MatchingRunStore};
use crate::notifications::dispatcher::EventDispatcher;
use crate::notifications::events::MatchEvent;
use crate::notifications::store::{DispatchStore, EmailSender};

/// Everything one marketplace deployment wires together.
pub struct EngineState<M, R, I, S, E> {
    pub ranker: CandidateRanker<M, R>,
    pub invitations: InvitationService<I>,
    pub selection: SelectionCoordinator<I, M>,
    pub dispatcher: EventDispatcher<S, E, M>,
}

type SharedEngine<M, R, I, S, E> = Arc<EngineState<M, R, I, S, E>>;

/// Router builder exposing the matching, invitation, and selection
/// endpoints under `/api/v1`.
pub fn marketplace_router<M, R, I, S, E>(state: SharedEngine<M, R, I, S, E>) -> Router
where
    M: MarketplaceStore + 'static,
    R: MatchingRunStore + 'static,
    I: InviteRepository + 'static,
    S: DispatchStore + 'static,
    E: EmailSender + 'static,
{
    Router::new()
        .route(
            "/api/v1/briefs/:brief_id/matches",
            post(rank_handler::<M, R, I, S, E>),
        )
        .route(
            "/api/v1/briefs/:brief_id/invites",
            post(create_invites_handler::<M, R, I, S, E>)
                .get(list_invites_handler::<M, R, I, S, E>),
        )
        .route(
            "/api/v1/invites/:invite_id/view",
            post(view_handler::<M, R, I, S, E>),
        )
        .route(
            "/api/v1/invites/:invite_id/respond",
            post(respond_handler::<M, R, I, S, E>),
        )
        .route(
            "/api/v1/briefs/:brief_id/selection",
            post(select_handler::<M, R, I, S, E>),
        )
        .route(
            "/api/v1/briefs/:brief_id/selection/reassign",
            post(reassign_handler::<M, R, I, S, E>),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RankRequest {
    pub(crate) min_score: Option<f64>,
    pub(crate) max_results: Option<usize>,
    #[serde(default)]
    pub(crate) widen: bool,
}

impl RankRequest {
    fn options(&self) -> RankOptions {
        let defaults = RankOptions::default();
        RankOptions {
            min_score: self.min_score.unwrap_or(defaults.min_score),
            max_results: self.max_results.unwrap_or(defaults.max_results),
            widen: self.widen,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RespondRequest {
    pub(crate) action: InviteAction,
    pub(crate) message: Option<String>,
    pub(crate) proposal: Option<ProposalDetails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectionRequest {
    pub(crate) expert_id: String,
}

pub(crate) async fn rank_handler<M, R, I, S, E>(
    State(state): State<SharedEngine<M, R, I, S, E>>,
    Path(brief_id): Path<String>,
    axum::Json(payload): axum::Json<RankRequest>,
) -> Response
where
    M: MarketplaceStore + 'static,
    R: MatchingRunStore + 'static,
    I: InviteRepository + 'static,
    S: DispatchStore + 'static,
    E: EmailSender + 'static,
{
    match state
        .ranker
        .rank(&BriefId(brief_id), payload.options(), Utc::now())
    {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn create_invites_handler<M, R, I, S, E>(
    State(state): State<SharedEngine<M, R, I, S, E>>,
    Path(brief_id): Path<String>,
    axum::Json(payload): axum::Json<RankRequest>,
) -> Response
where
    M: MarketplaceStore + 'static,
    R: MatchingRunStore + 'static,
    I: InviteRepository + 'static,
    S: DispatchStore + 'static,
    E: EmailSender + 'static,
{
    let brief_id = BriefId(brief_id);
    let now = Utc::now();

    let outcome = match state.ranker.rank(&brief_id, payload.options(), now) {
        Ok(outcome) => outcome,
        Err(err) => return internal_error(err),
    };

    let created = match state
        .invitations
        .create_invites(&brief_id, &outcome.candidates, now)
    {
        Ok(created) => created,
        Err(err) => return invite_error_response(err),
    };

    // Dispatch strictly after the invites are committed; delivery failures
    // never roll the invites back.
    for invite in &created {
        state.dispatcher.dispatch(
            &MatchEvent::InviteSent {
                brief_id: invite.brief_id.clone(),
                expert_id: invite.expert_id.clone(),
                invite_id: invite.id.clone(),
                score: invite.score_at_invite,
                expires_at: invite.expires_at,
            },
            now,
        );
    }

    (
        StatusCode::CREATED,
        axum::Json(json!({
            "invites": created,
            "metadata": outcome.metadata,
        })),
    )
        .into_response()
}

pub(crate) async fn list_invites_handler<M, R, I, S, E>(
    State(state): State<SharedEngine<M, R, I, S, E>>,
    Path(brief_id): Path<String>,
) -> Response
where
    M: MarketplaceStore + 'static,
    R: MatchingRunStore + 'static,
    I: InviteRepository + 'static,
    S: DispatchStore + 'static,
    E: EmailSender + 'static,
{
    match state.invitations.invites_for_brief(&BriefId(brief_id)) {
        Ok(invites) => (StatusCode::OK, axum::Json(json!({ "invites": invites }))).into_response(),
        Err(err) => invite_error_response(err),
    }
}

pub(crate) async fn view_handler<M, R, I, S, E>(
    State(state): State<SharedEngine<M, R, I, S, E>>,
    Path(invite_id): Path<String>,
) -> Response
where
    M: MarketplaceStore + 'static,
    R: MatchingRunStore + 'static,
    I: InviteRepository + 'static,
    S: DispatchStore + 'static,
    E: EmailSender + 'static,
{
    match state
        .invitations
        .mark_viewed(&InviteId(invite_id), Utc::now())
    {
        Ok(invite) => (StatusCode::OK, axum::Json(invite)).into_response(),
        Err(err) => invite_error_response(err),
    }
}

pub(crate) async fn respond_handler<M, R, I, S, E>(
    State(state): State<SharedEngine<M, R, I, S, E>>,
    Path(invite_id): Path<String>,
    axum::Json(payload): axum::Json<RespondRequest>,
) -> Response
where
    M: MarketplaceStore + 'static,
    R: MatchingRunStore + 'static,
    I: InviteRepository + 'static,
    S: DispatchStore + 'static,
    E: EmailSender + 'static,
{
    let now = Utc::now();
    let invite = match state.invitations.respond(
        &InviteId(invite_id),
        payload.action,
        payload.message,
        payload.proposal,
        now,
    ) {
        Ok(invite) => invite,
        Err(err) => return invite_error_response(err),
    };

    if invite.status == InviteStatus::Accepted {
        state.dispatcher.dispatch(
            &MatchEvent::ProposalAccepted {
                brief_id: invite.brief_id.clone(),
                expert_id: invite.expert_id.clone(),
                invite_id: invite.id.clone(),
                message: invite.response_message.clone(),
                proposal: invite.proposal.clone(),
            },
            now,
        );
    }

    (StatusCode::OK, axum::Json(invite)).into_response()
}

pub(crate) async fn select_handler<M, R, I, S, E>(
    State(state): State<SharedEngine<M, R, I, S, E>>,
    Path(brief_id): Path<String>,
    axum::Json(payload): axum::Json<SelectionRequest>,
) -> Response
where
    M: MarketplaceStore + 'static,
    R: MatchingRunStore + 'static,
    I: InviteRepository + 'static,
    S: DispatchStore + 'static,
    E: EmailSender + 'static,
{
    let brief_id = BriefId(brief_id);
    let expert_id = ExpertId(payload.expert_id);
    match state.selection.select_expert(&brief_id, &expert_id) {
        Ok(outcome) => finalize_selection_response(&state, outcome),
        Err(err) => selection_error_response(err),
    }
}

pub(crate) async fn reassign_handler<M, R, I, S, E>(
    State(state): State<SharedEngine<M, R, I, S, E>>,
    Path(brief_id): Path<String>,
    axum::Json(payload): axum::Json<SelectionRequest>,
) -> Response
where
    M: MarketplaceStore + 'static,
    R: MatchingRunStore + 'static,
    I: InviteRepository + 'static,
    S: DispatchStore + 'static,
    E: EmailSender + 'static,
{
    let brief_id = BriefId(brief_id);
    let expert_id = ExpertId(payload.expert_id);
    match state.selection.reassign_expert(&brief_id, &expert_id) {
        Ok(outcome) => finalize_selection_response(&state, outcome),
        Err(err) => selection_error_response(err),
    }
}

fn finalize_selection_response<M, R, I, S, E>(
    state: &EngineState<M, R, I, S, E>,
    outcome: SelectionOutcome,
) -> Response
where
    M: MarketplaceStore + 'static,
    R: MatchingRunStore + 'static,
    I: InviteRepository + 'static,
    S: DispatchStore + 'static,
    E: EmailSender + 'static,
{
    let now = Utc::now();
    state.dispatcher.dispatch(
        &MatchEvent::ExpertSelected {
            brief_id: outcome.brief.id.clone(),
            expert_id: outcome.winner.expert_id.clone(),
        },
        now,
    );
    for displaced in &outcome.displaced {
        state.dispatcher.dispatch(
            &MatchEvent::SelectionClosed {
                brief_id: displaced.brief_id.clone(),
                expert_id: displaced.expert_id.clone(),
            },
            now,
        );
    }

    (
        StatusCode::OK,
        axum::Json(json!({
            "brief": outcome.brief,
            "winner": outcome.winner,
            "displaced": outcome.displaced,
        })),
    )
        .into_response()
}

fn invite_error_response(error: InviteError) -> Response {
    let status = match &error {
        InviteError::NotFound => StatusCode::NOT_FOUND,
        InviteError::NotRespondable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        InviteError::Conflict => StatusCode::CONFLICT,
        InviteError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn selection_error_response(error: SelectionError) -> Response {
    let status = match &error {
        SelectionError::InviteNotFound => StatusCode::NOT_FOUND,
        SelectionError::InviteNotEligible { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SelectionError::BriefResolved => StatusCode::CONFLICT,
        SelectionError::Invites(_) | SelectionError::Marketplace(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn internal_error(error: impl std::fmt::Display) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
