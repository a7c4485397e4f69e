use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::Args;

use expert_match::error::AppError;
use expert_match::invitations::{
    InvitationService, InviteAction, ProposalDetails, SelectionCoordinator, SelectionError,
};
use expert_match::matching::{CandidateRanker, RankOptions};
use expert_match::notifications::{EventDispatcher, MatchEvent, OutboxStatus};

use crate::infra::{
    default_match_settings, seed_marketplace, InMemoryDispatchStore, InMemoryInviteRepository,
    InMemoryMarketplace, InMemoryRunStore, LoggingEmailSender,
};

const DEMO_RESPONSE_WINDOW_HOURS: i64 = 72;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Minimum score for the widened second ranking pass
    #[arg(long, default_value_t = 0.5)]
    pub(crate) widened_min_score: f64,
    /// Maximum shortlist size
    #[arg(long, default_value_t = 5)]
    pub(crate) max_results: usize,
}

fn to_app_error(err: impl std::fmt::Display) -> AppError {
    AppError::Io(std::io::Error::other(err.to_string()))
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let marketplace = Arc::new(InMemoryMarketplace::default());
    let brief_id = seed_marketplace(&marketplace);

    let invites = Arc::new(InMemoryInviteRepository::default());
    let runs = Arc::new(InMemoryRunStore::default());
    let dispatch_store = Arc::new(InMemoryDispatchStore::default());

    let ranker = CandidateRanker::new(marketplace.clone(), runs, default_match_settings());
    let invitations = InvitationService::new(invites.clone(), DEMO_RESPONSE_WINDOW_HOURS);
    let selection = SelectionCoordinator::new(invites.clone(), marketplace.clone());
    let dispatcher = EventDispatcher::new(
        dispatch_store.clone(),
        Arc::new(LoggingEmailSender),
        marketplace,
    );

    let now = Utc::now();

    println!("=== Ranking (default threshold) ===");
    let first_pass = ranker
        .rank(&brief_id, RankOptions::default(), now)
        .map_err(to_app_error)?;
    println!(
        "pool of {} evaluated, {} qualified at min score {:.2}",
        first_pass.metadata.pool_size,
        first_pass.candidates.len(),
        first_pass.metadata.min_score,
    );

    println!("\n=== Ranking (widened) ===");
    let widened = ranker
        .rank(
            &brief_id,
            RankOptions {
                min_score: args.widened_min_score,
                max_results: args.max_results,
                widen: true,
            },
            now,
        )
        .map_err(to_app_error)?;
    for candidate in &widened.candidates {
        println!(
            "  {}  score {:.3}{}",
            candidate.expert_id.0,
            candidate.score,
            if candidate.score > 1.0 {
                "  (above 1.0: weights plus certification bonus)"
            } else {
                ""
            }
        );
        for reason in &candidate.reasons {
            println!("      + {reason}");
        }
        for flag in &candidate.flags {
            println!("      ! {}", flag.label());
        }
    }

    println!("\n=== Invitations ===");
    let created = invitations
        .create_invites(&brief_id, &widened.candidates, now)
        .map_err(to_app_error)?;
    for invite in &created {
        println!(
            "  {} -> {} (expires {})",
            invite.id.0,
            invite.expert_id.0,
            invite.expires_at.format("%Y-%m-%d %H:%M UTC")
        );
        dispatcher.dispatch(
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

    println!("\n=== Responses ===");
    for invite in &created {
        invitations
            .mark_viewed(&invite.id, now + Duration::hours(1))
            .map_err(to_app_error)?;
        let accepted = invitations
            .respond(
                &invite.id,
                InviteAction::Accept,
                Some("Happy to take this on".to_string()),
                Some(ProposalDetails {
                    hours_per_week: 20,
                    rate: 120,
                    timeline: "6 weeks".to_string(),
                }),
                now + Duration::hours(2),
            )
            .map_err(to_app_error)?;
        println!("  {} accepted", accepted.expert_id.0);
        dispatcher.dispatch(
            &MatchEvent::ProposalAccepted {
                brief_id: accepted.brief_id.clone(),
                expert_id: accepted.expert_id.clone(),
                invite_id: accepted.id.clone(),
                message: accepted.response_message.clone(),
                proposal: accepted.proposal.clone(),
            },
            now + Duration::hours(2),
        );
    }

    println!("\n=== Selection ===");
    let winner_id = created
        .first()
        .map(|invite| invite.expert_id.clone())
        .ok_or_else(|| to_app_error("no invites were created"))?;
    let outcome = selection
        .select_expert(&brief_id, &winner_id)
        .map_err(to_app_error)?;
    println!("  winner: {}", outcome.winner.expert_id.0);
    dispatcher.dispatch(
        &MatchEvent::ExpertSelected {
            brief_id: outcome.brief.id.clone(),
            expert_id: outcome.winner.expert_id.clone(),
        },
        now + Duration::hours(3),
    );
    for displaced in &outcome.displaced {
        println!("  not selected: {}", displaced.expert_id.0);
        dispatcher.dispatch(
            &MatchEvent::SelectionClosed {
                brief_id: displaced.brief_id.clone(),
                expert_id: displaced.expert_id.clone(),
            },
            now + Duration::hours(3),
        );
    }

    if let Some(runner_up) = outcome.displaced.first() {
        match selection.select_expert(&brief_id, &runner_up.expert_id) {
            Err(SelectionError::BriefResolved) => {
                println!(
                    "  second selection for {} rejected: brief already resolved",
                    runner_up.expert_id.0
                );
            }
            other => {
                println!("  unexpected second selection outcome: {other:?}");
            }
        }
    }

    println!("\n=== Dispatch ledger ===");
    let outbox = dispatch_store.outbox();
    let sent = outbox
        .iter()
        .filter(|entry| entry.status == OutboxStatus::Sent)
        .count();
    println!("  outbox rows: {} ({} sent)", outbox.len(), sent);
    println!(
        "  in-app notifications: {}",
        dispatch_store.notifications().len()
    );
    for change in dispatch_store.changes() {
        println!(
            "  change feed: {} / {} -> {}",
            change.brief_id.0,
            change.expert_id.0,
            change.status.label()
        );
    }

    Ok(())
}
