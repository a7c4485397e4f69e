use crate::matching::domain::Contact;

use super::events::MatchEvent;

/// A named template rendered against one event for one recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage {
    pub template: &'static str,
    pub subject: String,
    pub body: String,
    pub title: String,
    pub call_to_action: String,
}

/// Render the event's template. Subject/body feed the email outbox; title
/// and call-to-action feed the in-app notification row.
pub fn render(event: &MatchEvent, brief_headline: &str, recipient: &Contact) -> RenderedMessage {
    let template = event.template();
    match event {
        MatchEvent::InviteSent { expires_at, .. } => RenderedMessage {
            template,
            subject: format!("You're invited: {brief_headline}"),
            body: format!(
                "Hi {}, a client thinks you're a fit for \"{brief_headline}\". \
                 Respond before {} to be considered.",
                recipient.display_name,
                expires_at.format("%Y-%m-%d %H:%M UTC")
            ),
            title: "New brief invitation".to_string(),
            call_to_action: "Review the brief and respond".to_string(),
        },
        MatchEvent::ProposalAccepted { message, .. } => RenderedMessage {
            template,
            subject: format!("An expert accepted your brief: {brief_headline}"),
            body: match message {
                Some(note) => format!(
                    "Hi {}, an invited expert accepted \"{brief_headline}\" and wrote: {note}",
                    recipient.display_name
                ),
                None => format!(
                    "Hi {}, an invited expert accepted \"{brief_headline}\".",
                    recipient.display_name
                ),
            },
            title: "Expert accepted your brief".to_string(),
            call_to_action: "Review their proposal".to_string(),
        },
        MatchEvent::ExpertSelected { .. } => RenderedMessage {
            template,
            subject: format!("Engagement confirmed: {brief_headline}"),
            body: format!(
                "Hi {}, the engagement for \"{brief_headline}\" is confirmed.",
                recipient.display_name
            ),
            title: "Engagement confirmed".to_string(),
            call_to_action: "Open the project workspace".to_string(),
        },
        MatchEvent::SelectionClosed { .. } => RenderedMessage {
            template,
            subject: format!("Update on {brief_headline}"),
            body: format!(
                "Hi {}, the client went with another expert for \"{brief_headline}\". \
                 Thanks for responding; you stay visible for future briefs.",
                recipient.display_name
            ),
            title: "Brief resolved".to_string(),
            call_to_action: "Browse open briefs".to_string(),
        },
        MatchEvent::MilestoneReached { milestone, .. } => RenderedMessage {
            template,
            subject: format!("Milestone reached on {brief_headline}"),
            body: format!(
                "Hi {}, \"{milestone}\" is complete on \"{brief_headline}\".",
                recipient.display_name
            ),
            title: format!("Milestone: {milestone}"),
            call_to_action: "See milestone details".to_string(),
        },
        MatchEvent::QaReviewRequested { notes, .. } => RenderedMessage {
            template,
            subject: format!("QA review requested on {brief_headline}"),
            body: format!(
                "Hi {}, a QA review was requested on \"{brief_headline}\": {notes}",
                recipient.display_name
            ),
            title: "QA review requested".to_string(),
            call_to_action: "Open the QA checklist".to_string(),
        },
    }
}
