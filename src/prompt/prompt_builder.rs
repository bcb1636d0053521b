//! Deterministic prompt assembly.
//!
//! Section order is fixed: persona, contact facts, services, document text,
//! conversation window, new user message. Nothing is truncated here; an
//! oversized prompt is rejected by the model gateway.

use crate::conversation::message::{ChatMessage, Sender};
use crate::knowledge::store::{CompanyInfo, Service};

/// Persona and behaviour instruction placed at the top of every prompt.
pub const SYSTEM_PREAMBLE: &str = "Ti si ljubazan i profesionalan asistent na sajtu AI Agencije. \
Pomažeš klijentima da razumeju kako veštačka inteligencija može unaprediti njihov biznis. \
Odgovaraj kratko i jasno, na jeziku kojim ti se korisnik obraća. \
Koristi isključivo podatke o firmi, uslugama i dokumentima navedenim ispod; \
ako nešto ne znaš, uputi korisnika na kontakt podatke umesto da izmišljaš.";

/// Rendered in place of the history section when a session has no prior turns.
pub const NO_HISTORY_MARKER: &str = "(Nema prethodnih poruka.)";

/// Prompt parts before formatting.
#[derive(Clone, Copy, Debug)]
pub struct PromptParts<'a> {
    /// Persona instruction.
    pub system_preamble: &'a str,
    /// Company facts.
    pub contact_facts: &'a [CompanyInfo],
    /// Service offerings.
    pub service_facts: &'a [Service],
    /// Raw document text.
    pub document_knowledge: &'a str,
    /// Recent turns, oldest first, excluding the current message.
    pub history: &'a [ChatMessage],
    /// Message being answered.
    pub user_message: &'a str,
}

impl PromptParts<'_> {
    /// Approximate the character count of the prompt.
    #[must_use]
    pub fn estimate_len(&self) -> usize {
        let facts: usize = self
            .contact_facts
            .iter()
            .map(|fact| fact.key.len() + fact.value.len() + 4)
            .sum();
        let services: usize = self
            .service_facts
            .iter()
            .map(|s| s.name.len() + s.price.len() + s.description.len() + 8)
            .sum();
        let turns: usize = self.history.iter().map(|m| m.content.len() + 18).sum();
        self.system_preamble.len()
            + facts
            + services
            + self.document_knowledge.len()
            + turns
            + self.user_message.len()
            + 256
    }
}

/// Build the full prompt text sent to the model.
#[must_use]
pub fn build_prompt(parts: &PromptParts<'_>) -> String {
    let mut out = String::with_capacity(parts.estimate_len());

    out.push_str(parts.system_preamble);
    out.push_str("\n\n");

    out.push_str("KONTAKT PODACI FIRME:\n");
    for fact in parts.contact_facts {
        out.push_str("- ");
        out.push_str(&capitalize(&fact.key));
        out.push_str(": ");
        out.push_str(&fact.value);
        out.push('\n');
    }
    out.push('\n');

    out.push_str("NAŠE USLUGE:\n");
    for service in parts.service_facts {
        out.push_str("- ");
        out.push_str(&service.name);
        out.push_str(" (");
        out.push_str(&service.price);
        out.push_str("): ");
        out.push_str(&service.description);
        out.push('\n');
    }
    out.push('\n');

    out.push_str("DODATNO ZNANJE IZ DOKUMENATA:\n");
    out.push_str(parts.document_knowledge);
    out.push_str("\n\n");

    out.push_str("ISTORIJA RAZGOVORA:\n");
    if parts.history.is_empty() {
        out.push_str(NO_HISTORY_MARKER);
        out.push('\n');
    } else {
        for turn in parts.history {
            render_turn(&mut out, turn);
        }
    }
    out.push('\n');

    out.push_str("NOVA PORUKA KORISNIKA:\n");
    out.push_str(parts.user_message);
    out.push('\n');

    out
}

fn render_turn(out: &mut String, turn: &ChatMessage) {
    let label = match turn.sender {
        Sender::User => "Korisnik",
        Sender::Bot => "Ti (Asistent)",
    };
    out.push_str(label);
    out.push_str(": ");
    out.push_str(&turn.content);
    out.push('\n');
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
