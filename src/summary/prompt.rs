use crate::llm::sanitize_evidence;
use crate::models::{ChatSessionInfo, DocumentInfo, ProfileData, TranscriptionInfo};

/// Longest single chat message carried into a prompt, in chars.
pub const MAX_MESSAGE_CHARS: usize = 2_000;
/// Longest evidence block carried into a prompt, in chars.
pub const MAX_EVIDENCE_CHARS: usize = 12_000;

pub const SUMMARY_SYSTEM_PROMPT: &str = r#"You maintain a concise health summary for one person, written for that person and their caregivers.

RULES:
1. Write in plain, factual, third-person prose ("The patient ...").
2. Include only health-relevant facts: conditions, medications and doses, allergies, procedures, test results, symptoms, lifestyle factors, care team.
3. NEVER diagnose, speculate, prescribe, or give medical advice.
4. When new information contradicts the existing summary, prefer the newer information and drop the outdated statement.
5. Keep every existing fact that the new information does not touch.
6. Output ONLY the summary text. No headings, no preamble, no explanations of what changed."#;

const MERGE_INSTRUCTIONS: &str = "Merge any new clinically relevant facts from the evidence above into the current summary. \
Preserve all existing content that the evidence does not address. \
If the evidence contains nothing health-relevant, return the current summary unchanged. \
Return the complete updated summary.";

/// Prompt for the first summary of a profile, from its stored fields.
pub fn build_initial_prompt(profile: &ProfileData) -> String {
    let mut facts: Vec<String> = Vec::new();

    if let Some(name) = non_blank(profile.full_name.as_deref()) {
        facts.push(format!("Name: {name}"));
    }
    if let Some(dob) = profile.date_of_birth {
        let today = chrono::Utc::now().date_naive();
        match profile.age_on(today) {
            Some(age) => facts.push(format!("Date of birth: {dob} (age {age})")),
            None => facts.push(format!("Date of birth: {dob}")),
        }
    }
    if let Some(gender) = non_blank(profile.gender.as_deref()) {
        facts.push(format!("Gender: {gender}"));
    }
    if let Some(blood) = non_blank(profile.blood_type.as_deref()) {
        facts.push(format!("Blood type: {blood}"));
    }
    if let Some(height) = profile.height_cm {
        facts.push(format!("Height: {height} cm"));
    }
    if let Some(weight) = profile.weight_kg {
        facts.push(format!("Weight: {weight} kg"));
    }
    push_list(&mut facts, "Allergies", &profile.allergies);
    push_list(&mut facts, "Chronic conditions", &profile.chronic_conditions);
    push_list(&mut facts, "Current medications", &profile.current_medications);
    if let Some(notes) = non_blank(profile.notes.as_deref()) {
        let notes = sanitize_evidence(notes, crate::config::INITIAL_SOURCE_TAG);
        if !notes.is_empty() {
            facts.push(format!("Notes: {}", truncate_chars(&notes, MAX_MESSAGE_CHARS)));
        }
    }

    let mut prompt = String::new();
    if facts.is_empty() {
        prompt.push_str("No profile details have been provided yet.\n\n");
        prompt.push_str(
            "Write a one-sentence placeholder summary stating that no health information has been recorded yet.",
        );
        return prompt;
    }

    prompt.push_str("<PROFILE>\n");
    for fact in &facts {
        prompt.push_str(&format!("- {fact}\n"));
    }
    prompt.push_str("</PROFILE>\n\n");
    prompt.push_str(
        "Write the initial health summary for this person using ONLY the profile details above. \
         Do not invent facts that are not listed.",
    );
    prompt
}

/// Merge prompt for a processed document.
pub fn build_document_prompt(current: Option<&str>, doc: &DocumentInfo) -> String {
    let source = doc.source_tag();
    let title = sanitize_evidence(&doc.title, &source);
    let content = sanitize_evidence(&doc.extracted_text, &source);

    let mut header = format!("Title: {title}\n");
    if let Some(kind) = non_blank(doc.document_type.as_deref()) {
        header.push_str(&format!("Type: {kind}\n"));
    }
    if let Some(date) = doc.document_date {
        header.push_str(&format!("Date: {date}\n"));
    }

    let mut prompt = current_summary_block(current);
    prompt.push_str("<NEW_DOCUMENT>\n");
    prompt.push_str(&header);
    prompt.push_str("Content:\n");
    prompt.push_str(truncate_chars(&content, MAX_EVIDENCE_CHARS));
    prompt.push_str("\n</NEW_DOCUMENT>\n\n");
    prompt.push_str("The evidence is text extracted from a medical document the person uploaded. ");
    prompt.push_str(MERGE_INSTRUCTIONS);
    prompt
}

/// Merge prompt for a finished chat session.
pub fn build_chat_session_prompt(current: Option<&str>, chat: &ChatSessionInfo) -> String {
    let mut prompt = current_summary_block(current);
    prompt.push_str("<CHAT_TRANSCRIPT>\n");
    prompt.push_str(&render_transcript(chat));
    prompt.push_str("</CHAT_TRANSCRIPT>\n\n");
    prompt.push_str(
        "The evidence is a conversation between the person (User) and a health assistant (Assistant). \
         Only facts the User states about their own health count as evidence; ignore general information \
         the Assistant provides. ",
    );
    prompt.push_str(MERGE_INSTRUCTIONS);
    prompt
}

/// Merge prompt for a transcribed voice note.
pub fn build_transcription_prompt(current: Option<&str>, voice: &TranscriptionInfo) -> String {
    let mut prompt = current_summary_block(current);
    prompt.push_str("<VOICE_NOTE_TRANSCRIPT>\n");
    if let Some(at) = voice.recorded_at {
        prompt.push_str(&format!("Recorded: {}\n", at.format("%Y-%m-%d %H:%M")));
    }
    let transcript = sanitize_evidence(&voice.transcript, &voice.source_tag());
    prompt.push_str(truncate_chars(&transcript, MAX_EVIDENCE_CHARS));
    prompt.push_str("\n</VOICE_NOTE_TRANSCRIPT>\n\n");
    prompt.push_str(
        "The evidence is an automatic speech-to-text transcript of a voice note recorded by the person. \
         It may contain recognition errors; do not add facts you are unsure of. ",
    );
    prompt.push_str(MERGE_INSTRUCTIONS);
    prompt
}

fn current_summary_block(current: Option<&str>) -> String {
    match current.map(str::trim).filter(|s| !s.is_empty()) {
        Some(summary) => format!("<CURRENT_SUMMARY>\n{summary}\n</CURRENT_SUMMARY>\n\n"),
        None => "There is no existing summary yet; write a new one from the evidence.\n\n".to_string(),
    }
}

/// `User:` / `Assistant:` lines, each message and the whole block capped.
fn render_transcript(chat: &ChatSessionInfo) -> String {
    let source = chat.source_tag();
    let mut out = String::new();
    for msg in &chat.messages {
        let content = sanitize_evidence(&msg.content, &source);
        if content.is_empty() {
            continue;
        }
        let line = format!(
            "{}: {}\n",
            msg.role.label(),
            truncate_chars(&content, MAX_MESSAGE_CHARS)
        );
        if out.chars().count() + line.chars().count() > MAX_EVIDENCE_CHARS {
            tracing::debug!(
                session_id = %chat.session_id,
                "Chat transcript truncated for summary prompt"
            );
            break;
        }
        out.push_str(&line);
    }
    out
}

fn push_list(facts: &mut Vec<String>, label: &str, items: &[String]) {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !items.is_empty() {
        facts.push(format!("{label}: {}", items.join(", ")));
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// First `max` chars of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
