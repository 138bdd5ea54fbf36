use crate::overlay::short_id;
use serde::Serialize;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};
use vard_core::datefmt::{format_date, DEFAULT_DATE_FORMAT};

/// Default commit message template.
pub const DEFAULT_TEMPLATE: &str = "${branch} @ ${date}";

/// Origin tag embedded in the stored branch name for checkpoints created
/// by an automated agent turn rather than a manual command.
pub const AGENT_TAG: &str = "[agent]";

/// One committed snapshot, decoded from the shadow repository's history.
#[derive(Debug, Clone, Serialize)]
pub struct Checkpoint {
    /// Short display id (7-char hash prefix).
    pub id: String,
    /// Full commit hash, used for every git lookup.
    pub hash: String,
    /// Project branch active at capture time, origin tag stripped.
    pub branch: String,
    /// Whether an automated agent turn created this checkpoint.
    pub agent_created: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Display text: auto-generated template result or custom description,
    /// possibly overridden by a rename overlay entry.
    pub description: String,
    /// Complete underlying commit text.
    pub full_message: String,
    /// Derived from the favorites overlay.
    pub favorite: bool,
}

/// Prefix a branch name with the agent origin tag.
pub fn tag_agent(branch: &str) -> String {
    format!("{AGENT_TAG} {branch}")
}

/// Encode capture-time context into a commit message.
///
/// A custom description becomes the subject with the branch carried in a
/// `Branch:` trailer; otherwise the template is rendered with `${branch}`
/// and `${date}` substituted.
pub fn encode(
    branch: &str,
    at: OffsetDateTime,
    template: Option<&str>,
    date_format: Option<&str>,
    custom_description: Option<&str>,
) -> String {
    if let Some(custom) = custom_description {
        return format!("{custom}\n\nBranch: {branch}");
    }
    let date = format_date(at, date_format.unwrap_or(DEFAULT_DATE_FORMAT));
    template
        .unwrap_or(DEFAULT_TEMPLATE)
        .replace("${branch}", branch)
        .replace("${date}", &date)
}

/// Decode a commit message produced by any historical format.
///
/// Matchers are tried in priority order, first match wins; a future format
/// is supported by prepending a matcher without touching the others.
pub fn decode(hash: &str, subject: &str, body: &str, commit_date: OffsetDateTime) -> Checkpoint {
    let (branch, agent_created, timestamp) = decode_trailer(body, commit_date)
        .or_else(|| decode_legacy_inline(subject, commit_date))
        .unwrap_or_else(|| ("unknown".to_string(), false, commit_date));

    let full_message = if body.is_empty() {
        subject.to_string()
    } else {
        format!("{subject}\n\n{body}")
    };
    Checkpoint {
        id: short_id(hash).to_string(),
        hash: hash.to_string(),
        branch,
        agent_created,
        timestamp,
        description: subject.to_string(),
        full_message,
        favorite: false,
    }
}

/// Current format: a `Branch: <value>` trailer in the body. The commit's
/// own recorded date is the timestamp; the trailer never encodes one.
fn decode_trailer(
    body: &str,
    commit_date: OffsetDateTime,
) -> Option<(String, bool, OffsetDateTime)> {
    let value = body.lines().find_map(|line| line.strip_prefix("Branch: "))?;
    let (branch, agent) = strip_agent_tag(value.trim());
    Some((branch, agent, commit_date))
}

/// Legacy format: subject is `<branch> @ <date>`. Falls back to the commit
/// date if the right side no longer parses.
fn decode_legacy_inline(
    subject: &str,
    commit_date: OffsetDateTime,
) -> Option<(String, bool, OffsetDateTime)> {
    let (left, right) = subject.rsplit_once(" @ ")?;
    let timestamp = parse_legacy_date(right.trim())?;
    let (branch, agent) = strip_agent_tag(left.trim());
    Some((branch, agent, timestamp.unwrap_or(commit_date)))
}

/// Parse a legacy inline date. `Some(None)` means "shaped like a date but
/// unparseable" (callers fall back to the commit date); `None` means the
/// subject is not in the legacy format at all.
fn parse_legacy_date(s: &str) -> Option<Option<OffsetDateTime>> {
    let dashed = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let slashed = format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");
    if let Ok(parsed) = PrimitiveDateTime::parse(s, &dashed)
        .or_else(|_| PrimitiveDateTime::parse(s, &slashed))
    {
        // Legacy encoding never recorded a zone; assume UTC.
        return Some(Some(parsed.assume_utc()));
    }
    // Digit-and-punctuation right side still counts as the legacy shape.
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || "-/:. ".contains(c)) {
        return Some(None);
    }
    None
}

/// Strip a case-insensitive `[agent]` origin-tag prefix from a stored
/// branch value, reporting whether it was present.
fn strip_agent_tag(value: &str) -> (String, bool) {
    if value.len() >= AGENT_TAG.len()
        && value.is_char_boundary(AGENT_TAG.len())
        && value[..AGENT_TAG.len()].eq_ignore_ascii_case(AGENT_TAG)
    {
        (value[AGENT_TAG.len()..].trim_start().to_string(), true)
    } else {
        (value.to_string(), false)
    }
}
