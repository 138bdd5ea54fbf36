use time::OffsetDateTime;

/// Default display format for checkpoint dates.
pub const DEFAULT_DATE_FORMAT: &str = "yyyy/MM/dd HH:mm:ss";

/// Render a timestamp with the `yyyy,MM,dd,HH,mm,ss` token language.
///
/// Tokens are letter-only and substituted values are digit-only, so plain
/// sequential replacement cannot cascade.
pub fn format_date(at: OffsetDateTime, format: &str) -> String {
    format
        .replace("yyyy", &format!("{:04}", at.year()))
        .replace("MM", &format!("{:02}", u8::from(at.month())))
        .replace("dd", &format!("{:02}", at.day()))
        .replace("HH", &format!("{:02}", at.hour()))
        .replace("mm", &format!("{:02}", at.minute()))
        .replace("ss", &format!("{:02}", at.second()))
}
