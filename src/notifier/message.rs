//! Subjects, bodies and timestamps for outgoing mail

use std::fmt;

use chrono::{DateTime, Datelike, TimeZone};

use super::{NotificationRequest, RecipientList};
use crate::probe::FailureReason;

/// `[URGENT]` mail for a failed probe
pub fn endpoint_failure(
    endpoint_title: &str,
    endpoint_url: &str,
    reason: &FailureReason,
    timestamp: &str,
    recipients: &RecipientList,
) -> NotificationRequest {
    NotificationRequest::new(
        format!("[URGENT] {} needs attention", endpoint_title),
        format!(
            "{} did not respond successfully to WebCheck. Error: {}. {}",
            endpoint_url, reason, timestamp
        ),
        recipients.clone(),
    )
}

/// `[INFO]` mail for the monitor being switched on or off
pub fn status_change(
    endpoint_title: &str,
    turned_on: bool,
    timestamp: &str,
    recipients: &RecipientList,
) -> NotificationRequest {
    NotificationRequest::new(
        format!(
            "[INFO] {} monitor turned {}",
            endpoint_title,
            if turned_on { "ON" } else { "OFF" }
        ),
        format!(
            "Please ensure this is the desired WebCheck state. Change made on {}.",
            timestamp
        ),
        recipients.clone(),
    )
}

pub fn html_wrap(body: &str) -> String {
    format!("<b>{}</b>", escape_html(body))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// e.g. `Friday, October 16th, 2026, 3:04:05 PM`
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let day = at.day();
    format!(
        "{} {}{}{}",
        at.format("%A, %B"),
        day,
        ordinal_suffix(day),
        at.format(", %Y, %-I:%M:%S %p")
    )
}

/// Local wall-clock time in the notification format
pub fn now() -> String {
    format_timestamp(&chrono::Local::now())
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn recipients() -> RecipientList {
        ["ops@example.com"].into_iter().collect()
    }

    #[test]
    fn test_endpoint_failure_message() {
        let request = endpoint_failure(
            "Example API",
            "https://example.com/health",
            &FailureReason::UnexpectedStatus(503),
            "Friday, October 16th, 2026, 3:04:05 PM",
            &recipients(),
        );

        assert_eq!(request.subject, "[URGENT] Example API needs attention");
        assert_eq!(
            request.body,
            "https://example.com/health did not respond successfully to WebCheck. \
             Error: Status code was not expected: 503. Friday, October 16th, 2026, 3:04:05 PM"
        );
        assert_eq!(request.recipients, recipients());
    }

    #[test]
    fn test_status_change_message() {
        let on = status_change("Example API", true, "then", &recipients());
        assert_eq!(on.subject, "[INFO] Example API monitor turned ON");
        assert_eq!(
            on.body,
            "Please ensure this is the desired WebCheck state. Change made on then."
        );

        let off = status_change("Example API", false, "then", &recipients());
        assert_eq!(off.subject, "[INFO] Example API monitor turned OFF");
    }

    #[test]
    fn test_html_wrap_escapes() {
        assert_eq!(html_wrap("a < b & c"), "<b>a &lt; b &amp; c</b>");
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 15, 4, 5).unwrap();
        assert_eq!(format_timestamp(&at), "Friday, October 16th, 2026, 3:04:05 PM");

        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 30, 0).unwrap();
        assert_eq!(format_timestamp(&at), "Thursday, January 1st, 2026, 12:30:00 AM");
    }

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(23), "rd");
        assert_eq!(ordinal_suffix(31), "st");
    }
}
