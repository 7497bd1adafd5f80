//! Ticket formatting.
//!
//! Pure and deterministic: the same ticket always produces the same
//! subject and bodies, and nothing here performs I/O.

use crate::types::{FormattedMessage, Ticket, Urgency};

/// Severity marker carried in the subject line, one per urgency level.
fn severity_marker(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Low => "[low]",
        Urgency::Medium => "[medium]",
        Urgency::High => "[HIGH]",
        Urgency::Critical => "[CRITICAL]",
    }
}

/// Turn a ticket into channel-agnostic message content.
///
/// Text and HTML bodies carry identical information. Optional fields the
/// submitter omitted are skipped entirely rather than rendered as empty
/// placeholders, and all user-supplied text is escaped in the HTML body.
pub fn format_ticket(ticket: &Ticket) -> FormattedMessage {
    let subject = format!(
        "{} {} request from {}",
        severity_marker(ticket.urgency),
        ticket.issue_type.trim(),
        ticket.name.trim()
    );

    FormattedMessage {
        subject,
        text_body: text_body(ticket),
        html_body: html_body(ticket),
    }
}

fn fields(ticket: &Ticket) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("Name", ticket.name.trim().to_string()),
        ("Email", ticket.contact_email.trim().to_string()),
    ];
    if let Some(phone) = &ticket.phone {
        fields.push(("Phone", phone.trim().to_string()));
    }
    if let Some(address) = &ticket.address {
        fields.push(("Address", address.trim().to_string()));
    }
    if let Some(device) = &ticket.device_identifier {
        fields.push(("Device", device.trim().to_string()));
    }
    fields.push(("Issue type", ticket.issue_type.trim().to_string()));
    fields.push(("Urgency", ticket.urgency.to_string()));
    fields
}

fn text_body(ticket: &Ticket) -> String {
    let mut body = String::new();
    for (label, value) in fields(ticket) {
        body.push_str(label);
        body.push_str(": ");
        body.push_str(&value);
        body.push('\n');
    }
    body.push('\n');
    body.push_str(ticket.description.trim());
    body.push('\n');
    body
}

fn html_body(ticket: &Ticket) -> String {
    let mut body = String::from("<ul>\n");
    for (label, value) in fields(ticket) {
        body.push_str(&format!(
            "  <li><strong>{}:</strong> {}</li>\n",
            label,
            escape_html(&value)
        ));
    }
    body.push_str("</ul>\n");
    body.push_str(&format!("<p>{}</p>\n", escape_html(ticket.description.trim())));
    body
}

/// Escape user-supplied text for HTML interpolation.
fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
