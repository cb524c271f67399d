//! Payment reminder email.

use tripsplit_shared::OutgoingEmail;
use tripsplit_shared::types::Money;

use crate::account::User;

/// Escapes the characters HTML treats specially.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Builds the reminder sent to a debtor, with the creditor in BCC.
#[must_use]
pub fn reminder_email(debtor: &User, creditor: &User, amount: Money, initiator: &User) -> OutgoingEmail {
    let debtor_name = escape_html(&debtor.name);
    let creditor_name = escape_html(&creditor.name);
    let initiator_name = escape_html(&initiator.name);

    let html = format!(
        "<h2>Payment Request</h2>\
         <p>Hello {debtor_name},</p>\
         <p>You need to settle {amount} with {creditor_name}.</p>\
         <p>This request was initiated by {initiator_name}.</p>\
         <p>Please make the payment at your earliest convenience.</p>\
         <p>Thank you!</p>"
    );

    OutgoingEmail {
        to: debtor.email.clone(),
        bcc: Some(creditor.email.clone()),
        subject: format!("Payment Request: Settle {amount} with {}", creditor.name),
        html,
    }
}
