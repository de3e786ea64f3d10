use reqwest::Url;

use crate::model::common::{month::MonthKey, reminder::ReminderType};

use super::Email;

/// Days left in the month when the final reminder goes out.
pub const FINAL_REMINDER_DAYS_REMAINING: u32 = 5;

const FOOTER: &str = "This is an automated reminder. Please do not reply to this email.";

/// Everything a reminder mentions.
pub struct ReminderContext<'a> {
    pub user_name: &'a str,
    pub area_name: &'a str,
    pub month: &'a MonthKey,
    /// Base URL of the audit form.
    pub app_url: &'a str,
}

impl ReminderContext<'_> {
    /// Link to the form, preselecting the area.
    fn form_url(&self) -> String {
        match Url::parse_with_params(self.app_url, [("area", self.area_name)]) {
            Ok(url) => url.to_string(),
            Err(_) => self.app_url.to_string(),
        }
    }
}

/// Render the reminder of the given type, addressed to `to`.
pub fn reminder_email(reminder_type: ReminderType, to: &str, ctx: &ReminderContext) -> Email {
    let ReminderContext {
        user_name,
        area_name,
        month,
        ..
    } = ctx;
    let (subject, heading, paragraphs, colour) = match reminder_type {
        ReminderType::First => (
            format!("Monthly Audit Now Open - {area_name} ({month})"),
            format!("Monthly Audit Form - {month}"),
            vec![
                format!("This is a reminder that the monthly audit form for {area_name} is now open for {month}."),
                "Please complete your audit responses by the end of the month.".to_string(),
            ],
            "#0066cc",
        ),
        ReminderType::MidMonth => (
            format!("Reminder: Monthly Audit - {area_name} ({month})"),
            format!("Half Month Remaining - {month}"),
            vec![
                format!("This is a friendly reminder that you have approximately 15 days remaining to complete your monthly audit form for {area_name}."),
                "If you haven't completed it yet, please take a few minutes to do so now.".to_string(),
            ],
            "#ff9800",
        ),
        ReminderType::Final => (
            format!("FINAL REMINDER: Monthly Audit Due Soon - {area_name} ({month})"),
            format!("FINAL REMINDER - {month}"),
            vec![
                format!("URGENT: You have only {FINAL_REMINDER_DAYS_REMAINING} days remaining to complete your monthly audit form for {area_name}."),
                "Please complete this form as soon as possible to ensure compliance with audit requirements.".to_string(),
            ],
            "#d32f2f",
        ),
    };
    let form_url = ctx.form_url();

    let text = format!(
        "Hello {user_name},\n\n{}\n\nComplete the form here: {form_url}\n\n{FOOTER}\n",
        paragraphs.join("\n\n")
    );

    let body: String = paragraphs
        .iter()
        .map(|p| format!("<p>{}</p>", escape_html(p)))
        .collect();
    let html = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head>\
<body style=\"font-family: Arial, sans-serif; color: #333;\">\
<h1 style=\"background-color: {colour}; color: white; padding: 20px;\">{}</h1>\
<p>Hello {},</p>{body}\
<p><a href=\"{}\" style=\"background-color: {colour}; color: white; padding: 12px 24px;\">Complete Audit Form</a></p>\
<p style=\"font-size: 12px; color: #666;\">{FOOTER}</p></body></html>",
        escape_html(&heading),
        escape_html(user_name),
        escape_html(&form_url),
    );

    Email {
        to: to.to_string(),
        subject,
        html,
        text,
    }
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
