//! Plain-text rendering for the terminal front end.

use shared_types::Contact;

use crate::app::Notice;
use crate::views::delete::{DELETE_MESSAGE, DELETE_TITLE};
use crate::views::{ContactForm, ContactListView, FORM_FIELDS};

const NAME_WIDTH: usize = 24;
const EMAIL_WIDTH: usize = 28;
const COMPANY_WIDTH: usize = 18;
const PHONE_WIDTH: usize = 16;

fn cell(value: &str, width: usize) -> String {
    let count = value.chars().count();
    if count > width {
        let cut: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    } else {
        format!("{}{}", value, " ".repeat(width - count))
    }
}

pub fn contact_row(contact: &Contact) -> String {
    format!(
        "{:>5}  {} {} {} {}{}",
        contact.id,
        cell(&contact.name, NAME_WIDTH),
        cell(&contact.email, EMAIL_WIDTH),
        cell(contact.company.as_deref().unwrap_or("-"), COMPANY_WIDTH),
        cell(&contact.phone, PHONE_WIDTH),
        if contact.is_favorite { " ★" } else { "" },
    )
    .trim_end()
    .to_string()
}

pub fn contact_table(contacts: &[Contact]) -> String {
    let header = format!(
        "{:>5}  {} {} {} {}",
        "ID",
        cell("NAME", NAME_WIDTH),
        cell("EMAIL", EMAIL_WIDTH),
        cell("COMPANY", COMPANY_WIDTH),
        "PHONE",
    );

    let mut lines = vec![header];
    lines.extend(contacts.iter().map(contact_row));
    lines.join("\n")
}

pub fn contact_detail(contact: &Contact) -> String {
    let optional = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    [
        format!("ID:        {}", contact.id),
        format!("Name:      {}", contact.name),
        format!("Email:     {}", contact.email),
        format!("Phone:     {}", contact.phone),
        format!("Address:   {}", optional(&contact.address)),
        format!("Company:   {}", optional(&contact.company)),
        format!("Job title: {}", optional(&contact.job_title)),
        format!("Favorite:  {}", if contact.is_favorite { "yes" } else { "no" }),
        format!("Created:   {}", contact.created_at.to_rfc3339()),
        format!("Updated:   {}", contact.updated_at.to_rfc3339()),
    ]
    .join("\n")
}

/// The whole browse screen: stats, search, body, pagination.
pub fn list_screen(view: &ContactListView) -> String {
    let stats = view.stats();
    let mut out = vec![
        format!(
            "Total contacts: {}   Companies on this page: {}",
            stats.total, stats.unique_companies
        ),
        format!("Search: {}", view.search_input()),
        String::new(),
    ];

    if view.is_loading_first() {
        out.push("Loading…".to_string());
    } else if let Some(error) = view.error() {
        out.push("Unable to load contacts".to_string());
        out.push(error.to_string());
    } else if let Some((title, hint)) = view.empty_state() {
        out.push(title);
        out.push(hint);
    } else {
        out.push(contact_table(view.contacts()));
        if let Some(summary) = view.pagination_summary() {
            out.push(String::new());
            out.push(format!(
                "{}   [{}] [{}]",
                summary,
                if view.can_previous() { ":p previous" } else { "  previous" },
                if view.can_next() { ":n next" } else { "  next" },
            ));
        }
    }

    out.push(String::new());
    out.push("Type to search  :n next  :p previous  :a add  :d <id> delete  :q quit".to_string());
    out.join("\n")
}

pub fn form_errors(form: &ContactForm) -> String {
    FORM_FIELDS
        .iter()
        .filter_map(|field| {
            form.error_for(*field)
                .map(|message| format!("  {}: {}", field.label(), message))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn delete_prompt(id: i64) -> String {
    format!("{} #{}\n{} [y/N]", DELETE_TITLE, id, DELETE_MESSAGE)
}

pub fn notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(message) => format!("✔ {}", message),
        Notice::Error(message) => format!("✖ {}", message),
    }
}
