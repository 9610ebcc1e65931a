//! Output formatting for the CLI
//!
//! Human-readable by default, JSON with `--json`.

use roster_core::{Console, HealthReport, HealthSummary, NotificationKind, User, UserList};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

pub struct Output {
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the current page with its pagination footer.
    pub fn print_page(&self, list: &UserList) {
        match self.format {
            OutputFormat::Human => {
                if let Some(error) = list.error() {
                    println!("Error: {}", error);
                }
                if list.records().is_empty() {
                    println!("No users found.");
                } else {
                    for user in list.records() {
                        println!("{}", user_line(user));
                    }
                }
                println!();
                println!("{}", pagination_line(list));
            }
            OutputFormat::Json => {
                let value = json!({
                    "page": list.page(),
                    "page_size": list.page_size(),
                    "total_count": list.total_count(),
                    "total_pages": list.total_pages(),
                    "has_previous": list.can_go_previous(),
                    "has_next": list.can_go_next(),
                    "error": list.error(),
                    "data": list.records(),
                });
                println!("{}", value);
            }
        }
    }

    /// Print whichever confirmations are showing.
    pub fn print_notifications(&self, console: &Console) {
        let active = console.notifications().active();
        match self.format {
            OutputFormat::Human => {
                for kind in active {
                    println!("{}", kind.message());
                }
            }
            OutputFormat::Json => {
                let messages: Vec<&str> = active.into_iter().map(NotificationKind::message).collect();
                println!("{}", json!({ "notifications": messages }));
            }
        }
    }

    pub fn print_health(&self, summary: &HealthSummary) {
        match self.format {
            OutputFormat::Human => {
                println!("{}", health_line("Backend Service Status Code", &summary.backend));
                println!("{}", health_line("Database Service Status Code", &summary.database));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(summary).unwrap_or_default());
            }
        }
    }
}

fn user_line(user: &User) -> String {
    let photo = if user.profile_photo.is_some() { " [photo]" } else { "" };
    format!(
        "{}  {:<24} {:<32} {}{}",
        user.id,
        user.full_name(),
        user.email,
        user.phone_number,
        photo
    )
}

fn pagination_line(list: &UserList) -> String {
    let total = list
        .total_pages()
        .map(|pages| pages.to_string())
        .unwrap_or_else(|| "?".to_string());
    let previous = if list.can_go_previous() { "< Previous" } else { "" };
    let next = if list.can_go_next() { "Next >" } else { "" };
    format!("{:<12}Page {} of {}{:>12}", previous, list.page(), total, next)
}

fn health_line(label: &str, report: &HealthReport) -> String {
    match &report.error {
        Some(error) => format!("{}: {} ({})", label, report.status, error),
        None => format!("{}: {}", label, report.status),
    }
}
