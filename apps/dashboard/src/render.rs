use std::fmt::Write as _;

use roster_core::DashboardView;
use shared::domain::{SortDirection, UserRecord};

fn push_row(out: &mut String, record: &UserRecord) {
    let _ = writeln!(
        out,
        "  {:<26} {:<24} {:<28} {}",
        record.id, record.name, record.email, record.mobile_number
    );
}

pub fn render_view(view: &DashboardView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Liked users ({}):", view.liked.len());
    for record in &view.liked {
        push_row(&mut out, record);
    }

    let sort = match view.filter.sort_field {
        Some(field) => {
            let arrow = match view.filter.direction {
                SortDirection::Ascending => "asc",
                SortDirection::Descending => "desc",
            };
            format!("{field} {arrow}")
        }
        None => "none".to_string(),
    };
    let _ = writeln!(
        out,
        "Users matching {:?} (sort: {sort}) page {}/{} of {} matches:",
        view.filter.query, view.page.page, view.page.page_count, view.page.total_matches
    );
    if view.page.records.is_empty() {
        let _ = writeln!(out, "  (no users on this page)");
    }
    for record in &view.page.records {
        push_row(&mut out, record);
    }

    out
}

#[cfg(test)]
mod tests {
    use roster_core::ViewPage;
    use roster_core::ViewFilterState;
    use shared::domain::{SortField, UserId};

    use super::*;

    fn record(id: &str, name: &str) -> UserRecord {
        UserRecord {
            id: UserId::new(id),
            name: name.to_string(),
            email: format!("{id}@x.com"),
            mobile_number: "555".to_string(),
        }
    }

    #[test]
    fn renders_liked_list_and_page_header() {
        let mut filter = ViewFilterState::default();
        filter.set_query("b");
        filter.toggle_sort(SortField::Name);
        filter.toggle_sort(SortField::Name);

        let view = DashboardView {
            page: ViewPage {
                records: vec![record("2", "Bob")],
                page: 1,
                page_count: 1,
                total_matches: 1,
                page_size: 10,
            },
            liked: vec![record("1", "Ann")],
            filter,
            refreshed_at: None,
        };

        let text = render_view(&view);
        assert!(text.starts_with("Liked users (1):\n"));
        assert!(text.contains("Ann"));
        assert!(text.contains(r#"Users matching "b" (sort: name desc) page 1/1 of 1 matches:"#));
        assert!(text.contains("Bob"));
    }

    #[test]
    fn marks_empty_pages() {
        let view = DashboardView {
            page: ViewPage {
                records: Vec::new(),
                page: 4,
                page_count: 2,
                total_matches: 12,
                page_size: 10,
            },
            liked: Vec::new(),
            filter: ViewFilterState::default(),
            refreshed_at: None,
        };
        assert!(render_view(&view).contains("(no users on this page)"));
    }
}
