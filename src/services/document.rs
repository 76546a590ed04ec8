//! In-process model of the console page: element slots addressed by fixed
//! identifiers, navigation controls, page sections and the toast.

use crate::models::view::{Page, Toast, ToastKind};
use crate::utils::format::escape_text;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Element identifiers the page shell provides.
pub mod ids {
    pub const APP_NAME: &str = "app-name";
    pub const APP_VERSION: &str = "app-version";
    pub const STAT_ENVIRONMENT: &str = "stat-environment";
    pub const HEALTH_STATUS: &str = "health-status";
    pub const STAT_USERS_TOTAL: &str = "stat-users-total";
    pub const STAT_USERS_ACTIVE: &str = "stat-users-active";
    pub const STAT_DB_STATUS: &str = "stat-db-status";
    pub const USERS_TABLE_BODY: &str = "users-table-body";
    pub const USERS_PAGINATION: &str = "users-pagination";
    pub const SYSTEM_INFO_GRID: &str = "system-info-grid";
    pub const CONFIG_INFO_GRID: &str = "config-info-grid";
    pub const DATABASE_INFO_GRID: &str = "database-info-grid";
    pub const DATABASE_STATS_GRID: &str = "database-stats-grid";

    pub const ALL: [&str; 13] = [
        APP_NAME,
        APP_VERSION,
        STAT_ENVIRONMENT,
        HEALTH_STATUS,
        STAT_USERS_TOTAL,
        STAT_USERS_ACTIVE,
        STAT_DB_STATUS,
        USERS_TABLE_BODY,
        USERS_PAGINATION,
        SYSTEM_INFO_GRID,
        CONFIG_INFO_GRID,
        DATABASE_INFO_GRID,
        DATABASE_STATS_GRID,
    ];
}

#[derive(Debug, Clone, Serialize)]
pub struct NavControl {
    pub page: Page,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub id: String,
    pub page: Page,
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub struct Document {
    nav: Vec<NavControl>,
    sections: Vec<Section>,
    slots: HashMap<&'static str, String>,
    toast: Option<Toast>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSnapshot {
    pub nav: Vec<NavControl>,
    pub sections: Vec<Section>,
    pub slots: BTreeMap<String, String>,
    pub toast: Option<Toast>,
}

impl Document {
    pub fn new() -> Self {
        let slots = ids::ALL
            .into_iter()
            .map(|id| (id, String::new()))
            .collect();

        Self {
            nav: Page::ALL
                .into_iter()
                .map(|page| NavControl { page, active: false })
                .collect(),
            sections: Page::ALL
                .into_iter()
                .map(|page| Section {
                    id: page.section_id(),
                    page,
                    visible: false,
                })
                .collect(),
            slots,
            toast: None,
        }
    }

    /// Marks the nav control and section matching `target` active and
    /// everything else inactive.
    pub fn activate(&mut self, target: Page) {
        for control in &mut self.nav {
            control.active = control.page == target;
        }
        let section_id = target.section_id();
        for section in &mut self.sections {
            section.visible = section.id == section_id;
        }
    }

    pub fn nav(&self) -> &[NavControl] {
        &self.nav
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Replaces the inner markup of an element.
    pub fn set_html(&mut self, id: &'static str, html: String) {
        self.slots.insert(id, html);
    }

    /// Replaces the content of an element with inert text.
    pub fn set_text(&mut self, id: &'static str, text: &str) {
        self.slots.insert(id, escape_text(Some(text)));
    }

    pub fn html(&self, id: &str) -> &str {
        self.slots.get(id).map(String::as_str).unwrap_or_default()
    }

    pub fn show_toast(&mut self, message: String, kind: ToastKind) {
        self.toast = Some(Toast {
            message,
            kind,
            visible: true,
        });
    }

    pub fn hide_toast(&mut self) {
        if let Some(toast) = self.toast.as_mut() {
            toast.visible = false;
        }
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            nav: self.nav.clone(),
            sections: self.sections.clone(),
            slots: self
                .slots
                .iter()
                .map(|(id, html)| (id.to_string(), html.clone()))
                .collect(),
            toast: self.toast.clone(),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_leaves_exactly_one_control_and_section() {
        let mut doc = Document::new();
        doc.activate(Page::Users);
        doc.activate(Page::System);

        let active: Vec<_> = doc.nav().iter().filter(|c| c.active).map(|c| c.page).collect();
        let visible: Vec<_> = doc
            .sections()
            .iter()
            .filter(|s| s.visible)
            .map(|s| s.id.as_str())
            .collect();

        assert_eq!(active, vec![Page::System]);
        assert_eq!(visible, vec!["page-system"]);
    }

    #[test]
    fn set_text_never_stores_raw_markup() {
        let mut doc = Document::new();
        doc.set_text(ids::APP_NAME, "<b>console</b>");
        assert_eq!(doc.html(ids::APP_NAME), "&lt;b&gt;console&lt;/b&gt;");
    }

    #[test]
    fn hide_keeps_last_toast_message() {
        let mut doc = Document::new();
        doc.show_toast("saved".to_string(), ToastKind::Success);
        doc.hide_toast();

        let toast = doc.toast().unwrap();
        assert_eq!(toast.message, "saved");
        assert!(!toast.visible);
    }

    #[test]
    fn unknown_slot_reads_empty() {
        assert_eq!(Document::new().html("missing"), "");
    }
}
