use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Overview,
    Users,
    System,
    Database,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Overview, Page::Users, Page::System, Page::Database];

    pub fn as_str(self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::Users => "users",
            Page::System => "system",
            Page::Database => "database",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Users => "Users",
            Page::System => "System",
            Page::Database => "Database",
        }
    }

    /// Identifier of the content section for this page.
    pub fn section_id(self) -> String {
        format!("page-{}", self.as_str())
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown page: {0}")]
pub struct UnknownPage(pub String);

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|page| page.as_str() == s)
            .ok_or_else(|| UnknownPage(s.to_string()))
    }
}

/// Token handed out when a user-list request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Debug, Clone)]
pub struct ViewState {
    current_page: Page,
    current_user_page: u32,
    current_user_page_size: u32,
    users_generation: u64,
}

impl ViewState {
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: Page::Overview,
            current_user_page: 1,
            current_user_page_size: page_size.max(1),
            users_generation: 0,
        }
    }

    pub fn current_page(&self) -> Page {
        self.current_page
    }

    pub fn current_user_page(&self) -> u32 {
        self.current_user_page
    }

    pub fn current_user_page_size(&self) -> u32 {
        self.current_user_page_size
    }

    pub fn set_current_page(&mut self, page: Page) {
        self.current_page = page;
    }

    /// Records the page that the user table now shows.
    pub fn set_user_page(&mut self, page: u32, page_size: u32) {
        self.current_user_page = page.max(1);
        self.current_user_page_size = page_size.max(1);
    }

    /// Starts a request against the user table, superseding earlier ones.
    pub fn begin_users_request(&mut self) -> RequestToken {
        self.users_generation += 1;
        RequestToken(self.users_generation)
    }

    pub fn is_latest_users_request(&self, token: RequestToken) -> bool {
        token.0 == self.users_generation
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(10)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_round_trips_through_identifier() {
        for page in Page::ALL {
            assert_eq!(page.as_str().parse::<Page>().unwrap(), page);
        }
        assert_eq!("reports".parse::<Page>(), Err(UnknownPage("reports".to_string())));
        assert_eq!(Page::Database.section_id(), "page-database");
    }

    #[test]
    fn later_request_supersedes_earlier_one() {
        let mut state = ViewState::default();
        let first = state.begin_users_request();
        let second = state.begin_users_request();

        assert!(!state.is_latest_users_request(first));
        assert!(state.is_latest_users_request(second));
    }

    #[test]
    fn user_page_never_drops_below_one() {
        let mut state = ViewState::new(0);
        assert_eq!(state.current_user_page_size(), 1);

        state.set_user_page(0, 20);
        assert_eq!(state.current_user_page(), 1);
        assert_eq!(state.current_user_page_size(), 20);
    }
}
