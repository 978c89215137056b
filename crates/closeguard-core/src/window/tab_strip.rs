use serde::Serialize;
use std::fmt;

/// URL loaded into a placeholder tab
pub const NEW_TAB_URL: &str = "about:blank";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TabId(u32);

impl TabId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
}

/// Ordered tabs of one window
#[derive(Debug, Default)]
pub struct TabStrip {
    tabs: Vec<Tab>,
    next_id: u32,
}

impl TabStrip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut strip = Self::new();
        for url in urls {
            strip.add_tab(url);
        }
        strip
    }

    /// Append a tab and return its id
    pub fn add_tab(&mut self, url: impl Into<String>) -> TabId {
        let id = TabId(self.next_id);
        self.next_id += 1;
        self.tabs.push(Tab {
            id,
            url: url.into(),
        });
        id
    }

    /// Append a blank tab
    pub fn add_placeholder(&mut self) -> TabId {
        self.add_tab(NEW_TAB_URL)
    }

    pub fn close_tab(&mut self, id: TabId) -> Option<Tab> {
        let index = self.tabs.iter().position(|tab| tab.id == id)?;
        Some(self.tabs.remove(index))
    }

    /// Remove every tab, returning them in strip order
    pub fn close_all(&mut self) -> Vec<Tab> {
        std::mem::take(&mut self.tabs)
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}
