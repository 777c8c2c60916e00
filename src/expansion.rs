use std::collections::HashMap;

/// Which event detail tables are open.
///
/// Keys are created lazily on first toggle. Keys for events that are no longer
/// present in the current grouping are harmless: nothing asks for them.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    expanded: HashMap<String, bool>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, event: &str) -> bool {
        let entry = self.expanded.entry(event.to_string()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn is_expanded(&self, event: &str) -> bool {
        self.expanded.get(event).copied().unwrap_or(false)
    }

    pub fn reset_all(&mut self) {
        self.expanded.clear();
    }

    pub fn expanded_count(&self) -> usize {
        self.expanded.values().filter(|open| **open).count()
    }
}
