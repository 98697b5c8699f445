//! Shared active-view state.

use std::sync::{Arc, Mutex};

use gatehouse_core::view::ActiveView;

/// Cloneable handle over which console view is currently in front.
///
/// The console writes it on navigation; the ambient simulator reads it to
/// decide whether to emit.
#[derive(Clone, Default)]
pub struct ViewState {
    inner: Arc<Mutex<ActiveView>>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> ActiveView {
        *self.inner.lock().unwrap()
    }

    pub fn set(&self, view: ActiveView) {
        tracing::debug!(target: "ambient", "active view -> {view}");
        *self.inner.lock().unwrap() = view;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_dashboard_and_shares_updates() {
        let view = ViewState::new();
        assert_eq!(view.get(), ActiveView::Dashboard);

        let clone = view.clone();
        clone.set(ActiveView::Pricing);
        assert_eq!(view.get(), ActiveView::Pricing);
    }
}
