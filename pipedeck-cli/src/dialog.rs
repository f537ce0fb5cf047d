//! Confirm/cancel selection dialogs

/// A modal picker holding a pending choice until it is closed
///
/// Closing with `confirmed = true` hands back the pending choice; cancelling
/// drops it. Either way the dialog ends up closed and empty.
#[derive(Debug, Clone)]
pub struct Selector<T> {
    title: String,
    open: bool,
    unconfirmed: Option<T>,
}

impl<T> Selector<T> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            open: false,
            unconfirmed: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Record a pending choice; ignored while the dialog is closed
    pub fn choose(&mut self, item: T) {
        if self.open {
            self.unconfirmed = Some(item);
        }
    }

    pub fn unconfirmed(&self) -> Option<&T> {
        self.unconfirmed.as_ref()
    }

    /// Whether the confirm button applies
    pub fn can_confirm(&self) -> bool {
        self.unconfirmed.is_some()
    }

    pub fn close(&mut self, confirmed: bool) -> Option<T> {
        self.open = false;
        let pending = self.unconfirmed.take();
        if confirmed { pending } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_returns_pending_choice() {
        let mut selector = Selector::new("Choose a pipeline");
        selector.open();
        selector.choose("p-1");
        selector.choose("p-2");

        assert!(selector.can_confirm());
        assert_eq!(selector.close(true), Some("p-2"));
        assert!(!selector.is_open());
        assert!(selector.unconfirmed().is_none());
    }

    #[test]
    fn test_cancel_discards_choice() {
        let mut selector = Selector::new("Choose a pipeline");
        selector.open();
        selector.choose(7);

        assert_eq!(selector.close(false), None);
        assert!(!selector.can_confirm());
    }

    #[test]
    fn test_choose_while_closed_is_ignored() {
        let mut selector: Selector<u8> = Selector::new("x");
        selector.choose(1);
        assert!(selector.unconfirmed().is_none());
    }
}
