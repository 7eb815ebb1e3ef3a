// ── Dialog state ──
//
// Open/closed flags for create, update and delete dialogs. Update and
// delete dialogs also carry the record they act on.

/// Open/closed state of a dialog with no payload (create forms).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModalState {
    is_open: bool,
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }
}

/// Dialog bound to a selected record, with a slot for the last failure.
///
/// Closing drops the record and the error so a reopened dialog starts
/// clean.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateModalState<T> {
    data: Option<T>,
    error: Option<String>,
}

impl<T> Default for UpdateModalState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
        }
    }
}

impl<T> UpdateModalState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.data.is_some()
    }

    /// The record the dialog was opened for.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn open(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Close and hand back the record, if any.
    pub fn close(&mut self) -> Option<T> {
        self.error = None;
        self.data.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_toggles() {
        let mut modal = ModalState::new();
        assert!(!modal.is_open());
        modal.open();
        assert!(modal.is_open());
        modal.close();
        assert!(!modal.is_open());
    }

    #[test]
    fn update_modal_carries_record_and_resets_error() {
        let mut modal = UpdateModalState::new();
        modal.open(vec![3_i64, 5]);
        modal.set_error("Cannot delete active user");
        assert_eq!(modal.data(), Some(&vec![3, 5]));
        assert_eq!(modal.error(), Some("Cannot delete active user"));

        assert_eq!(modal.close(), Some(vec![3, 5]));
        assert!(!modal.is_open());
        assert_eq!(modal.error(), None);
    }
}
