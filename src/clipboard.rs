use std::sync::Mutex;

use arboard::Clipboard;

use crate::error::CalendarError;

pub trait ClipboardSink {
    fn write_text(&self, text: &str) -> Result<(), CalendarError>;
}

/// System clipboard, opened on first write.
///
/// The handle is kept for the lifetime of the value: on X11 and Wayland the
/// copied text disappears once its owner is dropped.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Mutex<Option<Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), CalendarError> {
        let mut guard = self
            .handle
            .lock()
            .map_err(|_| CalendarError::Clipboard("clipboard lock poisoned".to_string()))?;
        if guard.is_none() {
            let clipboard =
                Clipboard::new().map_err(|err| CalendarError::Clipboard(err.to_string()))?;
            *guard = Some(clipboard);
        }
        match guard.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|err| CalendarError::Clipboard(err.to_string())),
            None => Err(CalendarError::Clipboard("clipboard not opened".to_string())),
        }
    }
}
