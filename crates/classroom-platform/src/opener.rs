//! Opens meeting links in a new tab.

use classroom_core::ports::LinkOpener;
use classroom_types::{DirectoryError, Result};

pub struct BrowserLinkOpener {
    target: String,
}

impl BrowserLinkOpener {
    pub fn new() -> Self {
        Self {
            target: "_blank".to_string(),
        }
    }
}

impl Default for BrowserLinkOpener {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkOpener for BrowserLinkOpener {
    fn open(&self, url: &str) -> Result<()> {
        let window = web_sys::window()
            .ok_or_else(|| DirectoryError::JsInterop("No window object".to_string()))?;
        let opened = window
            .open_with_url_and_target(url, &self.target)
            .map_err(|e| DirectoryError::JsInterop(format!("{:?}", e)))?;
        // `null` means a popup blocker intervened
        match opened {
            Some(_) => Ok(()),
            None => Err(DirectoryError::JsInterop(format!(
                "window.open was blocked for {}",
                url
            ))),
        }
    }
}
