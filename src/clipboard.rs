use std::fmt;
use std::str::FromStr;

const PREVIEW_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CopyError {
    #[error("{0} 항목이 비어있습니다.")]
    EmptyField(String),
    #[error("클립보드 접근이 차단되었습니다.")]
    Platform(String),
}

/// A place copied text can be delivered to.
pub trait ClipboardBridge: Send + Sync {
    fn mode(&self) -> ClipboardMode;

    fn write_text(&self, text: &str) -> Result<(), CopyError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMode {
    /// The page writes the text with the browser clipboard API.
    Browser,
    /// The service writes the host clipboard.
    System,
}

impl ClipboardMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ClipboardMode::Browser => "browser",
            ClipboardMode::System => "system",
        }
    }

    pub fn bridge(self) -> Box<dyn ClipboardBridge> {
        match self {
            ClipboardMode::Browser => Box::new(BrowserClipboard),
            ClipboardMode::System => Box::new(SystemClipboard),
        }
    }
}

impl fmt::Display for ClipboardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClipboardMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(ClipboardMode::Browser),
            "system" => Ok(ClipboardMode::System),
            other => Err(format!("clipboard mode must be 'browser' or 'system', got '{other}'")),
        }
    }
}

/// Hands the text back to the page untouched.
#[derive(Debug, Default)]
pub struct BrowserClipboard;

impl ClipboardBridge for BrowserClipboard {
    fn mode(&self) -> ClipboardMode {
        ClipboardMode::Browser
    }

    fn write_text(&self, _text: &str) -> Result<(), CopyError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardBridge for SystemClipboard {
    fn mode(&self) -> ClipboardMode {
        ClipboardMode::System
    }

    fn write_text(&self, text: &str) -> Result<(), CopyError> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|err| CopyError::Platform(format!("clipboard unavailable: {err}")))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|err| CopyError::Platform(format!("failed to set clipboard: {err}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReceipt {
    pub label: String,
    pub preview: String,
}

/// Rejects blank text before the backend is touched.
pub fn copy(bridge: &dyn ClipboardBridge, label: &str, text: &str) -> Result<CopyReceipt, CopyError> {
    if text.trim().is_empty() {
        return Err(CopyError::EmptyField(label.to_string()));
    }
    bridge.write_text(text)?;
    Ok(CopyReceipt {
        label: label.to_string(),
        preview: preview(text),
    })
}

pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
