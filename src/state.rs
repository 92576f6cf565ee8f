use crate::clipboard::ClipboardBridge;
use crate::form::FormBoard;
use crate::models::AppData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Shared by every handler. Lock `forms` before `data` when both are needed.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub forms: Arc<Mutex<FormBoard>>,
    pub clipboard: Arc<dyn ClipboardBridge>,
    pub load_notice: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        data_path: PathBuf,
        data: AppData,
        clipboard: Box<dyn ClipboardBridge>,
        load_notice: Option<String>,
    ) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            forms: Arc::new(Mutex::new(FormBoard::default())),
            clipboard: Arc::from(clipboard),
            load_notice: load_notice.map(Arc::from),
        }
    }
}
