use chrono::Local;

use crate::core::types::Detection;
use crate::workflows::FileInput;

/// Interactive-session state: the two gated inputs, in-flight flags, the
/// most recent result, and a rolling activity log.
pub struct App {
    pub type_cursor: Option<usize>,
    pub input: String,
    pub selected_file: Option<FileInput>,
    pub row_cursor: usize,
    pub analyzing: bool,
    pub reporting: bool,
    pub progress: u8,
    pub last_result: Option<Detection>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub logs: Vec<String>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            type_cursor: None,
            input: String::new(),
            selected_file: None,
            row_cursor: 0,
            analyzing: false,
            reporting: false,
            progress: 0,
            last_result: None,
            error: None,
            notice: None,
            logs: vec![
                "[SYSTEM] VERIDASH READY".to_string(),
                "[SYSTEM] TAB PICKS A DETECTION TYPE".to_string(),
                "[SYSTEM] TYPE A FILENAME, ENTER ATTACHES IT".to_string(),
            ],
        }
    }

    /// The analyze gate: both a file and a detection type must be present.
    /// Re-evaluated on every input change; in-flight guarding is separate.
    pub fn can_analyze(&self) -> bool {
        self.selected_file.is_some() && self.type_cursor.is_some()
    }

    pub fn cycle_type(&mut self, catalog_len: usize) {
        if catalog_len == 0 {
            return;
        }
        self.type_cursor = Some(match self.type_cursor {
            Some(i) => (i + 1) % catalog_len,
            None => 0,
        });
    }

    /// Takes the typed filename as the selected file.
    pub fn attach_input_file(&mut self) {
        if self.input.trim().is_empty() {
            return;
        }
        let name = self.input.trim().to_string();
        let path = std::path::PathBuf::from(&name);
        self.selected_file = Some(if path.exists() {
            FileInput::from_path(path)
        } else {
            FileInput::named(name.clone())
        });
        self.input.clear();
        self.log(format!("[+] File attached: {}", name));
    }

    pub fn begin_analysis(&mut self, type_name: &str, filename: &str) {
        self.analyzing = true;
        self.error = None;
        self.last_result = None;
        self.log(format!("[~] Analyzing {} as {}...", filename, type_name));
    }

    pub fn complete_analysis(&mut self, detection: &Detection) {
        self.analyzing = false;
        self.progress = 100;
        self.last_result = Some(detection.clone());
        self.log(format!(
            "[+] Detection {} recorded ({})",
            detection.id, detection.filename
        ));
    }

    pub fn fail_analysis(&mut self, message: &str) {
        self.analyzing = false;
        self.progress = 0;
        self.error = Some(format!("Analysis failed: {}", message));
        self.log(format!("[!] {}", message));
    }

    pub fn log(&mut self, msg: impl Into<String>) {
        self.logs
            .push(format!("[{}] {}", Local::now().format("%H:%M:%S"), msg.into()));
        if self.logs.len() > 10 {
            self.logs.remove(0);
        }
    }
}
