//! The workbench: user actions in, result board out.
//!
//! A single `Workbench` owns all view state. Actions run to completion before
//! the next one starts (`&mut self`), and file batches report their outcomes
//! one by one into the board, so there is exactly one writer at any time.

use std::path::Path;
use std::sync::Arc;

use analysis_api::{AnalysisBackend, Endpoint};
use colored::Colorize;
use file_intake::{BatchSummary, FileCandidate, FileIntake, FileOutcome, OutcomePayload};
use lang_detect::{DetectedLanguage, file_extension};
use tracing::{debug, error, info, instrument};

use crate::config::{AnalysisMode, MergePolicy, WorkbenchConfig};
use crate::error::WorkbenchResult;
use crate::highlight::render_numbered;
use crate::state::{
    BoardSnapshot, EntrySnapshot, ResultBoard, ResultEntry, ResultKey, TaskSelection, ViewState,
};

pub const EMPTY_TEXT_MESSAGE: &str = "Please enter some text to analyze.";
pub const REQUEST_FAILED_MESSAGE: &str = "Failed to process the request.";
pub const SAMPLE_RESULT: &str = "This is a sample analysis result.";
pub const NO_RESULTS_MESSAGE: &str =
    "No results to display yet. Please upload code or logs, or input text for analysis.";

/// Characters of input echoed into a simulated result.
pub const SIMULATED_PREVIEW_CHARS: usize = 100;

/// Language shown before any file has been submitted.
pub const INITIAL_LANGUAGE: DetectedLanguage = DetectedLanguage::JavaScript;

pub struct Workbench {
    backend: Arc<dyn AnalysisBackend>,
    intake: FileIntake,
    merge: MergePolicy,
    mode: AnalysisMode,
    max_text_chars: usize,

    text: String,
    task: TaskSelection,
    language: DetectedLanguage,
    language_override: Option<DetectedLanguage>,

    board: ResultBoard,
    view: ViewState,
    notice: Option<String>,
}

impl Workbench {
    pub fn new(cfg: &WorkbenchConfig, backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            intake: cfg.file_intake(),
            merge: cfg.merge,
            mode: cfg.analysis,
            max_text_chars: cfg.max_text_chars,
            text: String::new(),
            task: TaskSelection::default(),
            language: INITIAL_LANGUAGE,
            language_override: None,
            board: ResultBoard::default(),
            view: ViewState::Idle,
            notice: None,
        }
    }

    /* ------------------------------ inputs ------------------------------ */

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn select_task(&mut self, task: TaskSelection) {
        self.task = task;
    }

    /// Pins the display language; `None` returns to detection.
    pub fn override_language(&mut self, language: Option<DetectedLanguage>) {
        self.language_override = language;
    }

    /* ----------------------------- accessors ---------------------------- */

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn task(&self) -> TaskSelection {
        self.task
    }

    /// Language indicator: the override if set, else the last detected one.
    pub fn language(&self) -> DetectedLanguage {
        self.language_override.unwrap_or(self.language)
    }

    pub fn board(&self) -> &ResultBoard {
        &self.board
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Inline validation message from the last rejected action.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn merge_policy(&self) -> MergePolicy {
        self.merge
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /* ------------------------------ actions ----------------------------- */

    /// Sends the current text to the endpoint of the selected task.
    ///
    /// Empty or over-long text is rejected locally without a request.
    #[instrument(skip_all, fields(task = %self.task, mode = %self.mode))]
    pub async fn submit_text(&mut self) -> ViewState {
        let task = self.task;
        self.run_text_action(
            task.endpoint(),
            ResultKey::Text(task),
            task.simulated_prefix(),
        )
        .await
    }

    /// Sends the current text to `/summarize-text`.
    #[instrument(skip_all, fields(mode = %self.mode))]
    pub async fn summarize_text(&mut self) -> ViewState {
        self.run_text_action(Endpoint::SummarizeText, ResultKey::Summary, "Summary")
            .await
    }

    async fn run_text_action(&mut self, endpoint: Endpoint, key: ResultKey, label: &str) -> ViewState {
        let text = match self.validated_text() {
            Ok(t) => t,
            Err(message) => return self.reject(message),
        };
        self.begin_action();

        let (result, failed) = match self.mode {
            AnalysisMode::Simulated => (simulated(label, &text), false),
            AnalysisMode::Remote => match self.backend.analyze(endpoint, &text).await {
                Ok(result) => {
                    info!(endpoint = endpoint.path(), chars = result.len(), "analysis received");
                    (result, false)
                }
                Err(e) => {
                    error!(endpoint = endpoint.path(), error = %e, "error processing request");
                    (REQUEST_FAILED_MESSAGE.to_string(), true)
                }
            },
        };

        self.board.upsert(ResultEntry {
            key,
            label: label.to_string(),
            language: self.language(),
            text: result,
            failed,
        });
        self.view = if failed {
            ViewState::ShowingError
        } else {
            ViewState::ShowingResult
        };
        self.view
    }

    /// Runs a batch through the intake; each accepted file becomes an entry.
    ///
    /// A batch with no accepted file changes nothing.
    #[instrument(skip_all, fields(files = candidates.len()))]
    pub async fn submit_files(&mut self, candidates: Vec<FileCandidate>) -> BatchSummary {
        let replace = self.merge == MergePolicy::Replace;
        let mode = self.mode;
        let mut cleared = false;

        let board = &mut self.board;
        let language = &mut self.language;
        let summary = self
            .intake
            .process_batch(candidates, self.backend.as_ref(), |outcome| {
                if replace && !cleared {
                    board.clear();
                    cleared = true;
                }
                if !outcome.is_failure() {
                    *language = outcome.language;
                }
                board.upsert(outcome_entry(mode, &outcome));
            })
            .await;

        if summary.accepted > 0 {
            self.notice = None;
            self.view = if summary.failed == summary.accepted {
                ViewState::ShowingError
            } else {
                ViewState::ShowingResult
            };
        }
        debug!(
            accepted = summary.accepted,
            rejected = summary.rejected.len(),
            "files submitted"
        );
        summary
    }

    /// Builds candidates from paths, then behaves like [`Workbench::submit_files`].
    ///
    /// # Errors
    /// Fails before any processing if a path is missing or not a regular file.
    pub async fn submit_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> WorkbenchResult<BatchSummary> {
        let mut candidates = Vec::with_capacity(paths.len());
        for p in paths {
            candidates.push(FileCandidate::from_path(p).await?);
        }
        Ok(self.submit_files(candidates).await)
    }

    /// Shows the fixed sample result, bypassing validation and the backend.
    pub fn simulate_results(&mut self) {
        self.begin_action();
        self.board.upsert(ResultEntry {
            key: ResultKey::Simulated,
            label: "Sample".to_string(),
            language: self.language(),
            text: SAMPLE_RESULT.to_string(),
            failed: false,
        });
        self.view = ViewState::ShowingResult;
    }

    /// Back to idle: board, notice and text are cleared.
    pub fn clear(&mut self) {
        self.board.clear();
        self.notice = None;
        self.text.clear();
        self.view = ViewState::Idle;
    }

    /* ------------------------------ output ------------------------------ */

    /// The results pane as terminal text.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n", "Analysis Results".bold());
        out.push_str(&format!("Language: {}\n", self.language().label()));
        if let Some(notice) = &self.notice {
            out.push_str(&format!("{}\n", notice.red()));
        }
        if self.board.is_empty() {
            out.push_str(NO_RESULTS_MESSAGE);
            out.push('\n');
            return out;
        }
        for entry in self.board.entries() {
            let language = self.language_override.unwrap_or(entry.language);
            let heading = format!("== {} [{}]", entry.label, language);
            let heading = if entry.failed {
                heading.red().bold()
            } else {
                heading.cyan().bold()
            };
            out.push_str(&format!("\n{heading}\n"));
            out.push_str(&render_numbered(&entry.text, language));
        }
        out
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            view: self.view,
            notice: self.notice.clone(),
            language: self.language(),
            results: self.board.entries().iter().map(EntrySnapshot::from).collect(),
        }
    }

    /* ------------------------------ helpers ----------------------------- */

    fn validated_text(&self) -> Result<String, String> {
        if self.text.trim().is_empty() {
            return Err(EMPTY_TEXT_MESSAGE.to_string());
        }
        if self.text.chars().count() > self.max_text_chars {
            return Err(format!(
                "Text exceeds maximum length of {} characters.",
                self.max_text_chars
            ));
        }
        Ok(self.text.clone())
    }

    fn reject(&mut self, message: String) -> ViewState {
        debug!(%message, "input rejected");
        self.notice = Some(message);
        self.view = ViewState::ShowingError;
        self.view
    }

    fn begin_action(&mut self) {
        self.notice = None;
        if self.merge == MergePolicy::Replace {
            self.board.clear();
        }
    }
}

/// `"<label>: <first 100 chars>..."`
fn simulated(label: &str, input: &str) -> String {
    let preview: String = input.chars().take(SIMULATED_PREVIEW_CHARS).collect();
    format!("{label}: {preview}...")
}

fn is_log_like(name: &str) -> bool {
    let ext = file_extension(name);
    ext.eq_ignore_ascii_case("log") || ext.eq_ignore_ascii_case("txt")
}

fn outcome_entry(mode: AnalysisMode, outcome: &FileOutcome) -> ResultEntry {
    let (text, failed) = match &outcome.payload {
        OutcomePayload::Read(file) => {
            let text = match mode {
                AnalysisMode::Remote => format!("File Content:\n{}", file.content),
                AnalysisMode::Simulated if is_log_like(&file.name) => {
                    simulated("Log File Analysis", &file.content)
                }
                AnalysisMode::Simulated => simulated("Uploaded Code Analysis", &file.content),
            };
            (text, false)
        }
        OutcomePayload::Uploaded { message } => (message.clone(), false),
        OutcomePayload::Failed { message } => (message.clone(), true),
    };
    ResultEntry {
        key: ResultKey::File(outcome.id),
        label: outcome.name.clone(),
        language: outcome.language,
        text,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_api::{ApiError, BackendFuture, UploadPayload};
    use file_intake::{IntakeMode, UPLOAD_FAILED_MESSAGE};
    use std::sync::Mutex;

    /// Records every call; answers `"<path> ok"` or fails when `fail` is set.
    #[derive(Default)]
    struct RecordingBackend {
        fail: bool,
        calls: Mutex<Vec<(Endpoint, String)>>,
    }

    impl RecordingBackend {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<(Endpoint, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl AnalysisBackend for RecordingBackend {
        fn analyze<'a>(&'a self, endpoint: Endpoint, text: &'a str) -> BackendFuture<'a, String> {
            Box::pin(async move {
                self.calls.lock().unwrap().push((endpoint, text.to_string()));
                if self.fail {
                    return Err(ApiError::Decode("connection reset".into()));
                }
                Ok(format!("{} ok", endpoint.path()))
            })
        }

        fn upload<'a>(&'a self, file: &'a UploadPayload) -> BackendFuture<'a, String> {
            Box::pin(async move {
                self.calls
                    .lock()
                    .unwrap()
                    .push((Endpoint::UploadFile, file.file_name.clone()));
                if self.fail || file.file_name.starts_with("bad") {
                    return Err(ApiError::Decode("upload refused".into()));
                }
                Ok(format!("File {} uploaded successfully", file.file_name))
            })
        }
    }

    fn bench(cfg: WorkbenchConfig, backend: &Arc<RecordingBackend>) -> Workbench {
        Workbench::new(&cfg, backend.clone())
    }

    fn remote() -> WorkbenchConfig {
        WorkbenchConfig::default()
    }

    fn simulated_cfg() -> WorkbenchConfig {
        WorkbenchConfig {
            analysis: AnalysisMode::Simulated,
            ..Default::default()
        }
    }

    fn mem(name: &str, body: &str) -> FileCandidate {
        FileCandidate::from_bytes(name, None, body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn blank_text_is_rejected_without_a_request() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(remote(), &backend);

        for text in ["", "   \n\t "] {
            wb.set_text(text);
            assert_eq!(wb.submit_text().await, ViewState::ShowingError);
            assert_eq!(wb.notice(), Some(EMPTY_TEXT_MESSAGE));
        }
        assert!(backend.calls().is_empty());
        assert!(wb.board().is_empty());
    }

    #[tokio::test]
    async fn text_length_limit_is_inclusive() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(remote(), &backend);

        wb.set_text("é".repeat(1001));
        wb.submit_text().await;
        assert_eq!(
            wb.notice(),
            Some("Text exceeds maximum length of 1000 characters.")
        );
        assert!(backend.calls().is_empty());

        wb.set_text("é".repeat(1000));
        assert_eq!(wb.submit_text().await, ViewState::ShowingResult);
        assert_eq!(wb.notice(), None);
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn each_task_posts_to_its_endpoint_and_stores_result_verbatim() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(remote(), &backend);
        wb.set_text("NullPointerException at line 3");

        for task in TaskSelection::ALL {
            wb.select_task(task);
            wb.submit_text().await;
            let entry = wb.board().get(&ResultKey::Text(task)).unwrap();
            assert_eq!(entry.text, format!("{} ok", task.endpoint().path()));
        }
        let endpoints: Vec<Endpoint> = backend.calls().into_iter().map(|(e, _)| e).collect();
        assert_eq!(
            endpoints,
            [Endpoint::AnalyzeText, Endpoint::AnalyzeCode, Endpoint::DetectErrors]
        );
        assert_eq!(backend.calls()[0].1, "NullPointerException at line 3");
    }

    #[tokio::test]
    async fn summarize_uses_its_own_route() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(remote(), &backend);
        wb.set_text("long report");
        wb.summarize_text().await;
        assert_eq!(backend.calls()[0].0, Endpoint::SummarizeText);
        assert_eq!(
            wb.board().get(&ResultKey::Summary).unwrap().text,
            "/summarize-text ok"
        );
    }

    #[tokio::test]
    async fn network_failure_shows_fixed_placeholder() {
        colored::control::set_override(false);
        let backend = Arc::new(RecordingBackend::failing());
        let mut wb = bench(remote(), &backend);
        wb.set_text("hello");

        assert_eq!(wb.submit_text().await, ViewState::ShowingError);
        let entry = &wb.board().entries()[0];
        assert_eq!(entry.text, REQUEST_FAILED_MESSAGE);
        assert!(entry.failed);
        assert!(wb.render().contains(REQUEST_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn simulated_mode_echoes_a_preview_offline() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(simulated_cfg(), &backend);
        wb.select_task(TaskSelection::Code);
        wb.set_text("x".repeat(150));

        wb.submit_text().await;
        let entry = wb.board().get(&ResultKey::Text(TaskSelection::Code)).unwrap();
        assert_eq!(entry.text, format!("Code Analysis: {}...", "x".repeat(100)));
        assert!(backend.calls().is_empty());

        wb.select_task(TaskSelection::Logs);
        wb.set_text("short");
        wb.submit_text().await;
        assert_eq!(
            wb.board().entries()[0].text,
            "Log File Analysis: short..."
        );
    }

    #[tokio::test]
    async fn sample_result_bypasses_everything() {
        let backend = Arc::new(RecordingBackend::failing());
        let mut wb = bench(remote(), &backend);
        wb.simulate_results();
        assert_eq!(wb.view(), ViewState::ShowingResult);
        assert_eq!(wb.board().entries()[0].text, SAMPLE_RESULT);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn replace_policy_keeps_only_the_latest_action() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(remote(), &backend);
        wb.set_text("a");
        wb.submit_text().await;
        wb.simulate_results();

        assert_eq!(wb.board().len(), 1);
        assert_eq!(wb.board().entries()[0].key, ResultKey::Simulated);
    }

    #[tokio::test]
    async fn append_policy_accumulates_and_replaces_same_key() {
        let backend = Arc::new(RecordingBackend::default());
        let cfg = WorkbenchConfig {
            merge: MergePolicy::Append,
            ..Default::default()
        };
        let mut wb = bench(cfg, &backend);
        wb.set_text("a");
        wb.submit_text().await;
        wb.simulate_results();
        wb.submit_files(vec![mem("one.py", "1")]).await;
        wb.submit_text().await;

        let keys: Vec<ResultKey> = wb.board().entries().iter().map(|e| e.key).collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0], ResultKey::Text(TaskSelection::Text));
        assert_eq!(keys[1], ResultKey::Simulated);
        assert!(matches!(keys[2], ResultKey::File(_)));
    }

    #[tokio::test]
    async fn each_file_gets_its_own_entry_and_language() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(remote(), &backend);
        let a = mem("a.py", "print(1)");
        let b = mem("b.java", "class B {}");
        let (id_a, id_b) = (a.id, b.id);

        let summary = wb.submit_files(vec![a, b]).await;
        assert_eq!(summary.accepted, 2);
        assert_eq!(wb.view(), ViewState::ShowingResult);

        let ea = wb.board().get(&ResultKey::File(id_a)).unwrap();
        assert_eq!(ea.language, DetectedLanguage::Python);
        assert_eq!(ea.text, "File Content:\nprint(1)");
        let eb = wb.board().get(&ResultKey::File(id_b)).unwrap();
        assert_eq!(eb.language, DetectedLanguage::Java);
        assert!(matches!(
            wb.language(),
            DetectedLanguage::Python | DetectedLanguage::Java
        ));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn simulated_files_are_labelled_by_kind() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(simulated_cfg(), &backend);
        let log = mem("server.log", "ERROR disk full");
        let code = mem("app.js", "let a = 1;");
        let (log_id, code_id) = (log.id, code.id);

        wb.submit_files(vec![log, code]).await;
        assert_eq!(
            wb.board().get(&ResultKey::File(log_id)).unwrap().text,
            "Log File Analysis: ERROR disk full..."
        );
        assert_eq!(
            wb.board().get(&ResultKey::File(code_id)).unwrap().text,
            "Uploaded Code Analysis: let a = 1;..."
        );
    }

    #[tokio::test]
    async fn upload_failures_stay_per_file() {
        let backend = Arc::new(RecordingBackend::default());
        let cfg = WorkbenchConfig {
            intake: IntakeMode::Upload,
            ..Default::default()
        };
        let mut wb = bench(cfg, &backend);

        let summary = wb
            .submit_files(vec![mem("good.py", "1"), mem("bad.py", "2")])
            .await;
        assert_eq!((summary.accepted, summary.failed), (2, 1));
        assert_eq!(wb.view(), ViewState::ShowingResult);

        let texts: Vec<(&str, bool)> = wb
            .board()
            .entries()
            .iter()
            .map(|e| (e.text.as_str(), e.failed))
            .collect();
        assert!(texts.contains(&("File good.py uploaded successfully", false)));
        assert!(texts.contains(&(UPLOAD_FAILED_MESSAGE, true)));
    }

    #[tokio::test]
    async fn failed_upload_keeps_the_language_indicator() {
        let backend = Arc::new(RecordingBackend::default());
        let cfg = WorkbenchConfig {
            intake: IntakeMode::Upload,
            ..Default::default()
        };
        let mut wb = bench(cfg, &backend);

        let summary = wb.submit_files(vec![mem("bad.py", "x = 1")]).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(wb.language(), INITIAL_LANGUAGE);
        assert_eq!(wb.view(), ViewState::ShowingError);

        wb.submit_files(vec![mem("good.py", "x = 1")]).await;
        assert_eq!(wb.language(), DetectedLanguage::Python);
    }

    #[tokio::test]
    async fn rejected_batch_leaves_the_board_alone() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(remote(), &backend);
        wb.simulate_results();

        let png = FileCandidate::from_bytes("logo.png", Some("image/png"), vec![0; 8]);
        let summary = wb.submit_files(vec![png]).await;
        assert_eq!(summary.accepted, 0);
        assert_eq!(wb.board().entries()[0].key, ResultKey::Simulated);
        assert_eq!(wb.view(), ViewState::ShowingResult);
    }

    #[tokio::test]
    async fn submit_paths_reports_missing_files() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(remote(), &backend);
        let dir = tempfile::tempdir().unwrap();
        let ok = dir.path().join("notes.txt");
        std::fs::write(&ok, "remember").unwrap();

        let summary = wb.submit_paths(&[&ok]).await.unwrap();
        assert_eq!(summary.accepted, 1);
        assert_eq!(wb.board().entries()[0].text, "File Content:\nremember");

        assert!(wb.submit_paths(&[dir.path().join("nope.py")]).await.is_err());
    }

    #[test]
    fn empty_board_renders_placeholder_and_clear_returns_to_idle() {
        colored::control::set_override(false);
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(remote(), &backend);
        assert!(wb.render().contains(NO_RESULTS_MESSAGE));
        assert!(wb.render().contains("Language: JavaScript"));

        wb.simulate_results();
        assert!(wb.render().contains("\n1 | This is a sample analysis result.\n"));
        wb.clear();
        assert_eq!(wb.view(), ViewState::Idle);
        assert!(wb.board().is_empty());
    }

    #[test]
    fn language_override_wins_over_detection() {
        colored::control::set_override(false);
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(remote(), &backend);
        wb.override_language(Some(DetectedLanguage::Python));
        wb.simulate_results();
        assert_eq!(wb.language(), DetectedLanguage::Python);
        assert!(wb.render().contains("[python]"));
        wb.override_language(None);
        assert_eq!(wb.language(), INITIAL_LANGUAGE);
    }

    #[test]
    fn snapshot_serializes_keys_as_strings() {
        let backend = Arc::new(RecordingBackend::default());
        let mut wb = bench(remote(), &backend);
        wb.simulate_results();
        let json = serde_json::to_value(wb.snapshot()).unwrap();
        assert_eq!(json["view"], "showing_result");
        assert_eq!(json["results"][0]["key"], "simulated");
        assert_eq!(json["language"], "javascript");
    }
}
