//! Text recognition workers.
//!
//! [`TesseractEngine`] hands out short-lived [`TesseractWorker`]s, one per
//! image. [`WorkerGuard`] owns a worker and terminates it on drop, so a worker
//! is released whether recognition succeeds, fails, panics or is cancelled by
//! a timeout. [`OcrPool`] bounds how many workers exist at once.

use async_trait::async_trait;
use docsift_core::{OcrEngine, OcrError, RecognitionWorker};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::Semaphore;
use tracing::debug;

/// Configuration for OCR.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Recognition language model
    pub language: String,
    /// Time budget for one recognition
    pub timeout: Duration,
    /// Maximum live workers
    pub max_workers: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            timeout: Duration::from_secs(120),
            max_workers: 2,
        }
    }
}

// ============================================================================
// Tesseract
// ============================================================================

/// Engine that runs the `tesseract` command-line tool.
pub struct TesseractEngine {
    binary: PathBuf,
}

impl TesseractEngine {
    /// Use the given tesseract executable.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn acquire(&self, language: &str) -> Result<Box<dyn RecognitionWorker>, OcrError> {
        if !is_valid_language(language) {
            return Err(OcrError::WorkerUnavailable(format!(
                "invalid language model '{language}'"
            )));
        }

        let scratch = tempfile::Builder::new()
            .prefix("docsift-ocr-")
            .tempdir()
            .map_err(|e| OcrError::WorkerUnavailable(format!("scratch directory: {e}")))?;

        debug!(
            "Acquired tesseract worker ({}) in {:?}",
            language,
            scratch.path()
        );

        Ok(Box::new(TesseractWorker {
            binary: self.binary.clone(),
            language: language.to_string(),
            scratch: Some(scratch),
            child: None,
        }))
    }
}

/// Language specs look like `eng` or `eng+deu`.
fn is_valid_language(language: &str) -> bool {
    !language.is_empty()
        && language
            .split('+')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
}

/// One tesseract process plus its scratch directory.
pub struct TesseractWorker {
    binary: PathBuf,
    language: String,
    scratch: Option<TempDir>,
    child: Option<Child>,
}

#[async_trait]
impl RecognitionWorker for TesseractWorker {
    async fn recognize(&mut self, image: &Path) -> Result<String, OcrError> {
        let output_base = self
            .scratch
            .as_ref()
            .ok_or_else(|| OcrError::WorkerUnavailable("worker already terminated".to_string()))?
            .path()
            .join("out");

        let spawned = Command::new(&self.binary)
            .arg(image)
            .arg(&output_base)
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                OcrError::WorkerUnavailable(format!(
                    "failed to start {}: {e}",
                    self.binary.display()
                ))
            })?;
        let child = self.child.insert(spawned);

        let mut stderr = Vec::new();
        if let Some(mut pipe) = child.stderr.take() {
            pipe.read_to_end(&mut stderr).await?;
        }
        let status = child.wait().await?;
        self.child = None;

        if !status.success() {
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {status}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }

        let text = tokio::fs::read_to_string(output_base.with_extension("txt")).await?;
        Ok(text)
    }

    fn terminate(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
        }
        // Dropping the TempDir removes the scratch files
        self.scratch.take();
    }
}

// ============================================================================
// Scoped acquisition
// ============================================================================

/// Owns a worker and terminates it when dropped.
pub struct WorkerGuard {
    worker: Option<Box<dyn RecognitionWorker>>,
}

impl WorkerGuard {
    /// Take ownership of an acquired worker.
    #[must_use]
    pub fn new(worker: Box<dyn RecognitionWorker>) -> Self {
        Self {
            worker: Some(worker),
        }
    }

    /// Run recognition on the guarded worker.
    pub async fn recognize(&mut self, image: &Path) -> Result<String, OcrError> {
        match self.worker.as_mut() {
            Some(worker) => worker.recognize(image).await,
            None => Err(OcrError::WorkerUnavailable(
                "worker already released".to_string(),
            )),
        }
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.terminate();
            debug!("Released recognition worker");
        }
    }
}

// ============================================================================
// Pool
// ============================================================================

/// Bounded pool of recognition workers.
pub struct OcrPool {
    engine: Arc<dyn OcrEngine>,
    semaphore: Semaphore,
    config: OcrConfig,
}

impl OcrPool {
    /// Create a new pool.
    pub fn new(engine: Arc<dyn OcrEngine>, config: OcrConfig) -> Self {
        Self {
            engine,
            semaphore: Semaphore::new(config.max_workers.max(1)),
            config,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Get pool statistics.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Recognize an image with a freshly acquired worker.
    ///
    /// The worker is released before this returns, on every path.
    pub async fn recognize(&self, image: &Path) -> Result<String, OcrError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| OcrError::WorkerUnavailable(format!("semaphore error: {e}")))?;

        let mut guard = WorkerGuard::new(self.engine.acquire(&self.config.language).await?);

        match tokio::time::timeout(self.config.timeout, guard.recognize(image)).await {
            Ok(result) => result,
            Err(_) => Err(OcrError::Timeout(self.config.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Behavior {
        Succeed,
        Fail,
        Panic,
        Hang,
    }

    #[derive(Default)]
    struct Counters {
        acquired: AtomicUsize,
        released: AtomicUsize,
    }

    struct MockEngine {
        behavior: Behavior,
        counters: Arc<Counters>,
    }

    impl MockEngine {
        fn new(behavior: Behavior) -> (Self, Arc<Counters>) {
            let counters = Arc::new(Counters::default());
            (
                Self {
                    behavior,
                    counters: Arc::clone(&counters),
                },
                counters,
            )
        }
    }

    struct MockWorker {
        behavior: Behavior,
        counters: Arc<Counters>,
        terminated: bool,
    }

    #[async_trait]
    impl OcrEngine for MockEngine {
        fn name(&self) -> &str {
            "mock"
        }

        async fn acquire(&self, _language: &str) -> Result<Box<dyn RecognitionWorker>, OcrError> {
            self.counters.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MockWorker {
                behavior: self.behavior,
                counters: Arc::clone(&self.counters),
                terminated: false,
            }))
        }
    }

    #[async_trait]
    impl RecognitionWorker for MockWorker {
        async fn recognize(&mut self, _image: &Path) -> Result<String, OcrError> {
            match self.behavior {
                Behavior::Succeed => Ok("  recognized text \n".to_string()),
                Behavior::Fail => Err(OcrError::Recognition("injected fault".to_string())),
                Behavior::Panic => panic!("injected panic"),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }

        fn terminate(&mut self) {
            if !self.terminated {
                self.terminated = true;
                self.counters.released.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn pool(engine: MockEngine, timeout: Duration) -> OcrPool {
        OcrPool::new(
            Arc::new(engine),
            OcrConfig {
                timeout,
                ..OcrConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_worker_released_on_success() {
        let (engine, counters) = MockEngine::new(Behavior::Succeed);
        let pool = pool(engine, Duration::from_secs(5));

        let text = pool.recognize(Path::new("scan.png")).await.unwrap();
        assert_eq!(text, "  recognized text \n");
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_worker_released_when_recognition_fails() {
        let (engine, counters) = MockEngine::new(Behavior::Fail);
        let pool = pool(engine, Duration::from_secs(5));

        for _ in 0..3 {
            let err = pool.recognize(Path::new("scan.png")).await.unwrap_err();
            assert!(matches!(err, OcrError::Recognition(_)));
        }
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 3);
        assert_eq!(counters.released.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_worker_released_when_recognition_panics() {
        let (engine, counters) = MockEngine::new(Behavior::Panic);
        let pool = Arc::new(pool(engine, Duration::from_secs(5)));

        let task_pool = Arc::clone(&pool);
        let result =
            tokio::spawn(async move { task_pool.recognize(Path::new("scan.png")).await }).await;

        assert!(result.unwrap_err().is_panic());
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
        assert_eq!(pool.available_permits(), pool.config().max_workers);
    }

    #[tokio::test]
    async fn test_worker_released_on_timeout() {
        let (engine, counters) = MockEngine::new(Behavior::Hang);
        let pool = pool(engine, Duration::from_millis(20));

        let err = pool.recognize(Path::new("scan.png")).await.unwrap_err();
        assert!(matches!(err, OcrError::Timeout(_)));
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_permits_returned_after_use() {
        let (engine, _counters) = MockEngine::new(Behavior::Succeed);
        let pool = pool(engine, Duration::from_secs(5));
        assert_eq!(pool.available_permits(), 2);

        pool.recognize(Path::new("a.png")).await.unwrap();
        assert_eq!(pool.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_guard_terminates_once() {
        let (engine, counters) = MockEngine::new(Behavior::Succeed);
        let worker = engine.acquire("eng").await.unwrap();
        {
            let mut guard = WorkerGuard::new(worker);
            guard.recognize(Path::new("x.png")).await.unwrap();
        }
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_language_validation() {
        assert!(is_valid_language("eng"));
        assert!(is_valid_language("eng+deu"));
        assert!(is_valid_language("chi_sim"));
        assert!(!is_valid_language(""));
        assert!(!is_valid_language("eng+"));
        assert!(!is_valid_language("../eng"));
        assert!(!is_valid_language("eng --psm 6"));
    }

    #[tokio::test]
    async fn test_tesseract_rejects_bad_language() {
        let engine = TesseractEngine::default();
        assert_eq!(engine.name(), "tesseract");
        let result = engine.acquire("not a language").await;
        assert!(matches!(result, Err(OcrError::WorkerUnavailable(_))));
    }

    #[tokio::test]
    async fn test_tesseract_missing_binary_is_worker_unavailable() {
        let engine = TesseractEngine::new("/nonexistent/tesseract-binary");
        let mut guard = WorkerGuard::new(engine.acquire("eng").await.unwrap());

        let err = guard.recognize(Path::new("scan.png")).await.unwrap_err();
        assert!(matches!(err, OcrError::WorkerUnavailable(_)));
    }

    #[tokio::test]
    async fn test_terminated_worker_refuses_work() {
        let engine = TesseractEngine::default();
        let mut worker = engine.acquire("eng").await.unwrap();
        worker.terminate();
        worker.terminate();

        let err = worker.recognize(Path::new("scan.png")).await.unwrap_err();
        assert!(matches!(err, OcrError::WorkerUnavailable(_)));
    }
}
