//! Boundary to the external splitting engine.
//!
//! The engine does the real work: applying splitpoints, writing tags,
//! silence and sync detection. This front end only describes jobs and reads
//! results back. The process-backed implementation talks to the engine
//! binary with JSON on stdin/stdout; its stderr is inherited so the engine's
//! own progress output reaches the terminal.

use std::io::Read;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::debug;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::cli::SilenceParams;
use crate::job::SplitJob;
use crate::query::ServerSpec;

const ENGINE_BIN: &str = "trackcut-engine";
const ENGINE_ENV: &str = "TRACKCUT_ENGINE";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("`{0}` not found. Please ensure the splitting engine is installed and in your PATH.")]
    EngineNotFound(String),
    #[error("engine command `{0}` failed: {1}")]
    CommandFailed(String, String),
    #[error("unexpected reply from the splitting engine: {0}")]
    BadReply(#[from] serde_json::Error),
    #[error("split interrupted")]
    Interrupted,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Cooperative cancellation flag, shared with the interrupt handler.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One album entry returned by a freedb search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlbumResult {
    pub id: u32,
    pub name: String,
    /// Number of extra revisions listed under this entry.
    #[serde(default)]
    pub revisions: u32,
}

/// What the engine reports back after a split.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SplitReport {
    #[serde(default)]
    pub created_files: Vec<String>,
    #[serde(default)]
    pub average_silence_level: Option<f32>,
}

pub trait Engine {
    /// Black-box listing of the audio files under a directory, in the
    /// engine's own enumeration order.
    fn find_audio_files(&self, dir: &str) -> Result<Vec<String>, EngineError>;

    /// Track filenames stored in a wrapped archive, without extracting.
    fn list_wrapped(&self, file: &str) -> Result<Vec<String>, EngineError>;

    /// Number of silence splitpoints detection would produce.
    fn count_silence(&self, file: &str, params: &SilenceParams) -> Result<u32, EngineError>;

    /// Search the metadata server for albums matching `query`.
    fn freedb_search(&self, query: &str, server: &ServerSpec)
    -> Result<Vec<AlbumResult>, EngineError>;

    /// Fetch one search result's metadata into `dest`.
    fn freedb_fetch(&self, result_id: u32, server: &ServerSpec, dest: &str)
    -> Result<(), EngineError>;

    /// Perform one split job, watching the cancellation flag.
    fn split(&self, job: &SplitJob, cancel: &CancelFlag) -> Result<SplitReport, EngineError>;
}

/// Engine implementation driving the external engine binary.
pub struct ProcessEngine {
    program: String,
}

impl ProcessEngine {
    pub fn from_env() -> Self {
        let program = std::env::var(ENGINE_ENV).unwrap_or_else(|_| ENGINE_BIN.to_string());
        ProcessEngine { program }
    }

    fn spawn(&self, subcommand: &str, extra: &[&str], piped_stdin: bool) -> Result<std::process::Child, EngineError> {
        debug!("engine: {} {} {:?}", self.program, subcommand, extra);
        let mut command = Command::new(&self.program);
        command.arg(subcommand).args(extra).stdout(Stdio::piped());
        if piped_stdin {
            command.stdin(Stdio::piped());
        }
        command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::EngineNotFound(self.program.clone())
            } else {
                EngineError::Io(e)
            }
        })
    }

    /// Run a short engine command to completion and return its stdout.
    fn run(&self, subcommand: &str, extra: &[&str], input: Option<String>) -> Result<Vec<u8>, EngineError> {
        let mut child = self.spawn(subcommand, extra, input.is_some())?;
        if let Some(payload) = input {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(payload.as_bytes())?;
            }
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(EngineError::CommandFailed(
                subcommand.to_string(),
                output.status.to_string(),
            ));
        }
        Ok(output.stdout)
    }
}

impl Engine for ProcessEngine {
    fn find_audio_files(&self, dir: &str) -> Result<Vec<String>, EngineError> {
        let stdout = self.run("scan", &[dir], None)?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    fn list_wrapped(&self, file: &str) -> Result<Vec<String>, EngineError> {
        let stdout = self.run("wrapped-files", &[file], None)?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    fn count_silence(&self, file: &str, params: &SilenceParams) -> Result<u32, EngineError> {
        #[derive(Deserialize)]
        struct Reply {
            count: u32,
        }
        let payload = json!({ "file": file, "params": params }).to_string();
        let stdout = self.run("count-silence", &[], Some(payload))?;
        let reply: Reply = serde_json::from_slice(&stdout)?;
        Ok(reply.count)
    }

    fn freedb_search(
        &self,
        query: &str,
        server: &ServerSpec,
    ) -> Result<Vec<AlbumResult>, EngineError> {
        let payload = json!({ "query": query, "server": server }).to_string();
        let stdout = self.run("freedb-search", &[], Some(payload))?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    fn freedb_fetch(
        &self,
        result_id: u32,
        server: &ServerSpec,
        dest: &str,
    ) -> Result<(), EngineError> {
        let payload = json!({ "result": result_id, "server": server, "dest": dest }).to_string();
        self.run("freedb-fetch", &[], Some(payload))?;
        Ok(())
    }

    fn split(&self, job: &SplitJob, cancel: &CancelFlag) -> Result<SplitReport, EngineError> {
        let payload = serde_json::to_string(job)?;
        let mut child = self.spawn("split", &[], true)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(payload.as_bytes())?;
        }

        let status = loop {
            if cancel.is_cancelled() {
                child.kill()?;
                child.wait()?;
                return Err(EngineError::Interrupted);
            }
            match child.try_wait()? {
                Some(status) => break status,
                None => std::thread::sleep(Duration::from_millis(50)),
            }
        };

        let mut stdout = Vec::new();
        if let Some(mut out) = child.stdout.take() {
            out.read_to_end(&mut stdout)?;
        }
        if !status.success() {
            return Err(EngineError::CommandFailed(
                "split".to_string(),
                status.to_string(),
            ));
        }
        if stdout.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(SplitReport::default());
        }
        Ok(serde_json::from_slice(&stdout)?)
    }
}

#[cfg(test)]
pub mod mock {
    use std::cell::RefCell;

    use super::*;

    /// Test double recording the calls made through the engine boundary.
    #[derive(Default)]
    pub struct MockEngine {
        /// Directory path to file list, consulted by `find_audio_files`.
        pub audio_files: Vec<(String, Vec<String>)>,
        pub results: Vec<AlbumResult>,
        pub scanned: RefCell<Vec<String>>,
        pub fetched: RefCell<Vec<(u32, String)>>,
        pub split_jobs: RefCell<Vec<SplitJob>>,
    }

    impl Engine for MockEngine {
        fn find_audio_files(&self, dir: &str) -> Result<Vec<String>, EngineError> {
            self.scanned.borrow_mut().push(dir.to_string());
            Ok(self
                .audio_files
                .iter()
                .find(|(path, _)| path == dir)
                .map(|(_, files)| files.clone())
                .unwrap_or_default())
        }

        fn list_wrapped(&self, _file: &str) -> Result<Vec<String>, EngineError> {
            Ok(Vec::new())
        }

        fn count_silence(&self, _file: &str, _params: &SilenceParams) -> Result<u32, EngineError> {
            Ok(0)
        }

        fn freedb_search(
            &self,
            _query: &str,
            _server: &ServerSpec,
        ) -> Result<Vec<AlbumResult>, EngineError> {
            Ok(self.results.clone())
        }

        fn freedb_fetch(
            &self,
            result_id: u32,
            _server: &ServerSpec,
            dest: &str,
        ) -> Result<(), EngineError> {
            self.fetched.borrow_mut().push((result_id, dest.to_string()));
            Ok(())
        }

        fn split(&self, job: &SplitJob, _cancel: &CancelFlag) -> Result<SplitReport, EngineError> {
            self.split_jobs.borrow_mut().push(job.clone());
            Ok(SplitReport::default())
        }
    }
}
