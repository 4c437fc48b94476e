// ============================================================================
// reencode-core/src/external/mocks.rs
// ============================================================================
//
// TEST DOUBLES: Scripted probers, spawners, runners and engines
//
// KEY COMPONENTS:
// - MockProber: canned metadata or failures keyed by file name
// - MockFfmpegSpawner / MockFfmpegProcess: replay FfmpegEvent sequences
// - RecordingProcessRunner: spy that records every invocation
// - ScriptedEngine: EncodeEngine that fails chosen files and tracks concurrency
//
// Compiled for this crate's unit tests and, through the "test-mocks" feature,
// for the integration tests under tests/.
//
// All doubles share state through Arc<Mutex<..>> so clones handed to worker
// threads report back to the test that created them. Unmatched calls return
// errors rather than panicking so a worker thread never takes a batch down.

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use super::ffprobe_executor::MediaProber;
use super::process_runner::{ProcessOutput, ProcessRunner};
use crate::engine::{EncodeEngine, EncodeJob};
use crate::error::{EncodeError, ProbeError};
use crate::media::MediaMetadata;
use crate::reporting::Reporter;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::collections::{HashMap, HashSet, VecDeque};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Builds an `ExitStatus` carrying `code`.
pub fn exit_status(code: i32) -> ExitStatus {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }
    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ============================================================================
// PROBER
// ============================================================================

#[derive(Clone)]
enum ProbeScript {
    Metadata(MediaMetadata),
    Failure(String),
}

/// `MediaProber` returning canned results keyed by file name.
#[derive(Clone, Default)]
pub struct MockProber {
    scripts: Arc<Mutex<HashMap<String, ProbeScript>>>,
    probed: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probing `filename` yields metadata with the given duration.
    pub fn with_duration(self, filename: &str, duration: Option<f64>) -> Self {
        self.insert(filename, ProbeScript::Metadata(MediaMetadata::with_duration(duration)));
        self
    }

    /// Probing `filename` fails with a parse error carrying `message`.
    pub fn with_failure(self, filename: &str, message: &str) -> Self {
        self.insert(filename, ProbeScript::Failure(message.to_string()));
        self
    }

    /// Every path probed so far, in call order.
    pub fn probed(&self) -> Vec<PathBuf> {
        self.probed.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn insert(&self, filename: &str, script: ProbeScript) {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.insert(filename.to_string(), script);
        }
    }
}

impl MediaProber for MockProber {
    fn probe(&self, path: &Path) -> Result<MediaMetadata, ProbeError> {
        if let Ok(mut probed) = self.probed.lock() {
            probed.push(path.to_path_buf());
        }
        let name = file_name_of(path);
        let script = self
            .scripts
            .lock()
            .ok()
            .and_then(|scripts| scripts.get(&name).cloned());
        match script {
            Some(ProbeScript::Metadata(metadata)) => Ok(metadata),
            Some(ProbeScript::Failure(message)) => Err(ProbeError::Parse(message)),
            None => Err(ProbeError::Other(format!(
                "MockProber: no result scripted for {}",
                path.display()
            ))),
        }
    }
}

// ============================================================================
// FFMPEG SPAWNER
// ============================================================================

/// Replays a fixed event list, then reports a fixed exit status.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    pub events_to_emit: Vec<FfmpegEvent>,
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> Result<(), EncodeError>
    where
        F: FnMut(FfmpegEvent),
    {
        for event in self.events_to_emit.drain(..) {
            handler(event);
        }
        Ok(())
    }

    fn wait(&mut self) -> Result<ExitStatus, EncodeError> {
        Ok(self.exit_status)
    }
}

struct MockFfmpegExpectation {
    arg_pattern: String,
    process: MockFfmpegProcess,
}

/// `FfmpegSpawner` matching commands against argument substrings.
///
/// Each expectation is consumed by the first command having an argument that
/// contains its pattern.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Arc<Mutex<Vec<MockFfmpegExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>) {
        self.add_exit_error_expectation(arg_pattern, events, 0);
    }

    pub fn add_exit_error_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>, exit_code: i32) {
        if let Ok(mut expectations) = self.expectations.lock() {
            expectations.push(MockFfmpegExpectation {
                arg_pattern: arg_pattern.to_string(),
                process: MockFfmpegProcess {
                    events_to_emit: events,
                    exit_status: exit_status(exit_code),
                },
            });
        }
    }

    /// Arguments of every spawned command, in call order.
    pub fn received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> Result<Self::Process, EncodeError> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        if let Ok(mut calls) = self.received_calls.lock() {
            calls.push(args.clone());
        }

        let mut expectations = self
            .expectations
            .lock()
            .map_err(|_| EncodeError::Engine {
                diagnostics: "MockFfmpegSpawner: expectation lock poisoned".to_string(),
            })?;
        let found = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));

        match found {
            Some(index) => {
                let expectation = expectations.remove(index);
                log::debug!(
                    "MockFfmpegSpawner: matched expectation '{}'",
                    expectation.arg_pattern
                );
                Ok(expectation.process)
            }
            None => Err(EncodeError::Engine {
                diagnostics: format!("MockFfmpegSpawner: no expectation for {:?}", args),
            }),
        }
    }
}

// ============================================================================
// PROCESS RUNNER SPY
// ============================================================================

enum ScriptedRun {
    Output(ProcessOutput),
    SpawnError(io::ErrorKind),
}

/// `ProcessRunner` spy. Returns queued responses in order, then clean exits.
#[derive(Clone, Default)]
pub struct RecordingProcessRunner {
    responses: Arc<Mutex<VecDeque<ScriptedRun>>>,
    calls: Arc<Mutex<Vec<(String, Vec<OsString>)>>>,
}

impl RecordingProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_output(&self, output: ProcessOutput) {
        self.push(ScriptedRun::Output(output));
    }

    /// Queues a run that fails with `status` and the given stderr.
    pub fn push_failure(&self, status: i32, stderr: &str) {
        self.push_output(ProcessOutput {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.to_string(),
        });
    }

    pub fn push_spawn_error(&self, kind: io::ErrorKind) {
        self.push(ScriptedRun::SpawnError(kind));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Program and arguments of every invocation, in call order.
    pub fn calls(&self) -> Vec<(String, Vec<OsString>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn push(&self, run: ScriptedRun) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(run);
        }
    }
}

impl ProcessRunner for RecordingProcessRunner {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<ProcessOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((program.to_string(), args.to_vec()));
        }
        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());
        match next {
            Some(ScriptedRun::Output(output)) => Ok(output),
            Some(ScriptedRun::SpawnError(kind)) => Err(io::Error::new(kind, "scripted spawn failure")),
            None => Ok(ProcessOutput {
                status: Some(0),
                ..ProcessOutput::default()
            }),
        }
    }
}

// ============================================================================
// SCRIPTED ENGINE
// ============================================================================

/// `EncodeEngine` that fails configured files and records every job it ran.
#[derive(Clone, Default)]
pub struct ScriptedEngine {
    failures: Arc<Mutex<HashSet<String>>>,
    jobs: Arc<Mutex<Vec<EncodeJob>>>,
    delay: Duration,
    create_outputs: bool,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs for `filename` fail with an engine error.
    pub fn failing(self, filename: &str) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(filename.to_string());
        }
        self
    }

    /// Every job sleeps for `delay` before resolving.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Successful jobs write an empty file at their output path.
    pub fn creating_outputs(mut self) -> Self {
        self.create_outputs = true;
        self
    }

    pub fn jobs(&self) -> Vec<EncodeJob> {
        self.jobs.lock().map(|j| j.clone()).unwrap_or_default()
    }

    /// Highest number of jobs observed running at the same time.
    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl EncodeEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn passes(&self) -> u8 {
        1
    }

    fn encode(&self, job: &EncodeJob, _reporter: &dyn Reporter) -> Result<(), EncodeError> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.push(job.clone());
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let fail = self
            .failures
            .lock()
            .map(|f| f.contains(&job.filename))
            .unwrap_or(false);
        let result = if fail {
            Err(EncodeError::Engine {
                diagnostics: format!("scripted failure for {}", job.filename),
            })
        } else if self.create_outputs {
            std::fs::write(&job.output_path, b"").map_err(EncodeError::Setup)
        } else {
            Ok(())
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
