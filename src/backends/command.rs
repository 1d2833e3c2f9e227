//! External executable remover
//!
//! Drives a background-removal command line tool (by default the
//! `imgly-bgremove` CLI) as the removal capability. The input is written to
//! a scratch directory, the tool is run with `{input}`/`{output}` expanded
//! in its argument template, and the PNG it writes is read back.
//!
//! The tool has no progress protocol of its own, so progress is derived
//! from its stdout: `fetch:model` spans an announced model download, and
//! `compute:inference` starts on the first other output (or when the tool
//! exits silently) and completes once the PNG is read back.

use crate::{
    config::CommandConfig,
    error::{ClearCutError, Result},
    phase::{ProgressEvent, COMPUTE_INFERENCE_KEY},
    removal::{BackgroundRemover, ProgressCallback},
    types::{ImageFile, ProcessedImage},
};
use async_trait::async_trait;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, trace, warn};

/// Progress key reported while the tool downloads its model
pub const MODEL_FETCH_KEY: &str = "fetch:model";

/// Placeholder replaced by the input path
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Placeholder replaced by the output path
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

const OUTPUT_FILE_NAME: &str = "output.png";
const STDERR_TAIL_LINES: usize = 5;

/// What a line of tool output says about model downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DownloadSignal {
    Started,
    Finished,
}

fn download_signal(line: &str) -> Option<DownloadSignal> {
    let line = line.to_ascii_lowercase();
    if line.contains("downloaded") {
        Some(DownloadSignal::Finished)
    } else if line.contains("downloading") {
        Some(DownloadSignal::Started)
    } else {
        None
    }
}

/// Report the start of inference once per run
fn start_compute(progress: &ProgressCallback, computing: &mut bool) {
    if !*computing {
        *computing = true;
        progress(ProgressEvent::new(COMPUTE_INFERENCE_KEY, 0, 1));
    }
}

/// Remover backed by an external command
#[derive(Debug, Clone)]
pub struct CommandRemover {
    program: String,
    args: Vec<String>,
}

impl CommandRemover {
    /// Create a remover running `program` with an argument template
    pub fn new<S: Into<String>>(program: S, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    #[must_use]
    pub fn from_config(config: &CommandConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Expand the argument template for one run
    #[must_use]
    pub fn expand_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.display().to_string();
        let output = output.display().to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }

    fn input_file_name(image: &ImageFile) -> PathBuf {
        Path::new(image.name())
            .file_name()
            .map_or_else(|| PathBuf::from("input"), PathBuf::from)
    }

    async fn run(&self, args: &[String], progress: &ProgressCallback) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ClearCutError::remover_unavailable(
                    self.name(),
                    &format!("failed to start '{}': {}", self.program, e),
                )
            })?;

        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut captured = String::new();
                if let Err(e) = stderr.read_to_string(&mut captured).await {
                    debug!("Failed to read tool stderr: {}", e);
                }
                captured
            })
        });

        let mut computing = false;
        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            let mut downloading = false;
            while let Some(line) = lines.next_line().await? {
                trace!(tool_output = %line);
                match download_signal(&line) {
                    Some(DownloadSignal::Started) => {
                        if !downloading && !computing {
                            downloading = true;
                            progress(ProgressEvent::new(MODEL_FETCH_KEY, 0, 1));
                        }
                    },
                    Some(DownloadSignal::Finished) if downloading => {
                        downloading = false;
                        progress(ProgressEvent::new(MODEL_FETCH_KEY, 1, 1));
                        start_compute(progress, &mut computing);
                    },
                    _ if !downloading => start_compute(progress, &mut computing),
                    _ => {},
                }
            }
        }
        start_compute(progress, &mut computing);

        let status = child.wait().await?;
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            return Ok(());
        }

        let tail: Vec<&str> = stderr
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();
        let tail = tail
            .get(tail.len().saturating_sub(STDERR_TAIL_LINES)..)
            .unwrap_or_default()
            .join(" | ");
        warn!(program = %self.program, %status, "Removal tool failed");
        Err(ClearCutError::removal_failed(
            self.name(),
            &format!("'{}' exited with {}: {}", self.program, status, tail),
        ))
    }
}

#[async_trait]
impl BackgroundRemover for CommandRemover {
    fn name(&self) -> &str {
        "command"
    }

    async fn remove_background(
        &self,
        image: &ImageFile,
        progress: ProgressCallback,
    ) -> Result<ProcessedImage> {
        let workdir = tempfile::tempdir()?;
        let input_path = workdir.path().join(Self::input_file_name(image));
        let output_path = workdir.path().join(OUTPUT_FILE_NAME);

        tokio::fs::write(&input_path, image.blob().bytes())
            .await
            .map_err(|e| ClearCutError::file_io_error("write removal input", &input_path, &e))?;

        let args = self.expand_args(&input_path, &output_path);
        debug!(program = %self.program, ?args, "Running removal tool");

        self.run(&args, &progress).await?;

        let bytes = tokio::fs::read(&output_path)
            .await
            .map_err(|e| ClearCutError::file_io_error("read removal output", &output_path, &e))?;

        match image::guess_format(&bytes) {
            Ok(ImageFormat::Png) => {},
            Ok(other) => {
                return Err(ClearCutError::unsupported_format(format!(
                    "removal tool produced {} instead of image/png",
                    other.to_mime_type()
                )))
            },
            Err(e) => return Err(e.into()),
        }

        progress(ProgressEvent::new(COMPUTE_INFERENCE_KEY, 1, 1));
        Ok(ProcessedImage::png(bytes))
    }
}
