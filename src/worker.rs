//! Background fill jobs.
//!
//! A job runs the whole pipeline on its own thread and streams progress
//! through a publish-latest channel, so a slow reader never holds up
//! rendering. Jobs cannot be cancelled once started; drop the result
//! instead.

use std::any::Any;
use std::thread::{self, JoinHandle};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::fill::{FillOptions, FillOutput, Filler};
use crate::model::TemplateConfig;
use crate::render::{progress_channel, ProgressReceiver};

const WORKER_THREAD_NAME: &str = "flatfill-worker";

/// Everything a background fill needs, owned.
#[derive(Debug, Clone)]
pub struct FillRequest {
    pub template: Vec<u8>,
    pub config: TemplateConfig,
    pub data: Value,
    pub options: FillOptions,
}

impl FillRequest {
    pub fn new(template: Vec<u8>, config: TemplateConfig, data: Value) -> Self {
        Self {
            template,
            config,
            data,
            options: FillOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FillOptions) -> Self {
        self.options = options;
        self
    }
}

/// A running fill.
#[derive(Debug)]
pub struct FillJob {
    handle: JoinHandle<Result<FillOutput>>,
    progress: ProgressReceiver,
}

impl FillJob {
    /// Progress stream; ends when the job finishes.
    pub fn progress(&self) -> &ProgressReceiver {
        &self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the job and take its result.
    pub fn wait(self) -> Result<FillOutput> {
        self.handle.join().map_err(|panic| {
            Error::Worker(format!("fill worker panicked: {}", panic_message(&*panic)))
        })?
    }
}

/// Start a fill on a dedicated thread.
pub fn spawn_fill(request: FillRequest) -> Result<FillJob> {
    let (publisher, progress) = progress_channel();

    let handle = thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            let filler = Filler::with_options(request.options);
            let result = filler.fill_with_events(
                &request.template,
                &request.config,
                &request.data,
                |event| publisher.publish(event),
            );
            if let Err(e) = &result {
                log::debug!("Fill job failed: {}", e);
            }
            result
        })
        .map_err(|e| Error::Worker(format!("cannot start worker thread: {}", e)))?;

    Ok(FillJob { handle, progress })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
