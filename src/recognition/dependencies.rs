use std::{
    fmt,
    io::{Cursor, Write},
    process::{Command, Stdio},
    sync::{Arc, OnceLock},
};

use image::{GrayImage, ImageFormat};

use crate::{config::RecognitionConfig, recognition::types::RecognitionError};

/// Abstraction over the text-recognition oracle.
///
/// Receives the binarized snapshot (black ink on a white background) and
/// returns zero or more text fragments.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &GrayImage) -> Result<Vec<String>, RecognitionError>;
}

/// Builds the recognizer the first time it is needed.
pub type RecognizerFactory =
    Box<dyn Fn() -> Result<Arc<dyn TextRecognizer>, RecognitionError> + Send + Sync>;

/// Lazily constructed, then shared recognizer.
///
/// The factory runs on the first request. A successful result is kept for the
/// lifetime of the handle; a failure is returned and retried next time.
pub struct RecognizerHandle {
    factory: RecognizerFactory,
    instance: OnceLock<Arc<dyn TextRecognizer>>,
}

impl fmt::Debug for RecognizerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognizerHandle")
            .field("initialized", &self.instance.get().is_some())
            .finish()
    }
}

impl RecognizerHandle {
    pub fn new(factory: RecognizerFactory) -> Self {
        Self {
            factory,
            instance: OnceLock::new(),
        }
    }

    /// Wraps an already constructed recognizer.
    pub fn ready(recognizer: Arc<dyn TextRecognizer>) -> Self {
        let instance = OnceLock::new();
        let _ = instance.set(Arc::clone(&recognizer));
        Self {
            factory: Box::new(move || Ok(Arc::clone(&recognizer))),
            instance,
        }
    }

    /// Handle for the external OCR command in `config`.
    pub fn from_config(config: &RecognitionConfig) -> Self {
        let program = config.command.clone();
        let args = config.args.clone();
        Self::new(Box::new(move || {
            log::info!("Initializing text recognizer: {} {:?}", program, args);
            let recognizer: Arc<dyn TextRecognizer> =
                Arc::new(CommandRecognizer::new(program.clone(), args.clone())?);
            Ok(recognizer)
        }))
    }

    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Returns the shared recognizer, constructing it on first use.
    pub fn get(&self) -> Result<Arc<dyn TextRecognizer>, RecognitionError> {
        if let Some(existing) = self.instance.get() {
            return Ok(Arc::clone(existing));
        }
        let created = (self.factory)()?;
        Ok(Arc::clone(self.instance.get_or_init(|| created)))
    }
}

/// Recognizer that shells out to an OCR command.
///
/// The PNG-encoded image is written to the command's stdin. Every non-empty
/// line of its stdout becomes one fragment.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(program: String, args: Vec<String>) -> Result<Self, RecognitionError> {
        if program.trim().is_empty() {
            return Err(RecognitionError::Unavailable(
                "no recognizer command configured".to_string(),
            ));
        }
        Ok(Self { program, args })
    }
}

impl TextRecognizer for CommandRecognizer {
    fn recognize(&self, image: &GrayImage) -> Result<Vec<String>, RecognitionError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RecognitionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Write image data to stdin, then close it so the command sees EOF.
        // The child is reaped even when it stops reading early.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(RecognitionError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if let Err(err) = written {
            log::warn!("{} exited before reading the whole image: {}", self.program, err);
            return Err(err.into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}
