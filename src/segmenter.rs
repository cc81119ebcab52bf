//! The external segmentation boundary.
//!
//! Foreground/background separation is delegated to an opaque external
//! capability: given encoded image bytes, it returns encoded image bytes
//! whose alpha channel marks foreground (opaque) vs. background
//! (transparent). The [`Segmenter`] trait captures exactly that shape so the
//! extraction engine and its tests never depend on a concrete model.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// An external object-segmentation capability.
///
/// Implementations receive an encoded still image (the engine always sends
/// PNG) and must return encoded bytes in a format that supports an alpha
/// channel, with foreground fully opaque and background fully transparent.
/// The call is blocking; callers needing timeouts or cancellation wrap it
/// themselves.
pub trait Segmenter: Send + Sync {
    /// Segment the given encoded image, returning encoded output bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Segmentation`] if the capability fails or rejects
    /// the input.
    fn segment(&self, image_bytes: &[u8]) -> Result<Vec<u8>>;
}

/// Closures can act as segmenters, which keeps test doubles trivial.
impl<F> Segmenter for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync,
{
    fn segment(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        self(image_bytes)
    }
}

/// A segmenter that pipes the image through an external filter process.
///
/// The process receives the encoded image on stdin and must write the
/// segmented image to stdout (e.g. `rembg i` or any equivalent tool). A
/// non-zero exit status or empty output is reported as
/// [`Error::Segmentation`].
#[derive(Debug, Clone)]
pub struct CommandSegmenter {
    program: String,
    args: Vec<String>,
}

impl CommandSegmenter {
    /// Create a segmenter invoking `program` with the given arguments.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parse a whitespace-separated command line, e.g. `"rembg i"`.
    ///
    /// No shell quoting is interpreted; the first token is the program and
    /// the rest are passed as arguments verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Segmentation`] if the command line is empty.
    pub fn from_command_line(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace().map(str::to_string);
        let program = tokens
            .next()
            .ok_or_else(|| Error::Segmentation("empty segmenter command".to_string()))?;
        Ok(Self {
            program,
            args: tokens.collect(),
        })
    }
}

impl Segmenter for CommandSegmenter {
    fn segment(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Segmentation(format!("failed to spawn {}: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Segmentation("failed to open segmenter stdin".to_string()))?;

        // Feed stdin from a separate thread while draining stdout, so a
        // filter that writes before consuming all input cannot deadlock.
        let (write_result, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || {
                let res = stdin.write_all(image_bytes);
                drop(stdin);
                res
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output =
            output.map_err(|e| Error::Segmentation(format!("segmenter I/O failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Segmentation(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        // A broken pipe from a filter that stopped reading early is fine as
        // long as it exited successfully; any other write failure is not.
        if let Ok(Err(e)) = write_result {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(Error::Segmentation(format!(
                    "failed to write to segmenter stdin: {e}"
                )));
            }
        }

        if output.stdout.is_empty() {
            return Err(Error::Segmentation(format!(
                "{} produced no output",
                self.program
            )));
        }

        Ok(output.stdout)
    }
}
