//! Word 97-2003 (`.doc`) text extraction through an external decoder.
//!
//! The binary `.doc` format is not parsed in-process. Instead the extractor
//! is handed an optional [`LegacyDocDecoder`] capability; when none is
//! configured (or `antiword` is not installed) `.doc` uploads fail with
//! [`ExtractionError::LegacyUnavailable`] and every other format keeps
//! working.

use crate::config::LegacyDecoderChoice;
use crate::error::ExtractionError;
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// OLE2 / Compound File Binary signature that every `.doc` starts with.
const CFB_MAGIC_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// A decoder able to turn legacy `.doc` bytes into plain text.
#[async_trait]
pub trait LegacyDocDecoder: Send + Sync {
    /// Short name for logs, e.g. `"antiword"`.
    fn name(&self) -> &str;

    /// Decode the document. Any error is reported to the user verbatim.
    async fn decode(&self, bytes: &[u8]) -> io::Result<String>;
}

/// Runs the `antiword` program on a temporary copy of the document.
#[derive(Debug, Clone)]
pub struct AntiwordDecoder {
    program: PathBuf,
}

impl AntiwordDecoder {
    /// Use an explicit `antiword` executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find `antiword` on `PATH`.
    pub fn detect() -> Option<Self> {
        match which::which("antiword") {
            Ok(program) => {
                debug!("Found antiword at {}", program.display());
                Some(Self { program })
            }
            Err(_) => None,
        }
    }
}

#[async_trait]
impl LegacyDocDecoder for AntiwordDecoder {
    fn name(&self) -> &str {
        "antiword"
    }

    async fn decode(&self, bytes: &[u8]) -> io::Result<String> {
        verify_cfb_signature(bytes)?;

        // `tmp` is deleted when it goes out of scope, whatever antiword does.
        let tmp = tempfile::Builder::new().suffix(".doc").tempfile()?;
        tokio::fs::write(tmp.path(), bytes).await?;

        let output = tokio::process::Command::new(&self.program)
            .arg("-m")
            .arg("UTF-8.txt")
            .arg(tmp.path())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(io::Error::other(format!(
                "antiword exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Reject bytes that cannot be a Word 97-2003 file before spawning anything.
fn verify_cfb_signature(bytes: &[u8]) -> io::Result<()> {
    if bytes.len() < CFB_MAGIC_SIGNATURE.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "file too small to be a valid .doc file",
        ));
    }
    let actual = &bytes[..CFB_MAGIC_SIGNATURE.len()];
    if actual != CFB_MAGIC_SIGNATURE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "invalid .doc signature: expected {CFB_MAGIC_SIGNATURE:02X?}, got {actual:02X?}"
            ),
        ));
    }
    Ok(())
}

/// Turn the configured choice into a decoder, if one is available.
pub fn resolve_legacy_decoder(choice: &LegacyDecoderChoice) -> Option<Arc<dyn LegacyDocDecoder>> {
    match choice {
        LegacyDecoderChoice::Auto => {
            AntiwordDecoder::detect().map(|d| Arc::new(d) as Arc<dyn LegacyDocDecoder>)
        }
        LegacyDecoderChoice::Disabled => None,
        LegacyDecoderChoice::Custom(decoder) => Some(Arc::clone(decoder)),
    }
}

/// Extract text from `.doc` bytes with the given decoder capability.
pub async fn extract_legacy(
    bytes: &[u8],
    decoder: Option<&dyn LegacyDocDecoder>,
) -> Result<String, ExtractionError> {
    let Some(decoder) = decoder else {
        warn!("No legacy .doc decoder available");
        return Err(ExtractionError::LegacyUnavailable);
    };

    debug!("Decoding .doc with {}", decoder.name());
    decoder
        .decode(bytes)
        .await
        .map_err(|e| ExtractionError::LegacyFailed {
            detail: e.to_string(),
        })
}
