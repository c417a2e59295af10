//! Fallback Bundle Staging
//!
//! Fallback paywall content arrives at initialization either as a reference
//! to an already-bundled file or as an inline JSON string. Either way it is
//! written once to a fixed location on disk, where the paywall engine (not
//! this bridge) reads it when live content is unavailable.

use std::path::{Path, PathBuf};

use tracing::debug;

use bridge_types::error::{BridgeError, Result};
use bridge_types::FallbackSource;

const FALLBACK_FILE_NAME: &str = "helium-fallback.json";

/// Stage the fallback bundle into `data_dir` and return the staged path.
pub async fn stage_fallback_bundle(data_dir: &Path, source: &FallbackSource) -> Result<PathBuf> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(BridgeError::Io)?;

    let destination = data_dir.join(FALLBACK_FILE_NAME);
    match source {
        FallbackSource::File(reference) => {
            let source_path = strip_file_scheme(reference);
            tokio::fs::copy(&source_path, &destination)
                .await
                .map_err(BridgeError::Io)?;
            debug!(from = %source_path.display(), to = %destination.display(), "Staged fallback bundle from file");
        }
        FallbackSource::Inline(json) => {
            tokio::fs::write(&destination, json.as_bytes())
                .await
                .map_err(BridgeError::Io)?;
            debug!(to = %destination.display(), bytes = json.len(), "Staged inline fallback bundle");
        }
    }

    Ok(destination)
}

/// Host runtimes hand file references over as `file://` URL strings.
fn strip_file_scheme(reference: &str) -> PathBuf {
    PathBuf::from(reference.strip_prefix("file://").unwrap_or(reference))
}
