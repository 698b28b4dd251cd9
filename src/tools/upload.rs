//! Upload planning for remote deployments

use crate::core::{step::RemoteUpload, StepError};
use crate::tools::{sources, UploadRequest};
use std::path::Path;

/// Expand every mapping of `upload` into per-file requests.
///
/// Each mapping's glob is matched from the project root; a file lands at the
/// mapping's remote prefix followed by its file name. Individual mappings may
/// match nothing, but the upload as a whole must match something.
pub fn plan(root: &Path, upload: &RemoteUpload) -> Result<Vec<UploadRequest>, StepError> {
    let mut requests = Vec::new();

    for mapping in &upload.uploads {
        let matched = sources::collect(root, std::slice::from_ref(&mapping.src), None, None)?;
        for source in matched {
            let name = source
                .relative
                .rsplit('/')
                .next()
                .unwrap_or(&source.relative);
            let prefix = if mapping.dest.ends_with('/') {
                mapping.dest.clone()
            } else {
                format!("{}/", mapping.dest)
            };
            requests.push(UploadRequest {
                file: source.path,
                bucket: upload.bucket.clone(),
                dest: format!("{}{}", prefix, name),
                access: upload.access.clone(),
            });
        }
    }

    if requests.is_empty() {
        return Err(StepError::NoSources {
            patterns: upload.uploads.iter().map(|m| m.src.clone()).collect(),
        });
    }

    Ok(requests)
}
