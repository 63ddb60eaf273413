// ABOUTME: Canonical image record.
// ABOUTME: Repo tags are normalized so dangling entries never surface.

use crate::types::ImageId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Image {
    pub id: ImageId,
    pub repo_tags: Vec<String>,
    /// Creation time in unix seconds.
    pub created: i64,
    /// Size in bytes.
    pub size: u64,
}

impl Image {
    /// Whether this image is the one a container was created from.
    ///
    /// Matches on digest prefixes in either direction, or on the container's
    /// image reference appearing among the repo tags.
    pub fn is_used_by(&self, image_id: &str, image_ref: &str) -> bool {
        let ours = self.id.digest();
        let theirs = image_id.strip_prefix("sha256:").unwrap_or(image_id);
        if !ours.is_empty() && !theirs.is_empty() && (ours.starts_with(theirs) || theirs.starts_with(ours)) {
            return true;
        }

        if image_ref.is_empty() {
            return false;
        }
        let latest = (!has_tag(image_ref)).then(|| format!("{image_ref}:latest"));
        self.repo_tags
            .iter()
            .any(|t| t == image_ref || latest.as_deref() == Some(t.as_str()))
    }
}

/// True when the reference carries an explicit tag or digest.
fn has_tag(reference: &str) -> bool {
    if reference.contains('@') {
        return true;
    }
    let last = reference.rsplit('/').next().unwrap_or(reference);
    last.contains(':')
}

/// Drop empty and dangling (`<none>`) tags while keeping order.
pub fn normalize_repo_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.into();
        let tag = tag.trim();
        if tag.is_empty() || tag.contains("<none>") {
            continue;
        }
        if !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
