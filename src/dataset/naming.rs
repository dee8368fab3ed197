//! Output file naming.
//!
//! ```text
//! {output_dir}/{label}_{index}.{ext}     clips   (index from 1)
//! {output_dir}/silence_{index}.{ext}     silence (index from 1)
//! ```
//!
//! The directory listing is the dataset index; no manifest is written.

use std::path::{Component, Path, PathBuf};

use super::GenerateError;

/// File-name stem shared by every silence clip.
pub const SILENCE_STEM: &str = "silence";

pub fn clip_path(output_dir: &Path, label: &str, index: usize, ext: &str) -> PathBuf {
    output_dir.join(format!("{label}_{index}.{ext}"))
}

pub fn silence_path(output_dir: &Path, index: usize, ext: &str) -> PathBuf {
    output_dir.join(format!("{SILENCE_STEM}_{index}.{ext}"))
}

/// A label must map to a single plain file-name component.
pub fn validate_label(label: &str) -> Result<(), GenerateError> {
    let mut components = Path::new(label).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if label.trim().is_empty() || !single_normal || label.contains(|c: char| c == '/' || c == '\\') {
        return Err(GenerateError::InvalidLabel(label.to_string()));
    }
    Ok(())
}
