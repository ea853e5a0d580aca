//! Saving analyses to disk
//!
//! Reports go to the Documents folder by default
//! (`~/Documents/MatchVision/analyses`), or to a directory given on the
//! command line. Nothing is saved unless the user asks for it.

pub(crate) mod pdf;

use crate::analysis::AnalysisResult;
use crate::error::ExportError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default analyses directory
pub(crate) fn default_reports_dir() -> Option<PathBuf> {
    dirs::document_dir().map(|d| d.join("MatchVision").join("analyses"))
}

/// Ensure the directory exists
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| ExportError::CreateDirectory {
            path: dir.to_path_buf(),
            source: e,
        })?;
        info!("Created reports directory: {:?}", dir);
    }
    Ok(())
}

/// File name for a report, derived from the clip name and analysis time.
fn report_file_name(result: &AnalysisResult, video_name: &str) -> String {
    let stem = Path::new(video_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let slug: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let timestamp = result.timestamp.format("%Y-%m-%d-%H-%M-%S");

    if slug.is_empty() {
        format!("analysis-{}.md", timestamp)
    } else {
        format!("analysis-{}-{}.md", slug, timestamp)
    }
}

/// Save an analysis as a markdown report.
///
/// Uses `dir` when given, otherwise the default reports directory. Returns
/// the path of the written file.
pub(crate) fn save_report(
    result: &AnalysisResult,
    video_name: &str,
    dir: Option<&Path>,
) -> Result<PathBuf, ExportError> {
    if result.markdown.trim().is_empty() {
        return Err(ExportError::EmptyAnalysis);
    }

    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => default_reports_dir().ok_or(ExportError::NoDocumentsDir)?,
    };
    ensure_dir(&dir)?;

    let filepath = dir.join(report_file_name(result, video_name));
    let mut file = fs::File::create(&filepath).map_err(|e| ExportError::CreateFile {
        path: filepath.clone(),
        source: e,
    })?;

    let header = format!(
        "<!-- clip: {} | analyzed: {} -->\n\n",
        video_name,
        result.timestamp.to_rfc3339()
    );
    file.write_all(header.as_bytes())
        .and_then(|_| file.write_all(result.markdown.as_bytes()))
        .and_then(|_| file.flush())
        .map_err(|e| ExportError::WriteFile {
            path: filepath.clone(),
            source: e,
        })?;

    info!("Saved analysis to: {:?}", filepath);
    Ok(filepath)
}
