//! Document ingestion: files to write-path runs

use crate::error::{PipelineError, PipelineResult};
use crate::report::WriteReport;
use crate::write::WritePipeline;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Converts a document into plain text
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> PipelineResult<String>;
}

/// Reads files as UTF-8 text
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> PipelineResult<String> {
        std::fs::read_to_string(path).map_err(|e| PipelineError::Extraction {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Whether `path` has one of `extensions` (case-insensitive, leading dot optional).
/// An empty list accepts everything.
fn has_accepted_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|accepted| accepted.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Expand `paths` into a sorted, de-duplicated file list.
///
/// Directories are walked recursively and filtered by extension; files named
/// explicitly are always kept. A path that does not exist is an error.
pub fn collect_files(paths: &[PathBuf], extensions: &[String]) -> PipelineResult<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for path in paths {
        if path.is_file() {
            files.insert(path.clone());
            continue;
        }
        if !path.is_dir() {
            return Err(PipelineError::InvalidInput(format!(
                "Path not found: {}",
                path.display()
            )));
        }

        let pattern = path.join("**").join("*");
        let pattern = pattern.to_string_lossy();
        let entries = glob::glob(&pattern)
            .map_err(|e| PipelineError::InvalidInput(format!("Invalid glob pattern: {}", e)))?;
        for entry in entries {
            match entry {
                Ok(file) if file.is_file() && has_accepted_extension(&file, extensions) => {
                    files.insert(file);
                }
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable path: {}", e),
            }
        }
    }

    Ok(files.into_iter().collect())
}

/// Runs the write path once per document
pub struct FileIngestor<'a> {
    pipeline: &'a WritePipeline,
    extractor: Box<dyn TextExtractor>,
}

impl<'a> FileIngestor<'a> {
    pub fn new(pipeline: &'a WritePipeline) -> Self {
        Self {
            pipeline,
            extractor: Box::new(PlainTextExtractor),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Ingest one file. Every failure becomes a failed report naming the
    /// file; nothing is synthesized for a file with no text.
    pub async fn ingest_file(&self, path: &Path) -> WriteReport {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let text = match self.extractor.extract(path) {
            Ok(text) => text,
            Err(e) => return WriteReport::failed(Some(file_name), e.to_string()),
        };
        if text.trim().is_empty() {
            return WriteReport::failed(Some(file_name), "No text content extracted");
        }
        log::debug!("Extracted {} characters from {}", text.len(), file_name);

        match self.pipeline.run(&text, Some(&file_name)).await {
            Ok(report) => report,
            Err(e) => {
                log::warn!("Ingestion of {} failed: {}", file_name, e);
                WriteReport::failed(Some(file_name), e.to_string())
            }
        }
    }

    /// Ingest files one at a time; one report per file, in order
    pub async fn ingest_files(&self, files: &[PathBuf]) -> Vec<WriteReport> {
        let mut reports = Vec::with_capacity(files.len());
        for file in files {
            reports.push(self.ingest_file(file).await);
        }
        reports
    }

    /// Expand `paths` and ingest every matching file
    pub async fn ingest_paths(
        &self,
        paths: &[PathBuf],
        extensions: &[String],
    ) -> PipelineResult<Vec<WriteReport>> {
        let files = collect_files(paths, extensions)?;
        Ok(self.ingest_files(&files).await)
    }
}

#[cfg(test)]
#[path = "document_test.rs"]
mod tests;
