//! Writing a finished article to disk.

use std::path::Path;

use serde::Serialize;

use crate::error::ExportError;
use crate::jobs::Job;
use crate::seo::GeneratedArticle;

/// On-disk shape of an exported article.
#[derive(Debug, Serialize)]
pub struct ArticleExport<'a> {
    pub job_id: &'a str,
    pub topic: &'a str,
    pub article: &'a GeneratedArticle,
}

impl<'a> ArticleExport<'a> {
    pub fn from_job(job: &'a Job) -> Result<Self, ExportError> {
        let article = job
            .article()
            .ok_or_else(|| ExportError::NotCompleted(job.id.clone()))?;
        Ok(Self {
            job_id: &job.id,
            topic: job.topic(),
            article,
        })
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Writes the job's article as pretty JSON, creating parent directories.
pub fn export_article(job: &Job, path: &Path) -> Result<(), ExportError> {
    let json = ArticleExport::from_job(job)?.to_json()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ExportError::WriteFile {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    std::fs::write(path, json).map_err(|e| ExportError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::info!("Article for job {} written to {}", job.id, path.display());
    Ok(())
}
