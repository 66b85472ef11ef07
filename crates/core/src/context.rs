//! Analysis Context
//!
//! The per-run, read-only context handed to every tool invocation:
//! the dataset, its profile, and where artifacts go.
//!
//! Tools receive `&AnalysisContext` and only get shared references out of it,
//! so a tool cannot mutate what later steps will see.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::dataset::Dataset;
use crate::profile::DatasetProfile;

/// Dataset plus profile for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    run_id: String,
    question: String,
    dataset: Arc<Dataset>,
    profile: Arc<DatasetProfile>,
    artifacts_dir: PathBuf,
}

impl AnalysisContext {
    /// Create a context, deriving the profile from the dataset.
    pub fn new(
        run_id: impl Into<String>,
        dataset: Arc<Dataset>,
        artifacts_dir: impl Into<PathBuf>,
    ) -> Self {
        let profile = Arc::new(DatasetProfile::from_dataset(&dataset));
        Self::with_profile(run_id, dataset, profile, artifacts_dir)
    }

    /// Create a context with a precomputed profile.
    pub fn with_profile(
        run_id: impl Into<String>,
        dataset: Arc<Dataset>,
        profile: Arc<DatasetProfile>,
        artifacts_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            question: String::new(),
            dataset,
            profile,
            artifacts_dir: artifacts_dir.into(),
        }
    }

    /// Attach the question being answered.
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }

    /// Unique identifier of the analysis run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Directory where tools write artifacts.
    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn profile(&self) -> &DatasetProfile {
        &self.profile
    }
}
