//! Scripted provider and sample data shared by the integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dataplan::AppConfig;
use dataplan_core::Dataset;
use dataplan_llm::{LlmError, LlmProvider, LlmResult};

/// Replies with queued responses in order and records every prompt.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, prompt: &str) -> LlmResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::EmptyResponse {
                provider: "scripted".to_string(),
            })
    }
}

pub const SAMPLE_CSV: &str = "\
age,income,gender,region
23,31,f,n
35,48,m,s
31,45,f,e
47,70,m,n
52,81,f,s
29,39,m,e
41,55,f,n
38,52,m,s
26,34,f,e
60,90,m,w
";

pub fn sample_dataset() -> Arc<Dataset> {
    let (header, rows) = dataplan::datasets::parse_csv(SAMPLE_CSV).unwrap();
    Arc::new(Dataset::from_records(header, rows).unwrap())
}

/// Config writing logs and artifacts under `dir`.
pub fn test_config(dir: &std::path::Path) -> AppConfig {
    AppConfig {
        logs_dir: dir.join("logs"),
        artifacts_dir: dir.join("artifacts"),
        ..Default::default()
    }
}
