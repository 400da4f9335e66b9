use crate::config::Config;
use crate::db::SubmissionStore;
use crate::execution::Executor;
use crate::judge::Judge;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub judge: Arc<dyn Judge>,
    pub store: Arc<dyn SubmissionStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn executor(&self) -> Executor {
        Executor::new(self.judge.clone(), self.store.clone())
    }
}
