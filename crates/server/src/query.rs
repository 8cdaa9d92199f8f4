use std::sync::Arc;

use log::debug;
use toplist_core::{error::TopListResult, leaderboard::Leaderboard};

use crate::store::ScoreStore;

/// Runs the "top N by score" read and ranks what comes back.
#[derive(Clone)]
pub struct RankedQueryService {
    store: Arc<dyn ScoreStore>,
}

impl RankedQueryService {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store }
    }

    pub fn fetch_top(&self, limit: usize) -> TopListResult<Leaderboard> {
        let records = self.store.top_scores(limit)?;
        debug!("Fetched {} score records (limit {limit})", records.len());
        Ok(Leaderboard::ranked(records, limit))
    }
}
