use crate::{
    api::{ApiError, FetchConfig, Transport},
    model::curve::LinearCurve
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
    time::Duration
};

pub const TEST_API_ROOT: &str = "http://test";

/// In-memory [`Transport`] answering from per-path queues of canned responses.
/// Paths are relative to [`TEST_API_ROOT`].
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<String, String>>>>,
    requests: Mutex<Vec<String>>
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, body: impl Into<String>) {
        self.push(path, Ok(body.into()));
    }

    pub fn fail(&self, path: &str, reason: &str) {
        self.push(path, Err(reason.to_string()));
    }

    /// Every url requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, path: &str, response: Result<String, String>) {
        self.responses
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }
}

impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<String, ApiError> {
        self.requests.lock().unwrap().push(url.to_string());

        let path = url.strip_prefix(TEST_API_ROOT).unwrap_or(url);
        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(|queue| queue.pop_front());

        match next {
            Some(Ok(body)) => Ok(body),
            Some(Err(reason)) => Err(ApiError::transport(url, reason)),
            None => Err(ApiError::transport(url, format!("no scripted response for {}", path)))
        }
    }
}

pub fn test_config() -> FetchConfig {
    FetchConfig {
        api_root: TEST_API_ROOT.to_string(),
        requests_per_second: 2.0,
        max_attempts: 3,
        retry_delay: Duration::from_secs(5)
    }
}

pub fn leaderboard_ids(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}{}", prefix, i)).collect()
}

pub fn ranked_list_body(pool: &str, ids: &[String]) -> String {
    json!({
        "_id": pool,
        "accumulation_constant": 0.94,
        "cr_curve": {"type": "basic", "baseline": 78, "cutoff": 0.5, "exponential": 2.5},
        "leaderboard_id_list": ids
    })
    .to_string()
}

pub fn leaderboard_info_body(name: &str, notes: i32, pool: &str, forced_star_rating: f64) -> String {
    json!({
        "name": name,
        "notes": notes,
        "forced_star_rating": { pool: forced_star_rating }
    })
    .to_string()
}

/// Score list whose first entry holds `score` and `cr` in `pool`
pub fn scores_body(score: i64, pool: &str, cr: f64) -> String {
    json!([
        { "cr": { pool: cr }, "score": score },
        { "cr": { pool: cr / 2.0 }, "score": score / 2 }
    ])
    .to_string()
}

/// Valid linear curve with up to `n_points` points (at least the two
/// endpoints), with ascending x and non-decreasing y.
pub fn random_linear_curve(seed: u64, n_points: usize) -> LinearCurve {
    if n_points < 2 {
        panic!("A linear curve needs at least 2 points");
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let inner = n_points - 2;

    let mut xs: Vec<f64> = (0..inner).map(|_| rng.random_range(0.01..0.99)).collect();
    let mut ys: Vec<f64> = (0..inner).map(|_| rng.random_range(0.0..=1.0)).collect();
    xs.sort_by(|a, b| a.total_cmp(b));
    xs.dedup();
    ys.sort_by(|a, b| a.total_cmp(b));

    let mut points = vec![[0.0, 0.0]];
    points.extend(xs.into_iter().zip(ys).map(|(x, y)| [x, y]));
    points.push([1.0, 1.0]);

    LinearCurve::new(points).unwrap()
}
