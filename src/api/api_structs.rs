use serde::Deserialize;
use std::collections::HashMap;

/// One page of a pool's ranked list.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RankedList {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub accumulation_constant: f64,
    /// The pool's current curve, kept raw. It may use curve types this tool
    /// cannot evaluate, and is only reported.
    #[serde(default)]
    pub cr_curve: Option<serde_json::Value>,
    pub leaderboard_id_list: Vec<String>
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LeaderboardInfo {
    #[serde(default)]
    pub name: String,
    pub notes: i32,
    /// Pool name -> star rating currently forced on this leaderboard
    #[serde(default)]
    pub forced_star_rating: HashMap<String, f64>
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Score {
    /// Pool name -> CR this score earns in that pool
    #[serde(default)]
    pub cr: HashMap<String, f64>,
    pub score: i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ranked_list() {
        let json = r#"{
            "_id": "poodles",
            "accumulation_constant": 0.94,
            "cr_curve": {"type": "basic", "baseline": 78, "cutoff": 0.5, "exponential": 2.5},
            "leaderboard_id_list": ["a|_Expert_Standard", "b|_Hard_Standard"]
        }"#;

        let list: RankedList = serde_json::from_str(json).unwrap();
        assert_eq!(list.id, "poodles");
        assert_eq!(list.leaderboard_id_list.len(), 2);
        assert_eq!(list.cr_curve.unwrap()["type"], "basic");
    }

    #[test]
    fn test_decode_ranked_list_unknown_curve() {
        let json = r#"{"_id": "p", "cr_curve": {"type": "sigmoid", "a": 1}, "leaderboard_id_list": []}"#;
        let list: RankedList = serde_json::from_str(json).unwrap();

        assert!(list.leaderboard_id_list.is_empty());
    }

    #[test]
    fn test_decode_leaderboard_info() {
        let json = r#"{"name": "Song", "notes": 812, "forced_star_rating": {"poodles": 9.35}, "extra": true}"#;
        let info: LeaderboardInfo = serde_json::from_str(json).unwrap();

        assert_eq!(info.notes, 812);
        assert_eq!(info.forced_star_rating.get("poodles"), Some(&9.35));
    }

    #[test]
    fn test_decode_scores() {
        let json = r#"[{"cr": {"poodles": 412.5, "bside": 12.0}, "score": 700123}, {"cr": {}, "score": 5}]"#;
        let scores: Vec<Score> = serde_json::from_str(json).unwrap();

        assert_eq!(scores[0].score, 700123);
        assert_eq!(scores[0].cr["poodles"], 412.5);
        assert!(scores[1].cr.is_empty());
    }
}
