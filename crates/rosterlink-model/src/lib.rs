#![deny(unsafe_code)]

pub mod dataset;
pub mod mapping;

pub use dataset::{CellValue, Dataset, Record};
pub use mapping::{ConfirmedMapping, MatchCandidate};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_mapping_round_trips_through_json() {
        let mut mapping = ConfirmedMapping::new("physical", "wyscout");
        mapping
            .matches
            .insert("Mo Salah".to_string(), "Mohamed Salah".to_string());
        mapping.rejected.push("Unknown Trialist".to_string());

        let json = serde_json::to_string(&mapping).expect("serialize mapping");
        let round: ConfirmedMapping = serde_json::from_str(&json).expect("deserialize mapping");
        assert_eq!(round, mapping);
        assert_eq!(round.target_for("Mo Salah"), Some("Mohamed Salah"));
    }

    #[test]
    fn candidate_serializes_score() {
        let candidate = MatchCandidate {
            source_name: "Joao Felix".to_string(),
            target_name: "João Félix".to_string(),
            score: 1.0,
        };
        let json = serde_json::to_string(&candidate).expect("serialize candidate");
        assert!(json.contains("\"score\":1.0"));
    }
}
