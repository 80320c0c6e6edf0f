mod competitor;
mod race;
mod score;
mod score_code;
mod scoring_system;
mod series;
mod series_results;

pub use competitor::Competitor;
pub use race::{Race, RaceStatus};
pub use score::Score;
pub use score_code::ScoreCode;
pub use scoring_system::ScoringSystem;
pub use series::{Series, SeriesType, TrendOption};
pub use series_results::{
    CompetitorStanding, RaceScore, ResultsSnapshot, ScoredRace, SeriesResults,
};
