// Library root: the league engine. Maps raw sheets onto a fixed schema, parses
// scorer fields, aggregates standings, normalizes attendance and derives
// per-player metrics. Pure computation; sourcing and rendering live elsewhere.

pub mod attendance;
pub mod league;
pub mod metrics;
pub mod schema;
pub mod scorer;
pub mod standings;
pub mod views;

pub use league::{compute_league_state, LeagueOptions, LeagueState};
