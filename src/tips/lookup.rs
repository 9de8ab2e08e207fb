//! Team name to fixture identifiers.

use crate::feed::types::Fixture;

/// Identifiers found for a team in today's fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamMatch {
    /// Id of the team that was looked up.
    pub team_id: Option<u64>,
    /// Id of its opponent in the same fixture.
    pub opponent_id: Option<u64>,
    /// League of the fixture.
    pub league_id: Option<u64>,
}

/// Find the first fixture where `team_name` plays, home or away.
///
/// Names are compared case-insensitively but otherwise exactly; the odds and
/// fixtures providers spell some clubs differently, and those simply miss.
pub fn lookup_team(team_name: &str, fixtures: &[Fixture]) -> Option<TeamMatch> {
    let wanted = team_name.to_lowercase();

    fixtures.iter().find_map(|fixture| {
        if fixture.home.name.to_lowercase() == wanted {
            Some(TeamMatch {
                team_id: fixture.home.id,
                opponent_id: fixture.away.id,
                league_id: fixture.league_id,
            })
        } else if fixture.away.name.to_lowercase() == wanted {
            Some(TeamMatch {
                team_id: fixture.away.id,
                opponent_id: fixture.home.id,
                league_id: fixture.league_id,
            })
        } else {
            None
        }
    })
}
