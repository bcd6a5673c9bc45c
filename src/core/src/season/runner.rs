use crate::error::CompetitionResult;
use crate::r#match::{
    AttendanceContext, AttendanceModel, AttendancePrediction, MatchContext, MatchOutcome,
    MatchOutcomeGenerator, MatchSquad, PlayedMatch, ShootoutResult,
};
use crate::shared::{CompetitionKind, TeamRegistry};

/// Identifies a fixture to be played, independent of which engine owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRequest {
    pub competition: CompetitionKind,
    pub competition_id: u32,
    pub fixture_id: String,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub neutral_venue: bool,
}

impl MatchRequest {
    pub fn new(
        competition: CompetitionKind,
        competition_id: u32,
        fixture_id: impl Into<String>,
        home_team_id: u32,
        away_team_id: u32,
    ) -> Self {
        MatchRequest {
            competition,
            competition_id,
            fixture_id: fixture_id.into(),
            home_team_id,
            away_team_id,
            neutral_venue: false,
        }
    }

    pub fn neutral(mut self) -> Self {
        self.neutral_venue = true;
        self
    }
}

/// Borrowed pair of external collaborators used to play every AI fixture of a week.
pub struct MatchRunner<'a> {
    engine: &'a mut dyn MatchOutcomeGenerator,
    attendance: &'a dyn AttendanceModel,
}

impl<'a> MatchRunner<'a> {
    pub fn new(engine: &'a mut dyn MatchOutcomeGenerator, attendance: &'a dyn AttendanceModel) -> Self {
        MatchRunner { engine, attendance }
    }

    fn squads(&self, teams: &TeamRegistry, request: &MatchRequest) -> CompetitionResult<(MatchSquad, MatchSquad)> {
        let home = MatchSquad::from_team(teams.get(request.home_team_id)?);
        let away = MatchSquad::from_team(teams.get(request.away_team_id)?);
        Ok((home, away))
    }

    fn context(request: &MatchRequest) -> MatchContext {
        let ctx = MatchContext::regulation();
        if request.neutral_venue { ctx.neutral() } else { ctx }
    }

    /// Regulation time only.
    pub fn play(&mut self, teams: &TeamRegistry, request: &MatchRequest) -> CompetitionResult<PlayedMatch> {
        let (home, away) = self.squads(teams, request)?;
        let ctx = Self::context(request);
        let outcome = self.engine.simulate(&home, &away, &ctx);

        let mut played = PlayedMatch::new(
            request.competition,
            request.competition_id,
            request.fixture_id.clone(),
            request.home_team_id,
            request.away_team_id,
            outcome.home_score,
            outcome.away_score,
        );
        played.events = outcome.timeline;
        played.attendance = self.attendance_for(teams, request)?;

        Ok(played)
    }

    /// Gate forecast for a home fixture; neutral venues have none.
    pub fn attendance_for(&self, teams: &TeamRegistry, request: &MatchRequest) -> CompetitionResult<Option<AttendancePrediction>> {
        if request.neutral_venue {
            return Ok(None);
        }

        let home = teams.get(request.home_team_id)?;
        let away = teams.get(request.away_team_id)?;
        let ctx = AttendanceContext::new(home.reputation, away.reputation, request.competition);

        Ok(Some(self.attendance.predict_attendance(&ctx)))
    }

    /// Raw outcome for a match the caller controls, e.g. with the human club's
    /// chosen tactics in `ctx`.
    pub fn outcome(&mut self, teams: &TeamRegistry, home_team_id: u32, away_team_id: u32, ctx: &MatchContext) -> CompetitionResult<MatchOutcome> {
        let home = MatchSquad::from_team(teams.get(home_team_id)?);
        let away = MatchSquad::from_team(teams.get(away_team_id)?);
        Ok(self.engine.simulate(&home, &away, ctx))
    }

    /// Thirty extra minutes on top of a level match; goals and events are appended.
    pub fn extra_time(&mut self, teams: &TeamRegistry, request: &MatchRequest, played: &mut PlayedMatch) -> CompetitionResult<()> {
        let (home, away) = self.squads(teams, request)?;
        let ctx = Self::context(request).extra_time();
        let outcome = self.engine.simulate(&home, &away, &ctx);

        played.extra_time = true;
        played.home_score += outcome.home_score;
        played.away_score += outcome.away_score;
        played.events.extend(outcome.timeline);

        Ok(())
    }

    pub fn shootout(&mut self, teams: &TeamRegistry, home_team_id: u32, away_team_id: u32) -> CompetitionResult<ShootoutResult> {
        let home = MatchSquad::from_team(teams.get(home_team_id)?);
        let away = MatchSquad::from_team(teams.get(away_team_id)?);
        Ok(self.engine.penalty_shootout(&home, &away))
    }

    /// Friendly against an opponent that has no roster in the registry.
    pub fn play_synthetic(&mut self, home: &MatchSquad, away: &MatchSquad) -> PlayedMatch {
        let outcome = self.engine.simulate(home, away, &MatchContext::regulation());

        let mut played = PlayedMatch::new(
            CompetitionKind::Friendly,
            0,
            format!("friendly-{}-{}", home.team_name, away.team_name),
            home.team_id,
            away.team_id,
            outcome.home_score,
            outcome.away_score,
        );
        played.events = outcome.timeline;
        played
    }
}
