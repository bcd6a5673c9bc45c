use chrono::{Duration, NaiveDate};

/// Explicit "where are we in the season" value threaded through every engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonContext {
    pub year: u16,
    pub week: u16,
    pub season_start: NaiveDate,
    pub human_team_id: Option<u32>,
}

impl SeasonContext {
    pub fn new(year: u16, season_start: NaiveDate) -> Self {
        SeasonContext {
            year,
            week: 0,
            season_start,
            human_team_id: None,
        }
    }

    pub fn with_human_team(mut self, team_id: u32) -> Self {
        self.human_team_id = Some(team_id);
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.season_start + Duration::weeks(self.week as i64)
    }

    pub fn next_week(&mut self) {
        self.week += 1;
    }

    pub fn is_human(&self, team_id: u32) -> bool {
        self.human_team_id == Some(team_id)
    }

    pub fn involves_human(&self, home_team_id: u32, away_team_id: u32) -> bool {
        self.is_human(home_team_id) || self.is_human(away_team_id)
    }

    /// Context for the season that follows: same weekday one year on, week counter reset.
    pub fn for_next_season(&self) -> Self {
        SeasonContext {
            year: self.year + 1,
            week: 0,
            season_start: self.season_start + Duration::weeks(52),
            human_team_id: self.human_team_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_follows_week() {
        let start = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
        let mut ctx = SeasonContext::new(2025, start);
        assert_eq!(ctx.date(), start);

        ctx.next_week();
        ctx.next_week();
        assert_eq!(ctx.date(), NaiveDate::from_ymd_opt(2025, 8, 16).unwrap());
    }

    #[test]
    fn test_next_season_keeps_human_team() {
        let start = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
        let mut ctx = SeasonContext::new(2025, start).with_human_team(7);
        ctx.week = 40;

        let next = ctx.for_next_season();
        assert_eq!(next.year, 2026);
        assert_eq!(next.week, 0);
        assert!(next.is_human(7));
        assert!(!next.is_human(8));
    }
}
