use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const FORM_LENGTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

impl FormResult {
    pub fn from_goals(goals_for: u8, goals_against: u8) -> Self {
        match goals_for.cmp(&goals_against) {
            std::cmp::Ordering::Greater => FormResult::Win,
            std::cmp::Ordering::Equal => FormResult::Draw,
            std::cmp::Ordering::Less => FormResult::Loss,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
        }
    }
}

/// Current run of identical outcomes, plus the unbeaten run that spans wins and draws.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub result: Option<FormResult>,
    pub length: u8,
    pub unbeaten: u8,
}

impl Streak {
    fn push(&mut self, result: FormResult) {
        if self.result == Some(result) {
            self.length = self.length.saturating_add(1);
        } else {
            self.result = Some(result);
            self.length = 1;
        }

        if result == FormResult::Loss {
            self.unbeaten = 0;
        } else {
            self.unbeaten = self.unbeaten.saturating_add(1);
        }
    }

    pub fn winning(&self) -> u8 {
        self.run_of(FormResult::Win)
    }

    pub fn losing(&self) -> u8 {
        self.run_of(FormResult::Loss)
    }

    fn run_of(&self, result: FormResult) -> u8 {
        if self.result == Some(result) { self.length } else { 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueTableRow {
    pub team_id: u32,
    pub played: u8,
    pub won: u8,
    pub drawn: u8,
    pub lost: u8,
    pub goals_for: u16,
    pub goals_against: u16,
    pub goal_difference: i16,
    pub points: u16,
    pub form: VecDeque<FormResult>,
    pub streak: Streak,
}

impl LeagueTableRow {
    pub fn new(team_id: u32) -> Self {
        LeagueTableRow {
            team_id,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            form: VecDeque::with_capacity(FORM_LENGTH),
            streak: Streak::default(),
        }
    }

    fn record(&mut self, goals_for: u8, goals_against: u8) {
        let result = FormResult::from_goals(goals_for, goals_against);

        self.played += 1;
        match result {
            FormResult::Win => {
                self.won += 1;
                self.points += 3;
            }
            FormResult::Draw => {
                self.drawn += 1;
                self.points += 1;
            }
            FormResult::Loss => self.lost += 1,
        }

        self.goals_for += goals_for as u16;
        self.goals_against += goals_against as u16;
        self.goal_difference = self.goals_for as i16 - self.goals_against as i16;

        if self.form.len() == FORM_LENGTH {
            self.form.pop_front();
        }
        self.form.push_back(result);
        self.streak.push(result);
    }

    /// Adds another row's totals; form and streak are taken from `other` as the later stretch.
    fn absorb(&mut self, other: &LeagueTableRow) {
        self.played += other.played;
        self.won += other.won;
        self.drawn += other.drawn;
        self.lost += other.lost;
        self.goals_for += other.goals_for;
        self.goals_against += other.goals_against;
        self.goal_difference = self.goals_for as i16 - self.goals_against as i16;
        self.points += other.points;

        if other.played > 0 {
            self.form = other.form.clone();
            self.streak = other.streak.clone();
        }
    }

    pub fn form_string(&self) -> String {
        self.form.iter().map(|r| r.symbol()).collect()
    }
}

/// Standings for one table instance. Rows are kept in registration order, which is
/// also the final tie-break after points, goal difference and goals scored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueTable {
    pub rows: Vec<LeagueTableRow>,
}

impl LeagueTable {
    pub fn new(teams: &[u32]) -> Self {
        LeagueTable {
            rows: teams.iter().map(|&team_id| LeagueTableRow::new(team_id)).collect(),
        }
    }

    /// Reducer over one result. Never fails; an unknown team gets a fresh row.
    /// Callers guarantee a fixture is applied at most once.
    pub fn apply_result(&mut self, home_team_id: u32, away_team_id: u32, home_goals: u8, away_goals: u8) {
        self.row_mut(home_team_id).record(home_goals, away_goals);
        self.row_mut(away_team_id).record(away_goals, home_goals);
    }

    pub fn with_result(mut self, home_team_id: u32, away_team_id: u32, home_goals: u8, away_goals: u8) -> Self {
        self.apply_result(home_team_id, away_team_id, home_goals, away_goals);
        self
    }

    fn row_mut(&mut self, team_id: u32) -> &mut LeagueTableRow {
        let index = match self.rows.iter().position(|r| r.team_id == team_id) {
            Some(index) => index,
            None => {
                self.rows.push(LeagueTableRow::new(team_id));
                self.rows.len() - 1
            }
        };

        &mut self.rows[index]
    }

    pub fn row(&self, team_id: u32) -> Option<&LeagueTableRow> {
        self.rows.iter().find(|r| r.team_id == team_id)
    }

    /// Points, goal difference, goals scored (all descending), then registration order.
    pub fn rank(&self) -> Vec<&LeagueTableRow> {
        self.rows
            .iter()
            .sorted_by(|a, b| {
                b.points
                    .cmp(&a.points)
                    .then_with(|| b.goal_difference.cmp(&a.goal_difference))
                    .then_with(|| b.goals_for.cmp(&a.goals_for))
            })
            .collect()
    }

    pub fn ranked_team_ids(&self) -> Vec<u32> {
        self.rank().iter().map(|r| r.team_id).collect()
    }

    /// 1-based position.
    pub fn position(&self, team_id: u32) -> Option<usize> {
        self.rank().iter().position(|r| r.team_id == team_id).map(|p| p + 1)
    }

    pub fn leader(&self) -> Option<u32> {
        self.rank().first().map(|r| r.team_id)
    }

    pub fn matches_played(&self) -> u32 {
        self.rows.iter().map(|r| r.played as u32).sum::<u32>() / 2
    }

    /// Sum of two tables; registration order follows `self`.
    pub fn combined(&self, later: &LeagueTable) -> LeagueTable {
        let mut table = self.clone();
        for row in &later.rows {
            table.row_mut(row.team_id).absorb(row);
        }
        table
    }
}
