pub mod calendar;
pub mod context;
pub mod continent;
pub mod cup;
pub mod error;
pub mod league;
pub mod r#match;
pub mod playoff;
pub mod season;
pub mod shared;
pub mod transition;

pub use calendar::{Calendar, CalendarBuilder, CompetitionFootprint, ContinentalFootprint, Week, WeekSlot};
pub use context::SeasonContext;
pub use continent::{
    ContinentalCompetition, ContinentalFormat, ContinentalPhase, ContinentalSettings, CupWinnerSlot,
    KnockoutTie, PrizeTable, Qualification, QualificationOutcome, SlotAllocation, TieMethod,
};
pub use cup::{CupBracket, CupScore};
pub use error::{CompetitionError, CompetitionResult, DegradedFill};
pub use league::{
    AperturaClausuraSeason, Fixture, League, LeagueFormat, LeagueSettings, LeagueTable, LeagueTableRow,
    PlayoffSettings, RoundRobin,
};
pub use r#match::{
    AttendanceModel, CapacityAttendanceModel, MatchContext, MatchOutcome, MatchOutcomeGenerator, MatchSquad,
    PlayedMatch, RatingMatchEngine, ShootoutResult, Side,
};
pub use playoff::{PlayoffMatchRef, PlayoffMatchScore, PlayoffPhase, PromotionPlayoffBracket};
pub use season::{DueMatch, MatchRunner, Season, WeekReport, WeekStep};
pub use shared::{CompetitionKind, TeamRef, TeamRegistry};
pub use transition::{
    CupDefinition, LeagueDefinition, SeasonSetup, SeasonSummary, SeasonTransition, TransitionOutput, TransitionStep,
};
