//! Tournament data models for bracket generation.

use super::matches::{PlannedMatch, ResolvedProgression};
use super::positions::PlannedPosition;
use super::seeding::SeedingRecord;
use super::stages::StageSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Tournament ID type
pub type TournamentId = i64;

/// Team ID type
pub type TeamId = i64;

/// Bracket stage ID type
pub type StageId = i64;

/// Rating used for teams that arrive without one
pub const DEFAULT_TEAM_RATING: f64 = 1000.0;

/// Maps used when a tournament is created without its own pool
pub const DEFAULT_MAP_POOL: &[&str] = &[
    "Klyntar",
    "Birnin T'Challa",
    "Sanctum Sanctorum",
    "Stark Tower",
    "Midtown",
    "Asgard",
    "Tokyo 2099",
    "Intergalactic Empire of Wakanda",
    "Yggsgard: Seed of Memory",
    "Yggsgard: Path of Exile",
];

/// Competition format
///
/// Unknown names parse into [`TournamentFormat::Custom`]; they can be seeded
/// but no bracket strategy exists for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TournamentFormat {
    SingleElimination,
    DoubleElimination,
    Swiss,
    RoundRobin,
    GroupStagePlayoffs,
    Gsl,
    Custom(String),
}

impl TournamentFormat {
    /// Parse a format name; never fails
    pub fn from_name(name: &str) -> Self {
        match name {
            "single_elimination" => TournamentFormat::SingleElimination,
            "double_elimination" => TournamentFormat::DoubleElimination,
            "swiss" => TournamentFormat::Swiss,
            "round_robin" => TournamentFormat::RoundRobin,
            "group_stage_playoffs" => TournamentFormat::GroupStagePlayoffs,
            "gsl" => TournamentFormat::Gsl,
            other => TournamentFormat::Custom(other.to_string()),
        }
    }

    /// Name stored in the database
    pub fn as_str(&self) -> &str {
        match self {
            TournamentFormat::SingleElimination => "single_elimination",
            TournamentFormat::DoubleElimination => "double_elimination",
            TournamentFormat::Swiss => "swiss",
            TournamentFormat::RoundRobin => "round_robin",
            TournamentFormat::GroupStagePlayoffs => "group_stage_playoffs",
            TournamentFormat::Gsl => "gsl",
            TournamentFormat::Custom(name) => name,
        }
    }

    /// Whether teams are split into groups
    pub fn is_group_based(&self) -> bool {
        matches!(
            self,
            TournamentFormat::GroupStagePlayoffs | TournamentFormat::Gsl
        )
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl From<String> for TournamentFormat {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<TournamentFormat> for String {
    fn from(format: TournamentFormat) -> Self {
        format.as_str().to_string()
    }
}

/// Bracket stage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    SingleElimination,
    UpperBracket,
    LowerBracket,
    GrandFinal,
    Swiss,
    RoundRobin,
    GroupStage,
    GslWinners,
    GslLosers,
}

impl StageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageType::SingleElimination => "single_elimination",
            StageType::UpperBracket => "upper_bracket",
            StageType::LowerBracket => "lower_bracket",
            StageType::GrandFinal => "grand_final",
            StageType::Swiss => "swiss",
            StageType::RoundRobin => "round_robin",
            StageType::GroupStage => "group_stage",
            StageType::GslWinners => "gsl_winners",
            StageType::GslLosers => "gsl_losers",
        }
    }
}

/// Where a bracket position sits in its stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionType {
    FirstRound,
    Intermediate,
    Quarterfinal,
    Semifinal,
    Final,
}

impl PositionType {
    /// Derive the position type of `round` in a stage of `total_rounds`
    ///
    /// Round 1 is always the first round, even in a one-round stage.
    pub fn for_round(round: u32, total_rounds: u32) -> Self {
        if round == 1 {
            PositionType::FirstRound
        } else if round == total_rounds {
            PositionType::Final
        } else if round + 1 == total_rounds {
            PositionType::Semifinal
        } else if round + 2 == total_rounds {
            PositionType::Quarterfinal
        } else {
            PositionType::Intermediate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PositionType::FirstRound => "first_round",
            PositionType::Intermediate => "intermediate",
            PositionType::Quarterfinal => "quarterfinal",
            PositionType::Semifinal => "semifinal",
            PositionType::Final => "final",
        }
    }
}

/// Bracket position state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Empty,
    Filled,
    Advanced,
    Eliminated,
}

impl PositionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionStatus::Empty => "empty",
            PositionStatus::Filled => "filled",
            PositionStatus::Advanced => "advanced",
            PositionStatus::Eliminated => "eliminated",
        }
    }
}

/// What happens to the teams of a position once its match is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdvancementRule {
    pub win_advances: bool,
    pub loss_eliminates: bool,
    pub loss_drops_to_lower: bool,
}

/// Match state
///
/// Generation only ever produces `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    Live,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}

/// Tournament state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Draft,
    Ongoing,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::Ongoing => "ongoing",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        }
    }
}

/// Team participation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    Registered,
    Active,
    Eliminated,
}

impl TeamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatus::Registered => "registered",
            TeamStatus::Active => "active",
            TeamStatus::Eliminated => "eliminated",
        }
    }
}

/// Lifecycle phase state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    NotStarted,
    Active,
    Completed,
}

impl PhaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::Pending => "pending",
            PhaseStatus::NotStarted => "not_started",
            PhaseStatus::Active => "active",
            PhaseStatus::Completed => "completed",
        }
    }
}

/// Which per-phase best-of setting a match uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Swiss,
    GroupStage,
    Playoffs,
    Finals,
}

/// Best-of settings per tournament phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchFormatSettings {
    pub swiss: String,
    pub group_stage: String,
    pub playoffs: String,
    pub finals: String,
}

impl MatchFormatSettings {
    /// Best-of setting for a phase
    pub fn for_phase(&self, phase: MatchPhase) -> &str {
        match phase {
            MatchPhase::Swiss => &self.swiss,
            MatchPhase::GroupStage => &self.group_stage,
            MatchPhase::Playoffs => &self.playoffs,
            MatchPhase::Finals => &self.finals,
        }
    }
}

impl Default for MatchFormatSettings {
    fn default() -> Self {
        Self {
            swiss: "bo1".to_string(),
            group_stage: "bo3".to_string(),
            playoffs: "bo3".to_string(),
            finals: "bo5".to_string(),
        }
    }
}

/// Prize structure for a tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeStructure {
    /// Total prize pool
    pub total_pool: i64,
    /// Currency code
    pub currency: String,
    /// Payouts by placement (1st, 2nd, 3rd, etc.)
    pub payouts: Vec<i64>,
}

impl PrizeStructure {
    /// Winner takes the whole pool
    pub fn winner_takes_all(total_pool: i64, currency: &str) -> Self {
        Self {
            total_pool,
            currency: currency.to_string(),
            payouts: vec![total_pool],
        }
    }

    /// Split the pool by placement percentages
    pub fn custom(total_pool: i64, currency: &str, percentages: &[f64]) -> Self {
        let payouts = percentages
            .iter()
            .map(|pct| (total_pool as f64 * pct) as i64)
            .collect();

        Self {
            total_pool,
            currency: currency.to_string(),
            payouts,
        }
    }

    /// Get payout for a specific placement (1-indexed)
    pub fn payout_for_position(&self, position: usize) -> Option<i64> {
        if position == 0 {
            None
        } else {
            self.payouts.get(position - 1).copied()
        }
    }
}

/// Qualification rules stored on the tournament header
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualificationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swiss_rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swiss_wins_required: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swiss_losses_eliminated: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualified_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams_advance_per_group: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiebreaker_rules: Vec<String>,
}

impl QualificationSettings {
    /// Defaults for a format
    pub fn for_format(
        format: &TournamentFormat,
        group_size: usize,
        advancement_per_group: usize,
    ) -> Self {
        match format {
            TournamentFormat::Swiss => Self {
                swiss_rounds: Some(5),
                swiss_wins_required: Some(3),
                swiss_losses_eliminated: Some(3),
                qualified_count: Some(8),
                ..Self::default()
            },
            TournamentFormat::GroupStagePlayoffs | TournamentFormat::Gsl => Self {
                group_size: Some(group_size),
                teams_advance_per_group: Some(advancement_per_group),
                tiebreaker_rules: vec![
                    "head_to_head".to_string(),
                    "map_differential".to_string(),
                    "round_differential".to_string(),
                ],
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

/// A team offered for registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInput {
    /// Team ID
    pub id: TeamId,
    /// Rating from the rating subsystem, if known
    #[serde(default)]
    pub rating: Option<f64>,
}

impl TeamInput {
    pub fn new(id: TeamId, rating: f64) -> Self {
        Self {
            id,
            rating: Some(rating),
        }
    }

    pub fn unrated(id: TeamId) -> Self {
        Self { id, rating: None }
    }
}

/// Everything needed to create a tournament and its bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentRequest {
    /// Tournament name
    pub name: String,
    /// Competition format
    pub format: TournamentFormat,
    /// Teams to register
    pub teams: Vec<TeamInput>,
    /// First match time; defaults to a configured delay after creation
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// Capacity; defaults to the roster size
    #[serde(default)]
    pub max_teams: Option<usize>,
    /// Teams per group for group-based formats
    #[serde(default)]
    pub group_size: Option<usize>,
    /// Teams leaving each group for the playoffs
    #[serde(default)]
    pub advancement_per_group: Option<usize>,
    /// Best-of settings per phase
    #[serde(default)]
    pub match_formats: Option<MatchFormatSettings>,
    /// Map pool
    #[serde(default)]
    pub map_pool: Option<Vec<String>>,
    /// Prize breakdown
    #[serde(default)]
    pub prize: Option<PrizeStructure>,
}

impl TournamentRequest {
    /// Create a request with every optional setting left at its default
    pub fn new(name: &str, format: TournamentFormat, teams: Vec<TeamInput>) -> Self {
        Self {
            name: name.to_string(),
            format,
            teams,
            start_date: None,
            max_teams: None,
            group_size: None,
            advancement_per_group: None,
            match_formats: None,
            map_pool: None,
            prize: None,
        }
    }

    pub fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_max_teams(mut self, max_teams: usize) -> Self {
        self.max_teams = Some(max_teams);
        self
    }

    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = Some(group_size);
        self
    }

    pub fn with_advancement_per_group(mut self, advancement: usize) -> Self {
        self.advancement_per_group = Some(advancement);
        self
    }

    pub fn with_match_formats(mut self, formats: MatchFormatSettings) -> Self {
        self.match_formats = Some(formats);
        self
    }

    pub fn with_prize(mut self, prize: PrizeStructure) -> Self {
        self.prize = Some(prize);
        self
    }

    pub fn with_map_pool(mut self, maps: &[&str]) -> Self {
        self.map_pool = Some(maps.iter().map(|map| map.to_string()).collect());
        self
    }
}

/// Bracket summary stored on the tournament header for renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketData {
    #[serde(rename = "type")]
    pub format: TournamentFormat,
    /// Stage IDs in stage order; empty until persisted
    pub stages: Vec<StageId>,
    pub total_rounds: u32,
    pub total_matches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swiss_rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playoff_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_size: Option<usize>,
}

impl BracketData {
    pub fn new(format: TournamentFormat, total_rounds: u32, total_matches: usize) -> Self {
        Self {
            format,
            stages: Vec::new(),
            total_rounds,
            total_matches,
            bracket_size: None,
            upper_rounds: None,
            lower_rounds: None,
            swiss_rounds: None,
            playoff_size: None,
            group_count: None,
            group_size: None,
        }
    }
}

/// A lifecycle phase of the tournament (registration, check-in, play phases)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub name: String,
    pub slug: String,
    pub phase_type: String,
    pub phase_order: u32,
    pub status: PhaseStatus,
    pub progression_rule: String,
}

impl PhaseSpec {
    /// Build an ordered phase list; the first phase is pending, the rest wait
    pub fn sequence(phases: &[(&str, &str)]) -> Vec<PhaseSpec> {
        phases
            .iter()
            .enumerate()
            .map(|(index, (name, phase_type))| PhaseSpec {
                name: name.to_string(),
                slug: slugify(name),
                phase_type: phase_type.to_string(),
                phase_order: index as u32 + 1,
                status: if index == 0 {
                    PhaseStatus::Pending
                } else {
                    PhaseStatus::NotStarted
                },
                progression_rule: "automatic".to_string(),
            })
            .collect()
    }
}

/// Lowercase, dash-separated form of a display name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Persisted tournament header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentRecord {
    pub id: TournamentId,
    pub name: String,
    pub slug: String,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    pub current_phase: String,
    pub team_count: usize,
    pub max_teams: usize,
    pub start_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub bracket_data: BracketData,
}

/// Tournament-team association
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamEntryRecord {
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub seed: u32,
    pub rating: f64,
    pub status: TeamStatus,
    pub swiss_wins: u32,
    pub swiss_losses: u32,
    pub swiss_score: f64,
    pub swiss_buchholz: f64,
    pub bracket_position: Option<u32>,
    pub elimination_round: Option<u32>,
    pub placement: Option<u32>,
    pub points_earned: i64,
    pub registered_at: DateTime<Utc>,
}

impl TeamEntryRecord {
    /// Fresh registration for a seeded team
    pub fn registered(
        tournament_id: TournamentId,
        seeding: &SeedingRecord,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tournament_id,
            team_id: seeding.team_id,
            seed: seeding.seed,
            rating: seeding.rating,
            status: TeamStatus::Registered,
            swiss_wins: 0,
            swiss_losses: 0,
            swiss_score: 0.0,
            swiss_buchholz: 0.0,
            bracket_position: Some(seeding.seed),
            elimination_round: None,
            placement: None,
            points_earned: 0,
            registered_at,
        }
    }
}

/// Persisted bracket stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub id: StageId,
    pub tournament_id: TournamentId,
    pub feeds_from: Option<StageId>,
    pub current_round: u32,
    pub stage: StageSpec,
}

/// Persisted bracket position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRecord {
    pub id: i64,
    pub stage_id: StageId,
    pub position: PlannedPosition,
}

/// Persisted match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub id: i64,
    pub tournament_id: TournamentId,
    pub stage_id: StageId,
    pub progression: Option<ResolvedProgression>,
    pub planned: PlannedMatch,
}

/// Persisted lifecycle phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseRecord {
    pub id: i64,
    pub tournament_id: TournamentId,
    pub phase: PhaseSpec,
}

/// Rows written for one bracket structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedStructure {
    pub stages: Vec<StageRecord>,
    pub positions: Vec<PositionRecord>,
    pub matches: Vec<MatchRecord>,
    pub phases: Vec<PhaseRecord>,
    pub bracket_data: BracketData,
}

/// Everything written when a tournament is created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedTournament {
    pub tournament: TournamentRecord,
    pub teams: Vec<TeamEntryRecord>,
    pub structure: PersistedStructure,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RowCounts {
    pub tournaments: usize,
    pub teams: usize,
    pub stages: usize,
    pub positions: usize,
    pub matches: usize,
    pub phases: usize,
}

impl RowCounts {
    pub fn total(&self) -> usize {
        self.tournaments + self.teams + self.stages + self.positions + self.matches + self.phases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names_round_trip_through_strings() {
        for name in [
            "single_elimination",
            "double_elimination",
            "swiss",
            "round_robin",
            "group_stage_playoffs",
            "gsl",
        ] {
            let format = TournamentFormat::from_name(name);
            assert!(!matches!(format, TournamentFormat::Custom(_)));
            assert_eq!(format.as_str(), name);
        }
        assert_eq!(
            TournamentFormat::from_name("ladder"),
            TournamentFormat::Custom("ladder".to_string())
        );
    }

    #[test]
    fn test_format_serde_uses_plain_names() {
        let json = serde_json::to_string(&TournamentFormat::Gsl).unwrap();
        assert_eq!(json, "\"gsl\"");
        let parsed: TournamentFormat = serde_json::from_str("\"double_elimination\"").unwrap();
        assert_eq!(parsed, TournamentFormat::DoubleElimination);
    }

    #[test]
    fn test_position_type_for_round() {
        assert_eq!(PositionType::for_round(1, 4), PositionType::FirstRound);
        assert_eq!(PositionType::for_round(2, 4), PositionType::Quarterfinal);
        assert_eq!(PositionType::for_round(3, 4), PositionType::Semifinal);
        assert_eq!(PositionType::for_round(4, 4), PositionType::Final);
        assert_eq!(PositionType::for_round(2, 6), PositionType::Intermediate);
        assert_eq!(PositionType::for_round(1, 1), PositionType::FirstRound);
    }

    #[test]
    fn test_match_format_defaults() {
        let formats = MatchFormatSettings::default();
        assert_eq!(formats.for_phase(MatchPhase::Swiss), "bo1");
        assert_eq!(formats.for_phase(MatchPhase::GroupStage), "bo3");
        assert_eq!(formats.for_phase(MatchPhase::Playoffs), "bo3");
        assert_eq!(formats.for_phase(MatchPhase::Finals), "bo5");
    }

    #[test]
    fn test_partial_match_formats_fill_defaults() {
        let formats: MatchFormatSettings = serde_json::from_str(r#"{"finals":"bo7"}"#).unwrap();
        assert_eq!(formats.finals, "bo7");
        assert_eq!(formats.swiss, "bo1");
    }

    #[test]
    fn test_custom_prize_structure() {
        let prize = PrizeStructure::custom(1000, "USD", &[0.5, 0.3, 0.2]);
        assert_eq!(prize.total_pool, 1000);
        assert_eq!(prize.payouts, vec![500, 300, 200]);
        assert_eq!(prize.payout_for_position(1), Some(500));
        assert_eq!(prize.payout_for_position(3), Some(200));
        assert_eq!(prize.payout_for_position(4), None);
        assert_eq!(prize.payout_for_position(0), None);
    }

    #[test]
    fn test_winner_takes_all() {
        let prize = PrizeStructure::winner_takes_all(750, "EUR");
        assert_eq!(prize.payouts, vec![750]);
        assert_eq!(prize.currency, "EUR");
    }

    #[test]
    fn test_qualification_settings_per_format() {
        let swiss = QualificationSettings::for_format(&TournamentFormat::Swiss, 4, 2);
        assert_eq!(swiss.qualified_count, Some(8));
        assert_eq!(swiss.group_size, None);

        let gsl = QualificationSettings::for_format(&TournamentFormat::Gsl, 4, 2);
        assert_eq!(gsl.group_size, Some(4));
        assert_eq!(gsl.tiebreaker_rules.len(), 3);

        let single =
            QualificationSettings::for_format(&TournamentFormat::SingleElimination, 4, 2);
        assert_eq!(single, QualificationSettings::default());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Check-in"), "check-in");
        assert_eq!(slugify("Marvel Rivals Invitational 2025!"), "marvel-rivals-invitational-2025");
        assert_eq!(slugify("  GSL  Groups "), "gsl-groups");
    }

    #[test]
    fn test_phase_sequence_statuses() {
        let phases = PhaseSpec::sequence(&[("Registration", "registration"), ("Playoffs", "playoffs")]);
        assert_eq!(phases[0].status, PhaseStatus::Pending);
        assert_eq!(phases[1].status, PhaseStatus::NotStarted);
        assert_eq!(phases[1].phase_order, 2);
        assert_eq!(phases[1].progression_rule, "automatic");
    }
}
