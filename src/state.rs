use std::collections::{HashMap, VecDeque};
use std::time::SystemTime;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::expansion::ExpansionState;
use crate::fetch::{Completion, FetchOrchestrator, RequestState, Ticket};
use crate::grouping::{EventGroups, EventRecord, group_by_event};
use crate::links::{DEFAULT_LINK_ORIGIN, resolve_link};
use crate::window::{PAST_WINDOW_DAYS, is_within_window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    Matches,
    Past,
    Live,
    News,
    Stats,
    Rankings,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Matches,
        View::Past,
        View::Live,
        View::News,
        View::Stats,
        View::Rankings,
    ];

    /// Path segment under `/api/`, without query parameters.
    pub fn endpoint(self) -> &'static str {
        match self {
            View::Matches => "upcoming-matches",
            View::Past => "past-matches",
            View::Live => "live-matches",
            View::News => "news",
            View::Stats => "stats",
            View::Rankings => "rankings",
        }
    }

    /// Grouped views nest their records under event headers.
    pub fn is_grouped(self) -> bool {
        match self {
            View::Matches | View::Past | View::Live => true,
            View::News | View::Stats | View::Rankings => false,
        }
    }

    pub fn next(self) -> View {
        let idx = self.index();
        View::ALL[(idx + 1) % View::ALL.len()]
    }

    pub fn prev(self) -> View {
        let idx = self.index();
        View::ALL[(idx + View::ALL.len() - 1) % View::ALL.len()]
    }

    pub fn index(self) -> usize {
        match self {
            View::Matches => 0,
            View::Past => 1,
            View::Live => 2,
            View::News => 3,
            View::Stats => 4,
            View::Rankings => 5,
        }
    }

    pub fn from_name(name: &str) -> Option<View> {
        match name.trim().to_ascii_lowercase().as_str() {
            "matches" | "upcoming" | "upcoming-matches" => Some(View::Matches),
            "past" | "results" | "past-matches" => Some(View::Past),
            "live" | "live-matches" => Some(View::Live),
            "news" => Some(View::News),
            "stats" => Some(View::Stats),
            "rankings" => Some(View::Rankings),
            _ => None,
        }
    }
}

pub fn view_label(view: View) -> &'static str {
    match view {
        View::Matches => "Matches",
        View::Past => "Past",
        View::Live => "Live",
        View::News => "News",
        View::Stats => "Stats",
        View::Rankings => "Rankings",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingMatch {
    #[serde(rename = "match_event")]
    pub event: String,
    #[serde(rename = "match_series")]
    pub series: String,
    pub teams: [String; 2],
    #[serde(rename = "match_page", default)]
    pub page: String,
    #[serde(rename = "time_until_match")]
    pub time_until: String,
    #[serde(default)]
    pub predicted_winner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastMatch {
    #[serde(rename = "match_event")]
    pub event: String,
    #[serde(rename = "match_series")]
    pub series: String,
    pub teams: [String; 2],
    #[serde(deserialize_with = "de_score")]
    pub score1: u32,
    #[serde(deserialize_with = "de_score")]
    pub score2: u32,
    /// Time since completion, e.g. `"3d 4h ago"`.
    #[serde(rename = "time_until_match")]
    pub time_ago: String,
    #[serde(rename = "match_page", default)]
    pub page: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveMatch {
    #[serde(rename = "match_event")]
    pub event: String,
    #[serde(rename = "match_series")]
    pub series: String,
    pub teams: [String; 2],
    #[serde(default)]
    pub team1_logo: String,
    #[serde(default)]
    pub team2_logo: String,
    #[serde(deserialize_with = "de_score")]
    pub score1: u32,
    #[serde(deserialize_with = "de_score")]
    pub score2: u32,
    pub time_started: String,
    #[serde(rename = "match_page", default)]
    pub page: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub url_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub player: String,
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub average_combat_score: String,
    #[serde(default)]
    pub kill_deaths: String,
    #[serde(default)]
    pub kill_assists_survived_traded: String,
    #[serde(default)]
    pub average_damage_per_round: String,
    #[serde(default)]
    pub kills_per_round: String,
    #[serde(default)]
    pub assists_per_round: String,
    #[serde(default)]
    pub first_kills_per_round: String,
    #[serde(default)]
    pub first_deaths_per_round: String,
    #[serde(default)]
    pub headshot_percentage: String,
    #[serde(default)]
    pub clutch_success_percentage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: String,
    pub team: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub last_played: String,
    #[serde(default)]
    pub last_played_team: String,
    #[serde(default)]
    pub last_played_team_logo: String,
    #[serde(default)]
    pub record: String,
    #[serde(default)]
    pub earnings: String,
    #[serde(default)]
    pub logo: String,
}

impl EventRecord for UpcomingMatch {
    fn event_name(&self) -> &str {
        &self.event
    }
}

impl EventRecord for PastMatch {
    fn event_name(&self) -> &str {
        &self.event
    }
}

impl EventRecord for LiveMatch {
    fn event_name(&self) -> &str {
        &self.event
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Team1,
    Team2,
    Draw,
}

pub fn outcome_from_scores(score1: u32, score2: u32) -> Outcome {
    match score1.cmp(&score2) {
        std::cmp::Ordering::Greater => Outcome::Team1,
        std::cmp::Ordering::Less => Outcome::Team2,
        std::cmp::Ordering::Equal => Outcome::Draw,
    }
}

fn team_for(teams: &[String; 2], outcome: Outcome) -> Option<&str> {
    match outcome {
        Outcome::Team1 => Some(teams[0].as_str()),
        Outcome::Team2 => Some(teams[1].as_str()),
        Outcome::Draw => None,
    }
}

impl PastMatch {
    pub fn outcome(&self) -> Outcome {
        outcome_from_scores(self.score1, self.score2)
    }

    /// `None` when the scores are level.
    pub fn winner(&self) -> Option<&str> {
        team_for(&self.teams, self.outcome())
    }
}

impl LiveMatch {
    pub fn leader(&self) -> Option<&str> {
        team_for(&self.teams, outcome_from_scores(self.score1, self.score2))
    }
}

fn de_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Number(u32),
        Text(String),
    }

    match RawScore::deserialize(deserializer)? {
        RawScore::Number(n) => Ok(n),
        RawScore::Text(text) => text
            .trim()
            .parse::<u32>()
            .map_err(|_| de::Error::custom(format!("invalid score {text:?}"))),
    }
}

/// A successful payload, typed by the view it was fetched for.
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    Upcoming(Vec<UpcomingMatch>),
    Past(Vec<PastMatch>),
    Live(Vec<LiveMatch>),
    News(Vec<NewsItem>),
    Stats(Vec<StatLine>),
    Rankings(Vec<RankingEntry>),
}

impl Records {
    pub fn view(&self) -> View {
        match self {
            Records::Upcoming(_) => View::Matches,
            Records::Past(_) => View::Past,
            Records::Live(_) => View::Live,
            Records::News(_) => View::News,
            Records::Stats(_) => View::Stats,
            Records::Rankings(_) => View::Rankings,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Records::Upcoming(items) => items.len(),
            Records::Past(items) => items.len(),
            Records::Live(items) => items.len(),
            Records::News(items) => items.len(),
            Records::Stats(items) => items.len(),
            Records::Rankings(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What the dashboard should draw for the active view.
#[derive(Debug)]
pub enum Rendered<'a> {
    Idle,
    Loading,
    Failed(&'a str),
    Upcoming(EventGroups<'a, UpcomingMatch>),
    Past(EventGroups<'a, PastMatch>),
    Live(EventGroups<'a, LiveMatch>),
    News(&'a [NewsItem]),
    Stats(&'a [StatLine]),
    Rankings(&'a [RankingEntry]),
}

impl<'a> Rendered<'a> {
    /// Event headers in display order; empty for flat views.
    pub fn event_names(&self) -> Vec<&'a str> {
        match self {
            Rendered::Upcoming(groups) => groups.keys().copied().collect(),
            Rendered::Past(groups) => groups.keys().copied().collect(),
            Rendered::Live(groups) => groups.keys().copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Placeholder for a grouped view that loaded but has nothing to show.
    pub fn empty_notice(&self, past_window_days: u32) -> Option<String> {
        match self {
            Rendered::Upcoming(groups) if groups.is_empty() => {
                Some("No upcoming matches".to_string())
            }
            Rendered::Past(groups) if groups.is_empty() => Some(format!(
                "No results in the last {past_window_days} days"
            )),
            Rendered::Live(groups) if groups.is_empty() => {
                Some("No live matches right now".to_string())
            }
            _ => None,
        }
    }

    /// Selectable rows: event headers for grouped views, records otherwise.
    pub fn row_count(&self) -> usize {
        match self {
            Rendered::Idle | Rendered::Loading | Rendered::Failed(_) => 0,
            Rendered::Upcoming(groups) => groups.len(),
            Rendered::Past(groups) => groups.len(),
            Rendered::Live(groups) => groups.len(),
            Rendered::News(items) => items.len(),
            Rendered::Stats(lines) => lines.len(),
            Rendered::Rankings(entries) => entries.len(),
        }
    }
}

/// Derive the displayed data set from a successful payload.
///
/// Matches and Live are grouped as-is, Past is windowed to `past_window_days`
/// before grouping, the remaining views stay flat.
pub fn render_records(records: &Records, past_window_days: u32) -> Rendered<'_> {
    match records {
        Records::Upcoming(items) => Rendered::Upcoming(group_by_event(items)),
        Records::Past(items) => Rendered::Past(group_by_event(
            items
                .iter()
                .filter(|m| is_within_window(&m.time_ago, past_window_days)),
        )),
        Records::Live(items) => Rendered::Live(group_by_event(items)),
        Records::News(items) => Rendered::News(items),
        Records::Stats(lines) => Rendered::Stats(lines),
        Records::Rankings(entries) => Rendered::Rankings(entries),
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub view: View,
    pub fetch: FetchOrchestrator,
    pub expansion: HashMap<View, ExpansionState>,
    pub selected: usize,
    pub past_window_days: u32,
    pub link_origin: String,
    pub fetched_at: Option<SystemTime>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            view: View::Matches,
            fetch: FetchOrchestrator::new(),
            expansion: HashMap::with_capacity(3),
            selected: 0,
            past_window_days: PAST_WINDOW_DAYS,
            link_origin: DEFAULT_LINK_ORIGIN.to_string(),
            fetched_at: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn with_config(config: &AppConfig) -> Self {
        let mut state = Self::new();
        state.past_window_days = config.past_window_days;
        state.link_origin = config.link_origin.clone();
        state
    }

    /// Switch to `view` and start loading it. The returned command must be
    /// handed to the provider.
    ///
    /// Selecting the view that is already active reloads it.
    pub fn select_view(&mut self, view: View) -> ProviderCommand {
        self.view = view;
        self.selected = 0;
        self.fetched_at = None;
        if view.is_grouped() {
            self.expansion.entry(view).or_default().reset_all();
        }
        let ticket = self.fetch.begin(view);
        self.push_log(format!(
            "[INFO] Loading {} (#{})",
            view_label(view),
            ticket.epoch
        ));
        ProviderCommand::Fetch(ticket)
    }

    pub fn next_view(&mut self) -> ProviderCommand {
        self.select_view(self.view.next())
    }

    pub fn prev_view(&mut self) -> ProviderCommand {
        self.select_view(self.view.prev())
    }

    pub fn reload(&mut self) -> ProviderCommand {
        self.select_view(self.view)
    }

    pub fn request(&self) -> &RequestState {
        self.fetch.state()
    }

    pub fn rendered(&self) -> Rendered<'_> {
        match self.fetch.state() {
            RequestState::Idle => Rendered::Idle,
            RequestState::Loading => Rendered::Loading,
            RequestState::Failed(message) => Rendered::Failed(message),
            RequestState::Succeeded(records) => render_records(records, self.past_window_days),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rendered().row_count()
    }

    pub fn select_next(&mut self) {
        let total = self.row_count();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(total - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_event(&self) -> Option<String> {
        self.rendered()
            .event_names()
            .get(self.selected)
            .map(|name| name.to_string())
    }

    /// Toggle the event under the cursor; `None` when nothing is toggleable.
    pub fn toggle_selected(&mut self) -> Option<bool> {
        let event = self.selected_event()?;
        Some(self.toggle_event(&event))
    }

    pub fn toggle_event(&mut self, event: &str) -> bool {
        self.expansion.entry(self.view).or_default().toggle(event)
    }

    pub fn is_expanded(&self, event: &str) -> bool {
        self.expansion
            .get(&self.view)
            .is_some_and(|store| store.is_expanded(event))
    }

    pub fn link(&self, reference: &str) -> String {
        resolve_link(&self.link_origin, reference)
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    Fetched {
        ticket: Ticket,
        outcome: Result<Records, FetchError>,
    },
    Log(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    Fetch(Ticket),
    Shutdown,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Fetched { ticket, outcome } => match state.fetch.complete(ticket, outcome) {
            Completion::Applied => {
                state.fetched_at = Some(SystemTime::now());
                let total = state.row_count();
                state.selected = state.selected.min(total.saturating_sub(1));
                let count = state
                    .fetch
                    .state()
                    .records()
                    .map(Records::len)
                    .unwrap_or(0);
                state.push_log(format!(
                    "[INFO] {} loaded: {count} records",
                    view_label(ticket.view)
                ));
            }
            Completion::Failed => {
                let message = state.fetch.state().error().unwrap_or_default().to_string();
                state.push_log(format!(
                    "[WARN] {} failed: {message}",
                    view_label(ticket.view)
                ));
            }
            Completion::Stale => {
                state.push_log(format!(
                    "[INFO] Dropped stale {} response (#{})",
                    view_label(ticket.view),
                    ticket.epoch
                ));
            }
        },
        Delta::Log(msg) => state.push_log(msg),
    }
}
