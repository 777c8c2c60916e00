use std::env;
use std::thread;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::FetchError;
use crate::fetch::ResourceSource;
use crate::state::{
    LiveMatch, NewsItem, PastMatch, RankingEntry, Records, StatLine, UpcomingMatch, View,
};

const EVENTS: &[&str] = &[
    "Champions Tour Masters",
    "Challengers League North America",
    "Game Changers EMEA",
    "Ascension Pacific",
];

const TEAMS: &[&str] = &[
    "Sentinels", "Fnatic", "Paper Rex", "LOUD", "Team Heretics", "Gen.G", "NRG", "EDG",
    "DRX", "Leviatan", "Team Liquid", "G2", "100 Thieves", "Karmine Corp",
];

/// Synthetic records with random latency, for running without a backend.
#[derive(Debug, Clone)]
pub struct DemoSource {
    latency_ms: (u64, u64),
    failure_rate: f64,
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::from_env()
    }
}

impl DemoSource {
    pub fn new(latency_ms: (u64, u64), failure_rate: f64) -> Self {
        let (lo, hi) = latency_ms;
        let failure_rate = if failure_rate.is_finite() {
            failure_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            latency_ms: (lo.min(hi), lo.max(hi)),
            failure_rate,
        }
    }

    pub fn from_env() -> Self {
        let max_latency = env::var("DEMO_LATENCY_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(900)
            .min(10_000);
        let failure_rate = env::var("DEMO_FAILURE_RATE")
            .ok()
            .and_then(|val| val.parse::<f64>().ok())
            .unwrap_or(0.1);
        Self::new((max_latency / 8, max_latency), failure_rate)
    }

    pub fn generate(&self, view: View) -> Records {
        let mut rng = rand::thread_rng();
        match view {
            View::Matches => Records::Upcoming(
                (0..rng.gen_range(6..14))
                    .map(|idx| {
                        let [a, b] = pick_teams(&mut rng);
                        let predicted = if rng.gen_bool(0.5) { a.clone() } else { b.clone() };
                        UpcomingMatch {
                            event: pick_event(&mut rng),
                            series: format!("Playoffs: Round {}", idx % 4 + 1),
                            teams: [a, b],
                            page: format!("/{}/demo-upcoming-{idx}", 400_000 + idx),
                            time_until: relative_time(&mut rng, 0..3, 0..24),
                            predicted_winner: predicted,
                        }
                    })
                    .collect(),
            ),
            View::Past => Records::Past(
                (0..rng.gen_range(8..18))
                    .map(|idx| {
                        let teams = pick_teams(&mut rng);
                        let (score1, score2) = best_of_three(&mut rng);
                        PastMatch {
                            event: pick_event(&mut rng),
                            series: format!("Group Stage: Opening ({})", idx % 3 + 1),
                            teams,
                            score1,
                            score2,
                            time_ago: format!("{} ago", relative_time(&mut rng, 0..45, 0..24)),
                            page: format!("/{}/demo-result-{idx}", 390_000 + idx),
                        }
                    })
                    .collect(),
            ),
            View::Live => Records::Live(
                (0..rng.gen_range(0..5))
                    .map(|idx| {
                        let teams = pick_teams(&mut rng);
                        LiveMatch {
                            event: pick_event(&mut rng),
                            series: "Upper Bracket".to_string(),
                            teams,
                            team1_logo: "//owcdn.net/img/demo-1.png".to_string(),
                            team2_logo: "//owcdn.net/img/demo-2.png".to_string(),
                            score1: rng.gen_range(0..13),
                            score2: rng.gen_range(0..13),
                            time_started: format!("{}m", rng.gen_range(1..90)),
                            page: format!("/{}/demo-live-{idx}", 410_000 + idx),
                        }
                    })
                    .collect(),
            ),
            View::News => Records::News(
                (0..6)
                    .map(|idx| {
                        let date = Utc::now() - ChronoDuration::days(idx);
                        NewsItem {
                            title: format!("{} roster update", TEAMS[idx as usize % TEAMS.len()]),
                            description: "Organisation confirms changes ahead of the next split."
                                .to_string(),
                            date: date.format("%B %-d, %Y").to_string(),
                            author: "demo".to_string(),
                            url_path: format!("/{}/demo-news-{idx}", 300_000 + idx),
                        }
                    })
                    .collect(),
            ),
            View::Stats => Records::Stats(
                TEAMS
                    .iter()
                    .enumerate()
                    .map(|(idx, team)| StatLine {
                        player: format!("player{idx}"),
                        org: team.to_string(),
                        rating: format!("{:.2}", rng.gen_range(0.8..1.4)),
                        average_combat_score: format!("{:.1}", rng.gen_range(160.0..280.0)),
                        kill_deaths: format!("{:.2}", rng.gen_range(0.7..1.6)),
                        kill_assists_survived_traded: format!("{}%", rng.gen_range(60..85)),
                        average_damage_per_round: format!("{:.1}", rng.gen_range(110.0..180.0)),
                        kills_per_round: format!("{:.2}", rng.gen_range(0.5..1.1)),
                        assists_per_round: format!("{:.2}", rng.gen_range(0.1..0.6)),
                        first_kills_per_round: format!("{:.2}", rng.gen_range(0.05..0.25)),
                        first_deaths_per_round: format!("{:.2}", rng.gen_range(0.05..0.25)),
                        headshot_percentage: format!("{}%", rng.gen_range(18..35)),
                        clutch_success_percentage: format!("{}%", rng.gen_range(5..30)),
                    })
                    .collect(),
            ),
            View::Rankings => Records::Rankings(
                TEAMS
                    .iter()
                    .enumerate()
                    .map(|(idx, team)| RankingEntry {
                        rank: (idx + 1).to_string(),
                        team: team.to_string(),
                        country: "International".to_string(),
                        last_played: format!("{}d ago", rng.gen_range(1..20)),
                        last_played_team: TEAMS[(idx + 3) % TEAMS.len()].to_string(),
                        last_played_team_logo: String::new(),
                        record: format!("{}-{}", rng.gen_range(5..30), rng.gen_range(2..20)),
                        earnings: format!("${}", rng.gen_range(10..900) * 1_000),
                        logo: String::new(),
                    })
                    .collect(),
            ),
        }
    }
}

impl ResourceSource for DemoSource {
    fn fetch(&self, view: View) -> Result<Records, FetchError> {
        let (delay, fail) = {
            let mut rng = rand::thread_rng();
            let (lo, hi) = self.latency_ms;
            (rng.gen_range(lo..=hi), rng.gen_bool(self.failure_rate))
        };
        thread::sleep(Duration::from_millis(delay));
        if fail {
            return Err(FetchError::network(
                self.describe(view),
                "simulated connection reset",
            ));
        }
        Ok(self.generate(view))
    }

    fn describe(&self, view: View) -> String {
        format!("demo://{}", view.endpoint())
    }
}

fn pick_event(rng: &mut impl Rng) -> String {
    EVENTS.choose(rng).copied().unwrap_or("Exhibition").to_string()
}

fn pick_teams(rng: &mut impl Rng) -> [String; 2] {
    let picked: Vec<&str> = TEAMS.choose_multiple(rng, 2).copied().collect();
    match picked.as_slice() {
        [a, b] => [a.to_string(), b.to_string()],
        _ => ["TBD".to_string(), "TBD".to_string()],
    }
}

fn best_of_three(rng: &mut impl Rng) -> (u32, u32) {
    match rng.gen_range(0..5) {
        0 => (2, 0),
        1 => (2, 1),
        2 => (0, 2),
        3 => (1, 2),
        _ => (1, 1),
    }
}

fn relative_time(
    rng: &mut impl Rng,
    days: std::ops::Range<u64>,
    hours: std::ops::Range<u64>,
) -> String {
    let d = rng.gen_range(days);
    let h = rng.gen_range(hours);
    if d == 0 {
        format!("{h}h {}m", rng.gen_range(0..60))
    } else {
        format!("{d}d {h}h")
    }
}
