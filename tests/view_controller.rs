use valo_terminal::error::FetchError;
use valo_terminal::fetch::{Completion, FetchOrchestrator, RequestState, Ticket};
use valo_terminal::state::{
    AppState, Delta, NewsItem, PastMatch, ProviderCommand, Records, Rendered, UpcomingMatch,
    View, apply_delta,
};

fn upcoming(event: &str, teams: [&str; 2], time: &str, series: &str) -> UpcomingMatch {
    UpcomingMatch {
        event: event.to_string(),
        series: series.to_string(),
        teams: [teams[0].to_string(), teams[1].to_string()],
        page: format!("/{series}"),
        time_until: time.to_string(),
        predicted_winner: teams[0].to_string(),
    }
}

fn past(event: &str, series: &str, time_ago: &str, score1: u32, score2: u32) -> PastMatch {
    PastMatch {
        event: event.to_string(),
        series: series.to_string(),
        teams: ["A".to_string(), "B".to_string()],
        score1,
        score2,
        time_ago: time_ago.to_string(),
        page: String::new(),
    }
}

fn news(title: &str) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        description: String::new(),
        date: "June 1, 2025".to_string(),
        author: "staff".to_string(),
        url_path: "/1/news".to_string(),
    }
}

fn sample_upcoming() -> Records {
    Records::Upcoming(vec![
        upcoming("Masters", ["A", "B"], "3h", "S1"),
        upcoming("Masters", ["C", "D"], "5h", "S2"),
        upcoming("Challengers", ["E", "F"], "1d", "S3"),
    ])
}

fn ticket_of(cmd: ProviderCommand) -> Ticket {
    match cmd {
        ProviderCommand::Fetch(ticket) => ticket,
        ProviderCommand::Shutdown => panic!("expected a fetch command"),
    }
}

fn deliver(state: &mut AppState, ticket: Ticket, outcome: Result<Records, FetchError>) {
    apply_delta(state, Delta::Fetched { ticket, outcome });
}

#[test]
fn select_view_starts_loading_for_mapped_view() {
    let mut state = AppState::new();
    assert!(matches!(state.rendered(), Rendered::Idle));

    let ticket = ticket_of(state.select_view(View::Past));
    assert_eq!(ticket.view, View::Past);
    assert_eq!(state.view, View::Past);
    assert!(state.request().is_loading());
    assert!(matches!(state.rendered(), Rendered::Loading));
}

#[test]
fn success_groups_upcoming_matches_by_event() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::Matches));
    deliver(&mut state, ticket, Ok(sample_upcoming()));

    let Rendered::Upcoming(groups) = state.rendered() else {
        panic!("expected grouped upcoming matches");
    };
    let keys: Vec<&str> = groups.keys().copied().collect();
    assert_eq!(keys, vec!["Masters", "Challengers"]);
    let series: Vec<&str> = groups["Masters"].iter().map(|m| m.series.as_str()).collect();
    assert_eq!(series, vec!["S1", "S2"]);
    assert_eq!(groups["Challengers"][0].series, "S3");
    assert!(state.fetched_at.is_some());
}

#[test]
fn succeeded_records_are_stored_verbatim() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::Matches));
    deliver(&mut state, ticket, Ok(sample_upcoming()));
    assert_eq!(state.request(), &RequestState::Succeeded(sample_upcoming()));
}

#[test]
fn past_view_applies_thirty_day_window_before_grouping() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::Past));
    deliver(
        &mut state,
        ticket,
        Ok(Records::Past(vec![
            past("Masters", "first", "10h", 2, 0),
            past("Masters", "second", "31d", 2, 1),
            past("Masters", "third", "29d", 0, 2),
        ])),
    );

    let Rendered::Past(groups) = state.rendered() else {
        panic!("expected grouped past matches");
    };
    let kept: Vec<&str> = groups["Masters"].iter().map(|m| m.series.as_str()).collect();
    assert_eq!(kept, vec!["first", "third"]);
}

#[test]
fn past_events_with_only_old_results_disappear() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::Past));
    deliver(
        &mut state,
        ticket,
        Ok(Records::Past(vec![
            past("Old Cup", "a", "40d", 2, 0),
            past("Masters", "b", "2d", 2, 0),
            past("Unknown", "c", "soon", 2, 0),
        ])),
    );
    assert_eq!(state.rendered().event_names(), vec!["Masters"]);
}

#[test]
fn level_scores_have_no_winner() {
    let draw = past("Masters", "s", "1h", 1, 1);
    assert_eq!(draw.winner(), None);
    assert_eq!(past("Masters", "s", "1h", 0, 2).winner(), Some("B"));
    assert_eq!(past("Masters", "s", "1h", 2, 0).winner(), Some("A"));
}

#[test]
fn news_stays_flat_and_ordered() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::News));
    deliver(
        &mut state,
        ticket,
        Ok(Records::News(vec![news("first"), news("second")])),
    );
    let Rendered::News(items) = state.rendered() else {
        panic!("expected news");
    };
    let titles: Vec<&str> = items.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second"]);
    assert!(state.rendered().event_names().is_empty());
    assert_eq!(state.toggle_selected(), None);
}

#[test]
fn stale_response_from_previous_view_is_discarded() {
    let mut state = AppState::new();
    let ticket_a = ticket_of(state.select_view(View::Matches));
    let ticket_b = ticket_of(state.select_view(View::News));

    deliver(&mut state, ticket_b, Ok(Records::News(vec![news("from B")])));
    deliver(&mut state, ticket_a, Ok(sample_upcoming()));

    assert_eq!(state.view, View::News);
    let Rendered::News(items) = state.rendered() else {
        panic!("view B's payload should stay visible");
    };
    assert_eq!(items[0].title, "from B");
    assert!(state.logs.iter().any(|l| l.contains("Dropped stale")));
}

#[test]
fn stale_response_arriving_first_does_not_end_loading() {
    let mut state = AppState::new();
    let ticket_a = ticket_of(state.select_view(View::Matches));
    let ticket_b = ticket_of(state.select_view(View::Live));

    deliver(&mut state, ticket_a, Ok(sample_upcoming()));
    assert!(state.request().is_loading());

    deliver(
        &mut state,
        ticket_b,
        Err(FetchError::network("http://localhost:8000/api/live-matches", "refused")),
    );
    let Rendered::Failed(message) = state.rendered() else {
        panic!("view B's own failure should be shown");
    };
    assert!(message.contains("refused"));
}

#[test]
fn stale_failure_cannot_replace_current_data() {
    let mut state = AppState::new();
    let ticket_a = ticket_of(state.select_view(View::Past));
    let ticket_b = ticket_of(state.select_view(View::Matches));
    deliver(&mut state, ticket_b, Ok(sample_upcoming()));
    deliver(
        &mut state,
        ticket_a,
        Err(FetchError::Timeout {
            url: "http://localhost:8000/api/past-matches".to_string(),
            secs: 10,
        }),
    );
    assert!(matches!(state.rendered(), Rendered::Upcoming(_)));
    assert!(state.request().error().is_none());
}

#[test]
fn reselecting_same_view_supersedes_the_older_request() {
    let mut state = AppState::new();
    let first = ticket_of(state.select_view(View::Matches));
    let second = ticket_of(state.reload());
    assert_eq!(first.view, second.view);
    assert!(second.epoch > first.epoch);

    deliver(&mut state, first, Ok(sample_upcoming()));
    assert!(state.request().is_loading());
    deliver(&mut state, second, Ok(Records::Upcoming(Vec::new())));
    let Rendered::Upcoming(groups) = state.rendered() else {
        panic!("expected upcoming");
    };
    assert!(groups.is_empty());
}

#[test]
fn failure_replaces_data_and_is_never_loading() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::Matches));
    deliver(&mut state, ticket, Ok(sample_upcoming()));

    let ticket = ticket_of(state.reload());
    deliver(
        &mut state,
        ticket,
        Err(FetchError::Http {
            url: "http://localhost:8000/api/upcoming-matches".to_string(),
            status: 503,
        }),
    );

    let request = state.request();
    assert!(!request.is_loading());
    assert!(request.records().is_none());
    let message = request.error().expect("failed state carries a message");
    assert!(!message.is_empty());
    assert!(message.contains("503"));
    assert_eq!(state.row_count(), 0);
    assert!(state.logs.iter().any(|l| l.starts_with("[WARN]")));
}

#[test]
fn new_load_clears_previous_error() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::News));
    deliver(
        &mut state,
        ticket,
        Err(FetchError::malformed("http://x/api/news", "missing field `data`")),
    );
    assert!(state.request().error().is_some());

    state.select_view(View::News);
    assert!(state.request().error().is_none());
    assert!(state.request().is_loading());
}

#[test]
fn mismatched_payload_for_ticket_fails_instead_of_rendering() {
    let mut orchestrator = FetchOrchestrator::new();
    let ticket = orchestrator.begin(View::Past);
    let completion = orchestrator.complete(ticket, Ok(sample_upcoming()));
    assert_eq!(completion, Completion::Failed);
    assert!(orchestrator.state().error().is_some());
}

#[test]
fn duplicate_completion_is_stale() {
    let mut orchestrator = FetchOrchestrator::new();
    let ticket = orchestrator.begin(View::News);
    assert_eq!(
        orchestrator.complete(ticket, Ok(Records::News(vec![news("one")]))),
        Completion::Applied
    );
    assert_eq!(
        orchestrator.complete(ticket, Ok(Records::News(Vec::new()))),
        Completion::Stale
    );
    assert_eq!(orchestrator.state().records().map(Records::len), Some(1));
}

#[test]
fn toggling_selected_event_expands_it() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::Matches));
    deliver(&mut state, ticket, Ok(sample_upcoming()));

    assert_eq!(state.selected_event().as_deref(), Some("Masters"));
    assert_eq!(state.toggle_selected(), Some(true));
    assert!(state.is_expanded("Masters"));
    assert!(!state.is_expanded("Challengers"));

    state.select_next();
    assert_eq!(state.selected_event().as_deref(), Some("Challengers"));
    state.select_next();
    assert_eq!(state.selected_event().as_deref(), Some("Challengers"));
    assert_eq!(state.toggle_selected(), Some(true));
    assert_eq!(state.toggle_selected(), Some(false));
}

#[test]
fn toggles_are_ignored_while_loading() {
    let mut state = AppState::new();
    state.select_view(View::Matches);
    assert_eq!(state.toggle_selected(), None);
}

#[test]
fn replacing_data_resets_expansion() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::Matches));
    deliver(&mut state, ticket, Ok(sample_upcoming()));
    state.toggle_event("Masters");
    state.toggle_event("Challengers");

    let ticket = ticket_of(state.reload());
    deliver(&mut state, ticket, Ok(sample_upcoming()));
    assert!(!state.is_expanded("Masters"));
    assert!(!state.is_expanded("Challengers"));
}

#[test]
fn expansion_is_kept_per_view() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::Matches));
    deliver(&mut state, ticket, Ok(sample_upcoming()));
    state.toggle_event("Masters");

    let ticket = ticket_of(state.select_view(View::Past));
    deliver(
        &mut state,
        ticket,
        Ok(Records::Past(vec![past("Masters", "p", "1d", 2, 0)])),
    );
    assert!(!state.is_expanded("Masters"));
}

#[test]
fn stale_expansion_keys_render_as_collapsed() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::Matches));
    deliver(&mut state, ticket, Ok(sample_upcoming()));
    state.toggle_event("Event that does not exist");
    assert_eq!(state.rendered().event_names(), vec!["Masters", "Challengers"]);
    assert!(!state.is_expanded("Masters"));
}

#[test]
fn cursor_is_clamped_after_smaller_payload() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::News));
    deliver(
        &mut state,
        ticket,
        Ok(Records::News(vec![news("a"), news("b"), news("c")])),
    );
    state.select_next();
    state.select_next();
    assert_eq!(state.selected, 2);

    let ticket = ticket_of(state.reload());
    assert_eq!(state.selected, 0);
    deliver(&mut state, ticket, Ok(Records::News(vec![news("only")])));
    state.select_next();
    assert_eq!(state.selected, 0);
}

#[test]
fn view_cycle_visits_every_view() {
    let mut state = AppState::new();
    let mut seen = Vec::new();
    for _ in 0..View::ALL.len() {
        let ticket = ticket_of(state.next_view());
        seen.push(ticket.view);
    }
    assert_eq!(seen.first(), Some(&View::Past));
    assert_eq!(seen.last(), Some(&View::Matches));
    let ticket = ticket_of(state.prev_view());
    assert_eq!(ticket.view, View::Rankings);
}

#[test]
fn links_resolve_against_configured_origin() {
    let state = AppState::new();
    assert_eq!(state.link("/123/match"), "https://www.vlr.gg/123/match");
    assert_eq!(state.link("//owcdn.net/a.png"), "https://owcdn.net/a.png");
}

#[test]
fn empty_grouped_views_show_a_notice() {
    let mut state = AppState::new();
    let ticket = ticket_of(state.select_view(View::Matches));
    deliver(&mut state, ticket, Ok(Records::Upcoming(Vec::new())));
    assert_eq!(
        state.rendered().empty_notice(state.past_window_days).as_deref(),
        Some("No upcoming matches")
    );

    let ticket = ticket_of(state.select_view(View::Past));
    deliver(
        &mut state,
        ticket,
        Ok(Records::Past(vec![past("Old Cup", "a", "40d", 2, 0)])),
    );
    assert_eq!(
        state.rendered().empty_notice(state.past_window_days).as_deref(),
        Some("No results in the last 30 days")
    );

    let ticket = ticket_of(state.select_view(View::Matches));
    deliver(&mut state, ticket, Ok(sample_upcoming()));
    assert_eq!(state.rendered().empty_notice(state.past_window_days), None);
}
