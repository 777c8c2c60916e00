use anyhow::{Context, Result, bail};
use serde_json::json;

use valo_terminal::api::{HttpSource, resource_url};
use valo_terminal::config::AppConfig;
use valo_terminal::demo_feed::DemoSource;
use valo_terminal::fetch::ResourceSource;
use valo_terminal::links::resolve_link;
use valo_terminal::state::{Rendered, View, render_records, view_label};

struct Args {
    view: View,
    json: bool,
    expand_all: bool,
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let config = AppConfig::load();

    let records = if config.demo_feed {
        DemoSource::new((0, 0), 0.0).fetch(args.view)
    } else {
        eprintln!("[INFO] GET {}", resource_url(args.view, &config.api));
        HttpSource::new(config.api.clone()).fetch(args.view)
    }
    .with_context(|| format!("failed to load {}", view_label(args.view)))?;

    let rendered = render_records(&records, config.past_window_days);
    if args.json {
        let value = match &rendered {
            Rendered::Upcoming(groups) => json!(groups),
            Rendered::Past(groups) => json!(groups),
            Rendered::Live(groups) => json!(groups),
            Rendered::News(items) => json!(items),
            Rendered::Stats(lines) => json!(lines),
            Rendered::Rankings(entries) => json!(entries),
            Rendered::Idle | Rendered::Loading | Rendered::Failed(_) => json!(null),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("serialize output")?
        );
        return Ok(());
    }

    if let Some(notice) = rendered.empty_notice(config.past_window_days) {
        println!("{notice}");
        return Ok(());
    }

    let origin = config.link_origin.as_str();
    match rendered {
        Rendered::Upcoming(groups) => {
            for (event, matches) in &groups {
                println!("{event} ({})", matches.len());
                if !args.expand_all {
                    continue;
                }
                for m in matches {
                    println!(
                        "  {} | {} vs {} | {} | {} | {}",
                        m.series,
                        m.teams[0],
                        m.teams[1],
                        m.time_until,
                        m.predicted_winner,
                        resolve_link(origin, &m.page)
                    );
                }
            }
        }
        Rendered::Past(groups) => {
            for (event, matches) in &groups {
                println!("{event} ({})", matches.len());
                if !args.expand_all {
                    continue;
                }
                for m in matches {
                    println!(
                        "  {} | {} {}-{} {} | winner: {} | {}",
                        m.series,
                        m.teams[0],
                        m.score1,
                        m.score2,
                        m.teams[1],
                        m.winner().unwrap_or("draw"),
                        m.time_ago
                    );
                }
            }
        }
        Rendered::Live(groups) => {
            for (event, matches) in &groups {
                println!("{event} ({})", matches.len());
                if !args.expand_all {
                    continue;
                }
                for m in matches {
                    println!(
                        "  {} | {} {}-{} {} | {}",
                        m.series, m.teams[0], m.score1, m.score2, m.teams[1], m.time_started
                    );
                }
            }
        }
        Rendered::News(items) => {
            for item in items {
                println!("{}", item.title);
                println!("  {} • {}", item.date, item.author);
                println!("  {}", resolve_link(origin, &item.url_path));
            }
        }
        Rendered::Stats(lines) => {
            for s in lines {
                println!(
                    "{:<16} {:<16} {:>6} {:>7} {:>5} {:>7}",
                    s.player,
                    s.org,
                    s.rating,
                    s.average_combat_score,
                    s.kill_deaths,
                    s.average_damage_per_round
                );
            }
        }
        Rendered::Rankings(entries) => {
            for r in entries {
                println!(
                    "{:>4} {:<22} {:<18} {:<10} {}",
                    r.rank, r.team, r.country, r.record, r.earnings
                );
            }
        }
        Rendered::Idle | Rendered::Loading | Rendered::Failed(_) => {}
    }

    Ok(())
}

fn parse_args() -> Result<Args> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut view = View::Matches;
    let mut json = false;
    let mut expand_all = false;
    let mut idx = 0;
    while idx < args.len() {
        let arg = args[idx].as_str();
        if let Some(name) = arg.strip_prefix("--view=") {
            view = parse_view(name)?;
        } else if arg == "--view" {
            let Some(next) = args.get(idx + 1) else {
                bail!("--view needs a value");
            };
            view = parse_view(next)?;
            idx += 1;
        } else if arg == "--json" {
            json = true;
        } else if arg == "--expand-all" {
            expand_all = true;
        } else {
            bail!("unknown argument: {arg}");
        }
        idx += 1;
    }
    Ok(Args {
        view,
        json,
        expand_all,
    })
}

fn parse_view(name: &str) -> Result<View> {
    View::from_name(name).with_context(|| {
        format!("unknown view {name:?} (matches, past, live, news, stats, rankings)")
    })
}
