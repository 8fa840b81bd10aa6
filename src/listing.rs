//! Read-only browsing commands: languages, sections, episodes, search and
//! the release timeline.

use crate::api::Platform;
use crate::config::Selection;
use crate::download::select_episodes;
use crate::error::Error;
use crate::table::Table;

use std::io::Write;

use anyhow::{Context, Result};

pub fn languages<P: Platform, W: Write>(platform: &P, season_id: &str, out: &mut W) -> Result<()> {
    let info = platform.season_info(season_id)?;
    let list = platform.episodes(season_id)?;
    let first = list.first_episode().ok_or_else(|| {
        Error::NotFound(format!("Season {} has no aired episodes yet", season_id))
    })?;
    let subtitles = platform
        .subtitles(&first.episode_id)
        .with_context(|| format!("Failed to list subtitles of episode {}", first.episode_id))?;

    let mut table = Table::new(&["key", "lang"]);
    for subtitle in &subtitles.subtitles {
        table.push_row([subtitle.language_key.as_str(), subtitle.display_name.as_str()]);
    }
    writeln!(out, "Title: {}", info.season.title)?;
    table.render(out)?;
    Ok(())
}

pub fn sections<P: Platform, W: Write>(platform: &P, season_id: &str, out: &mut W) -> Result<()> {
    let info = platform.season_info(season_id)?;
    let list = platform.episodes(season_id)?;

    let mut table = Table::new(&["#", "episode", "title"]);
    for (index, section) in list.sections.iter().enumerate() {
        table.push_row([
            (index + 1).to_string(),
            section.ep_list_title.clone(),
            section.title.clone(),
        ]);
    }
    writeln!(out, "Title: {}", info.season.title)?;
    table.render(out)?;
    Ok(())
}

pub fn episodes<P: Platform, W: Write>(
    platform: &P,
    season_id: &str,
    selection: &Selection,
    out: &mut W,
) -> Result<()> {
    let info = platform.season_info(season_id)?;
    let list = platform.episodes(season_id)?;

    let mut table = Table::new(&["#", "section", "title"]);
    for selected in select_episodes(&list, selection)? {
        table.push_row([
            selected.episode.short_title_display.clone(),
            selected.section.to_string(),
            selected.episode.long_title_display.clone(),
        ]);
    }
    writeln!(out, "Title: {}", info.season.title)?;
    table.render(out)?;
    Ok(())
}

pub fn search<P: Platform, W: Write>(
    platform: &P,
    keyword: &str,
    limit: usize,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let modules = platform.search(keyword, limit)?;
    if json {
        serde_json::to_writer(&mut *out, &modules)?;
        writeln!(out)?;
        return Ok(());
    }

    let mut table = Table::new(&["id", "title", "status"]);
    if let Some(shows) = modules.iter().find(|m| m.is_show_listing()) {
        for card in &shows.items {
            table.push_row([
                card.season_id.as_str(),
                card.title.as_str(),
                card.index_show.as_str(),
            ]);
        }
    }
    table.render(out)?;
    Ok(())
}

/// Prints the releases of one day. `day` is an upper-case short weekday
/// (`"SUN"`), or `None` for today.
pub fn timeline<P: Platform, W: Write>(
    platform: &P,
    day: Option<&str>,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let timeline = platform.timeline()?;
    if json {
        serde_json::to_writer(&mut *out, &timeline)?;
        writeln!(out)?;
        return Ok(());
    }

    let entry = timeline.items.iter().find(|d| match day {
        Some(day) => d.day_of_week.eq_ignore_ascii_case(day),
        None => d.is_today,
    });
    let entry = match entry {
        Some(entry) => entry,
        None => {
            writeln!(out, "No releases listed for {}", day.unwrap_or("today"))?;
            return Ok(());
        }
    };

    let title = format!("title ({} {})", entry.day_of_week, entry.full_date_text);
    let mut table = Table::new(&["id", title.as_str(), "status"]);
    for card in &entry.cards {
        table.push_row([
            card.season_id.as_str(),
            card.title.as_str(),
            card.index_show.as_str(),
        ]);
    }
    table.render(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{card, episode, subtitle, FakePlatform};
    use crate::models::{SearchModule, TimelineDay};

    fn show() -> FakePlatform {
        let mut platform = FakePlatform::new("My Show");
        platform.add_section("Main", vec![episode("1", "Start", None), episode("2", "End", None)]);
        platform.add_section("Extras", vec![episode("3", "Bonus", None)]);
        platform.add_subtitles(
            "1",
            vec![
                subtitle("en", "https://s.example/1-en.json", false),
                subtitle("th", "https://s.example/1-th.json", true),
            ],
        );
        platform
    }

    fn output<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn languages_of_first_episode() {
        let platform = show();
        let text = output(|out| languages(&platform, "9", out));
        assert_eq!(
            text,
            "Title: My Show\nKEY  LANG\n---  ----\nen   EN\nth   TH\n"
        );
    }

    #[test]
    fn languages_of_empty_show_is_not_found() {
        let platform = FakePlatform::new("Nothing yet");
        let err = languages(&platform, "9", &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NotFound(_))
        ));
    }

    #[test]
    fn sections_are_numbered() {
        let platform = show();
        let text = output(|out| sections(&platform, "9", out));
        assert!(text.contains("1  Main episodes    Main\n"), "{}", text);
        assert!(text.contains("2  Extras episodes  Extras\n"), "{}", text);
    }

    #[test]
    fn episodes_respect_selection() {
        let platform = show();
        let selection = Selection {
            sections: None,
            episodes: Some(vec!["2-3".to_string()]),
        };
        let text = output(|out| episodes(&platform, "9", &selection, out));
        assert!(!text.contains("Start"));
        assert!(text.contains("E2  1        End\n"), "{}", text);
        assert!(text.contains("E3  2        Bonus\n"), "{}", text);
    }

    #[test]
    fn search_lists_first_show_module() {
        let mut platform = show();
        platform.search_results = vec![
            SearchModule {
                module: "ugc".to_string(),
                items: vec![card("0", "Clip", "")],
            },
            SearchModule {
                module: "ogv".to_string(),
                items: vec![
                    card("37738", "Show A", "Complete"),
                    card("1042594", "Show B", "EP 5"),
                ],
            },
        ];
        let text = output(|out| search(&platform, "show", 10, false, out));
        assert!(!text.contains("Clip"));
        assert!(text.contains("37738    Show A  Complete\n"), "{}", text);
        assert!(text.contains("1042594  Show B  EP 5\n"), "{}", text);
    }

    #[test]
    fn search_json_passes_data_through() {
        let mut platform = show();
        platform.search_results = vec![SearchModule {
            module: "ogv".to_string(),
            items: vec![card("1", "A", "B")],
        }];
        let text = output(|out| search(&platform, "a", 10, true, out));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["items"][0]["season_id"], "1");
    }

    fn week() -> Vec<TimelineDay> {
        vec![
            TimelineDay {
                day_of_week: "SUN".to_string(),
                is_today: false,
                full_date_text: "Oct 18".to_string(),
                cards: vec![card("11", "Sunday Show", "EP 3")],
            },
            TimelineDay {
                day_of_week: "MON".to_string(),
                is_today: true,
                full_date_text: "Oct 19".to_string(),
                cards: vec![card("22", "Monday Show", "EP 7")],
            },
        ]
    }

    #[test]
    fn timeline_defaults_to_today() {
        let mut platform = show();
        platform.timeline.items = week();
        let text = output(|out| timeline(&platform, None, false, out));
        assert!(text.starts_with("ID  TITLE (MON OCT 19)"), "{}", text);
        assert!(text.contains("22  Monday Show"));
        assert!(!text.contains("Sunday Show"));
    }

    #[test]
    fn timeline_for_named_day() {
        let mut platform = show();
        platform.timeline.items = week();
        let text = output(|out| timeline(&platform, Some("SUN"), false, out));
        let row = text.lines().last().unwrap();
        assert!(row.starts_with("11  Sunday Show "), "{}", text);
        assert!(row.ends_with("  EP 3"), "{}", text);
    }

    #[test]
    fn timeline_without_matching_day() {
        let platform = show();
        let text = output(|out| timeline(&platform, Some("WED"), false, out));
        assert_eq!(text, "No releases listed for WED\n");
    }
}
