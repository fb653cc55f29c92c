use super::utils::{confirm, prompt_line};
use deezer_resolve::{
    parser, Classification, DeezerGwClient, RefineOutcome, ResolutionEntry, ResolutionSession,
    ResolveError, Resolver,
};
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::Arc;

/// Run the full interactive resolution workflow: parse, match, reconcile,
/// create.
pub async fn handle_resolve(
    client: DeezerGwClient,
    file: Option<&Path>,
    name: Option<String>,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_description(file)?;

    let songs = parser::parse_description(&text);
    if songs.is_empty() {
        return Err(ResolveError::Parse(
            "no songs recognized in the description".to_string(),
        )
        .into());
    }

    println!("\nFound {} potential song(s):", songs.len());
    for (i, song) in songs.iter().enumerate() {
        println!("{:>3}. {}", i + 1, song.display());
    }

    if !yes && !confirm("\nProceed with these songs?")? {
        println!("Aborted.");
        return Ok(());
    }

    let resolver = Resolver::new(Arc::new(client));

    println!("\n🔎 Matching against the catalog...");
    loop {
        match resolver.bulk_match(songs.clone()).await {
            Ok(_) => break,
            Err(e @ ResolveError::Service(_)) => {
                eprintln!("⚠️  {e}");
                if !confirm("Retry the match?")? {
                    println!("Aborted.");
                    return Ok(());
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(session) = resolver.session() {
        print_session(&session);
    }
    print_help();

    loop {
        let Some(line) = prompt_line("resolve> ")? else {
            println!("Aborted.");
            return Ok(());
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.first().copied() {
            None => {}

            Some("show") => {
                if let Some(session) = resolver.session() {
                    print_session(&session);
                }
            }

            Some("help") | Some("?") => print_help(),

            Some("pick") => handle_pick(&resolver, &tokens),

            Some("refine") => handle_refine(&resolver, &tokens).await,

            Some("done") => {
                if finalize(&resolver, name.as_deref()).await? {
                    return Ok(());
                }
            }

            Some("quit") | Some("abort") => {
                println!("Aborted.");
                return Ok(());
            }

            Some(other) => println!("Unknown command '{other}', type 'help' for commands"),
        }
    }
}

fn read_description(file: Option<&Path>) -> io::Result<String> {
    if let Some(path) = file {
        let text = fs::read_to_string(path)?;
        println!("Loaded description from {}", path.display());
        return Ok(text);
    }

    println!("Paste the description below.");
    println!("Type 'END' on a new line (or press Ctrl-D) to finish:");
    println!("---------------------------------------------------");

    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().eq_ignore_ascii_case("END") {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn handle_pick(resolver: &Resolver, tokens: &[&str]) {
    let (Some(entry_no), Some(candidate_no)) = (
        tokens.get(1).and_then(|t| t.parse::<usize>().ok()),
        tokens.get(2).and_then(|t| t.parse::<usize>().ok()),
    ) else {
        println!("Usage: pick <song#> <candidate#>");
        return;
    };
    if entry_no == 0 || candidate_no == 0 {
        println!("Songs and candidates are numbered from 1");
        return;
    }

    let Some(session) = resolver.session() else {
        return;
    };
    let candidate_id = match session.entry(entry_no - 1) {
        Ok(entry) => match entry.candidates().get(candidate_no - 1) {
            Some(candidate) => candidate.id,
            None => {
                println!(
                    "Song {entry_no} has {} candidate(s)",
                    entry.candidates().len()
                );
                return;
            }
        },
        Err(e) => {
            println!("⚠️  {e}");
            return;
        }
    };

    match resolver.select(entry_no - 1, candidate_id) {
        Ok(()) => println!("✅ Song {entry_no} confirmed as track {candidate_id}"),
        Err(e) => println!("⚠️  {e}"),
    }
}

async fn handle_refine(resolver: &Resolver, tokens: &[&str]) {
    let Some(entry_no) = tokens.get(1).and_then(|t| t.parse::<usize>().ok()) else {
        println!("Usage: refine <song#> [query]");
        return;
    };
    if entry_no == 0 {
        println!("Songs are numbered from 1");
        return;
    }
    let index = entry_no - 1;

    // An explicit query wins; otherwise re-run the entry's seeded query.
    let query = if tokens.len() > 2 {
        tokens[2..].join(" ")
    } else {
        let Some(session) = resolver.session() else {
            return;
        };
        match session.entry(index) {
            Ok(entry) => entry.refine_query().to_string(),
            Err(e) => {
                println!("⚠️  {e}");
                return;
            }
        }
    };

    println!("🔎 Searching '{query}'...");
    match resolver.refine(index, &query).await {
        Ok(RefineOutcome::Updated { candidates }) => {
            println!("Found {candidates} candidate(s):");
            if let Some(session) = resolver.session() {
                if let Ok(entry) = session.entry(index) {
                    print_entry(index, entry);
                }
            }
        }
        Ok(RefineOutcome::NoCandidates) => println!("No matches found for that query"),
        Ok(RefineOutcome::Superseded) => println!("(result discarded: the session moved on)"),
        Err(e) => println!("⚠️  {e}"),
    }
}

// Returns true once a playlist creation was attempted and the workflow is
// over, false to keep reconciling.
async fn finalize(
    resolver: &Resolver,
    name: Option<&str>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let Some(session) = resolver.session() else {
        return Ok(true);
    };

    let track_ids = match resolver.confirmed_track_ids() {
        Ok(ids) => ids,
        Err(ResolveError::EmptySelection) => {
            println!("⚠️  No tracks confirmed yet. Pick or refine first, or 'quit' to abort.");
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    if track_ids.len() < session.len() {
        println!(
            "⚠️  {} of {} song(s) are confirmed; the rest will be left out.",
            track_ids.len(),
            session.len()
        );
    }
    if !confirm(&format!("Create playlist with {} track(s)?", track_ids.len()))? {
        return Ok(false);
    }

    let playlist_name = match name {
        Some(n) if !n.trim().is_empty() => n.trim().to_string(),
        _ => loop {
            match prompt_line("Playlist name: ")? {
                Some(n) if !n.trim().is_empty() => break n.trim().to_string(),
                Some(_) => println!("Enter a playlist name"),
                None => {
                    println!("Aborted.");
                    return Ok(true);
                }
            }
        },
    };

    match resolver.create_playlist(&playlist_name).await {
        Ok(receipt) => {
            println!("🎉 {}", receipt.message);
            println!("   Playlist id: {}", receipt.playlist_id);
            Ok(true)
        }
        Err(e) => {
            // The session is spent either way; a fresh run restarts it.
            Err(e.into())
        }
    }
}

fn print_session(session: &ResolutionSession) {
    let summary = session.summary();
    println!(
        "\nMatches: {} found, {} to choose, {} missing ({} confirmed)",
        summary.found, summary.ambiguous, summary.missing, summary.confirmed
    );
    for (index, entry) in session.entries().iter().enumerate() {
        print_entry(index, entry);
    }
}

fn print_entry(index: usize, entry: &ResolutionEntry) {
    let number = index + 1;
    let title = entry.request().display();

    match entry.classification() {
        Classification::Found => {
            let id = entry.selected_candidate_id().unwrap_or_default();
            println!("{number:>3}. ✅ {title}  [track {id}]");
        }
        Classification::Ambiguous => {
            let state = if entry.is_confirmed() {
                "confirmed"
            } else {
                "choose with 'pick'"
            };
            println!("{number:>3}. ❓ {title}  [{state}]");
            for (j, candidate) in entry.candidates().iter().enumerate() {
                let marker = if entry.selected_candidate_id() == Some(candidate.id) {
                    '*'
                } else {
                    ' '
                };
                println!("      {marker}{:>2}) {}", j + 1, candidate.display());
            }
        }
        Classification::Missing => {
            println!(
                "{number:>3}. ❌ {title}  [no match; try: refine {number} {}]",
                entry.refine_query()
            );
        }
    }
}

fn print_help() {
    println!("\nCommands:");
    println!("  show                      redisplay the match list");
    println!("  pick <song#> <cand#>      confirm a candidate for a song");
    println!("  refine <song#> [query]    re-search one song (seeded query when omitted)");
    println!("  done                      create the playlist from confirmed tracks");
    println!("  quit                      abort without creating anything");
}
