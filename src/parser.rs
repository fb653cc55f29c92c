//! Free-text description parsing.
//!
//! Turns a pasted text block (typically a YouTube video description or a
//! tracklist) into an ordered sequence of [`SongRequest`] values. The parser
//! is line oriented: timestamps and list numbering are stripped, dashes are
//! normalized, and each surviving line is split into artist and title.

use crate::SongRequest;
use regex::Regex;

// Minimum length for a line with no separator to count as a title; shorter
// lines are treated as noise ("Intro", stray numbering remnants, etc. still
// pass, single characters do not).
const MIN_BARE_TITLE_LEN: usize = 4;

/// Parse a description into song requests, one per recognizable line.
///
/// Recognized line shapes:
/// - `02:30 The Beatles - Let It Be` (leading timestamp, optionally
///   bracketed, optionally with an hour component)
/// - `5. Pink Floyd - Time` / `5) Pink Floyd - Time` (list numbering)
/// - `Queen - Bohemian Rhapsody` (plain `Artist - Title`)
/// - `- Levitating` (separator with an empty artist side)
/// - `Manhattan Project` (no separator; the whole line becomes the title)
///
/// Lines that reduce to nothing, and separator-less lines shorter than four
/// characters, are dropped. The returned sequence may be empty; callers
/// decide whether that is an error.
///
/// # Examples
///
/// ```rust
/// use deezer_resolve::parser::parse_description;
///
/// let songs = parse_description("00:15 The Weeknd - Blinding Lights\n5. Dua Lipa - Levitating");
/// assert_eq!(songs.len(), 2);
/// assert_eq!(songs[0].artist, "The Weeknd");
/// assert_eq!(songs[1].title, "Levitating");
/// ```
pub fn parse_description(text: &str) -> Vec<SongRequest> {
    let timestamp = Regex::new(r"^\s*[\(\[]?(\d{1,2}:)?\d{1,2}:\d{2}[\)\]]?\s*").unwrap();
    let numbering = Regex::new(r"^\d+[\.\)]?\s*").unwrap();

    let mut songs = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let cleaned = timestamp.replace(line, "");
        let cleaned = numbering.replace(&cleaned, "");
        // Em-dash and en-dash both appear in pasted tracklists
        let cleaned = cleaned.replace('\u{2014}', "-").replace('\u{2013}', "-");

        if let Some(request) = parse_line(cleaned.trim()) {
            songs.push(request);
        }
    }

    log::debug!("parsed {} song request(s) from description", songs.len());
    songs
}

// "Artist - Title" is the dominant convention; a line could also be
// "Title - Artist" but that cannot be told apart without a database, so the
// chooser downstream is the correction mechanism.
fn parse_line(line: &str) -> Option<SongRequest> {
    if let Some((artist, title)) = line.split_once(" - ") {
        let artist = artist.trim();
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        if artist.is_empty() {
            return Some(SongRequest::title_only(title));
        }
        return Some(SongRequest::new(artist, title));
    }

    if line.len() >= MIN_BARE_TITLE_LEN {
        return Some(SongRequest::title_only(line));
    }

    None
}
