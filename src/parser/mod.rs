//! Streaming Extended M3U parser
//!
//! Reads a playlist line by line and pairs every `#EXTINF:` metadata line with
//! the stream URL that follows it. Nothing beyond the current line is buffered,
//! so multi-hundred-megabyte playlists parse in constant memory apart from the
//! tracks themselves.
//!
//! Malformed content never fails a parse: lines that cannot be paired are
//! skipped and fields that cannot be resolved are left empty.

pub mod extinf;
pub mod heuristics;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::errors::{ParseError, ParseResult};
use crate::models::{Playlist, Track, DEFAULT_PLAYLIST_ID};

pub use extinf::{is_metadata_line, parse_extinf_line, ExtInfMetadata, EXTINF_PREFIX};
pub use heuristics::{infer_media_kind, strip_country_prefix, CountryPrefix, COUNTRY_PREFIXES};

const UTF8_BOM: char = '\u{feff}';
const PROGRESS_LOG_INTERVAL: usize = 10_000;

/// Where the assembler is between two lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserState {
    /// No metadata pending; URL lines are ignored.
    AwaitingMetadata,
    /// A metadata line was read; the next non-comment line is its stream URL.
    AwaitingUrl(ExtInfMetadata),
}

/// What a single line did to the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line, comment or URL without metadata.
    Skipped,
    /// Metadata is now pending.
    MetadataPending,
    /// Pending metadata was replaced before any URL arrived.
    MetadataReplaced,
    /// A track was completed.
    TrackEmitted,
}

/// Line-level state machine turning metadata/URL pairs into tracks.
#[derive(Debug)]
pub struct PlaylistAssembler {
    state: ParserState,
    tracks: Vec<Track>,
}

impl Default for PlaylistAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistAssembler {
    pub fn new() -> Self {
        Self {
            state: ParserState::AwaitingMetadata,
            tracks: Vec::new(),
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Feed one raw line (untrimmed).
    pub fn push_line(&mut self, line: &str) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Skipped;
        }

        if is_metadata_line(line) {
            let metadata = parse_extinf_line(line);
            let previous = std::mem::replace(&mut self.state, ParserState::AwaitingUrl(metadata));
            return match previous {
                ParserState::AwaitingUrl(_) => {
                    trace!("Discarding metadata without stream URL");
                    LineOutcome::MetadataReplaced
                }
                ParserState::AwaitingMetadata => LineOutcome::MetadataPending,
            };
        }

        if line.starts_with('#') {
            return LineOutcome::Skipped;
        }

        match std::mem::replace(&mut self.state, ParserState::AwaitingMetadata) {
            ParserState::AwaitingUrl(metadata) => {
                self.tracks.push(build_track(metadata, line));
                LineOutcome::TrackEmitted
            }
            ParserState::AwaitingMetadata => {
                trace!("Ignoring stream URL without metadata: {}", line);
                LineOutcome::Skipped
            }
        }
    }

    /// End of input. Pending metadata without a URL is dropped.
    pub fn finish(self) -> Vec<Track> {
        if matches!(self.state, ParserState::AwaitingUrl(_)) {
            debug!("Playlist ended with metadata but no stream URL; dropping it");
        }
        self.tracks
    }
}

/// Build a track from its metadata and stream URL.
///
/// Explicit attributes always win over name-prefix heuristics.
pub fn build_track(metadata: ExtInfMetadata, stream_url: &str) -> Track {
    let ExtInfMetadata {
        attributes,
        display_name,
    } = metadata;

    let group_title = attributes.get_non_blank("group-title").map(str::to_string);
    let logo_url = attributes.get_non_blank("tvg-logo").map(str::to_string);
    let media_kind = infer_media_kind(group_title.as_deref());

    let raw_name = attributes
        .get_non_blank("tvg-name")
        .or(display_name.as_deref())
        .unwrap_or_default();
    let resolution = strip_country_prefix(raw_name);

    let country_code = attributes
        .get_non_blank("tvg-country")
        .map(|country| country.trim().to_uppercase())
        .or_else(|| resolution.country.map(str::to_string));

    let language_code = attributes
        .get_non_blank("tvg-language")
        .map(|language| language.trim().to_lowercase())
        .or_else(|| resolution.language.map(str::to_string));

    let id = attributes
        .get_non_blank("tvg-id")
        .map(str::to_string)
        .or_else(|| Some(resolution.name.clone()).filter(|name| !name.trim().is_empty()))
        .unwrap_or_else(|| stream_url.to_string());

    Track {
        id,
        name: resolution.name,
        media_kind,
        country_code,
        language_code,
        group_title,
        logo_url,
        stream_url: stream_url.to_string(),
        attributes,
    }
}

/// Extended M3U playlist parser.
///
/// Holds no per-call state, so one instance can be shared by any number of
/// concurrent callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct M3uPlaylistParser;

impl M3uPlaylistParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a playlist from a buffered async reader.
    ///
    /// The reader is borrowed and left open. Cancellation is checked before
    /// every line; once observed no further line is read and no partial
    /// playlist is returned.
    pub async fn parse<R>(&self, reader: &mut R, cancel: &CancellationToken) -> ParseResult<Playlist>
    where
        R: AsyncBufRead + Unpin + ?Sized,
    {
        let mut assembler = PlaylistAssembler::new();
        let mut buffer = Vec::with_capacity(1024);
        let mut pending_lf = false;
        let mut line_number = 0usize;

        loop {
            if cancel.is_cancelled() {
                debug!("Playlist parsing cancelled after {} lines", line_number);
                return Err(ParseError::Cancelled);
            }

            buffer.clear();
            if !read_line_bytes(reader, &mut buffer, &mut pending_lf).await? {
                break;
            }
            line_number += 1;

            let decoded = String::from_utf8_lossy(&buffer);
            let line: &str = if line_number == 1 {
                decoded.trim_start_matches(UTF8_BOM)
            } else {
                &decoded
            };

            if assembler.push_line(line) == LineOutcome::TrackEmitted
                && assembler.tracks().len() % PROGRESS_LOG_INTERVAL == 0
            {
                debug!(
                    "Parsed {} tracks ({} lines read)",
                    assembler.tracks().len(),
                    line_number
                );
            }
        }

        let tracks = assembler.finish();
        info!(
            "M3U parsing completed: {} tracks from {} lines",
            tracks.len(),
            line_number
        );

        Ok(Playlist::new(DEFAULT_PLAYLIST_ID, tracks))
    }

    /// Parse an in-memory playlist.
    pub fn parse_str(&self, content: &str) -> Playlist {
        let mut assembler = PlaylistAssembler::new();
        for line in split_lines(content.trim_start_matches(UTF8_BOM)) {
            assembler.push_line(line);
        }
        Playlist::new(DEFAULT_PLAYLIST_ID, assembler.finish())
    }
}

/// Read one line into `buffer`, without its terminator.
///
/// `\n`, `\r\n` and a bare `\r` all end a line. `pending_lf` carries a `\r`
/// seen at the end of one read over to the next, so a `\r\n` split across
/// two buffer fills still ends a single line. Returns `false` at end of input.
async fn read_line_bytes<R>(
    reader: &mut R,
    buffer: &mut Vec<u8>,
    pending_lf: &mut bool,
) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut read_any = false;

    loop {
        let (consumed, line_ended) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(read_any);
            }

            if std::mem::take(pending_lf) && available[0] == b'\n' {
                (1, false)
            } else {
                read_any = true;
                match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                    Some(index) => {
                        buffer.extend_from_slice(&available[..index]);
                        *pending_lf = available[index] == b'\r';
                        (index + 1, true)
                    }
                    None => {
                        buffer.extend_from_slice(available);
                        (available.len(), false)
                    }
                }
            }
        };

        reader.consume(consumed);
        if line_ended {
            return Ok(true);
        }
    }
}

/// In-memory counterpart of [`read_line_bytes`].
fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = content;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }

        match rest.find(['\r', '\n']) {
            Some(index) => {
                let line = &rest[..index];
                let terminator = if rest[index..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[index + terminator..];
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}
