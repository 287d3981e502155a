//! # Hearsay
//!
//! Reads Reddit posts aloud from the terminal.
//!
//! ## Architecture
//!
//! ```text
//! input → LinkResolver → Fetcher → Normalizer → NarrationController → SpeechEngine
//! ```
//!
//! - [`resolver`]: Turns post, share and subreddit links into a JSON endpoint
//! - [`normalizer`]: Extracts title, body and top comments from Reddit JSON
//! - [`narration`]: Playback state machine (fetch, speak, pause, stop)
//! - [`speech`]: Speech engines driven by a system TTS program
//!
//! ## Quick Start
//!
//! ```bash
//! # Read a post aloud, then use p/r/s/q on stdin
//! hearsay play https://www.reddit.com/r/rust/s/AbCdEf
//!
//! # Print what would be read
//! hearsay text https://redd.it/1abcde
//!
//! # Show the resolved endpoint
//! hearsay resolve https://www.reddit.com/r/rust/comments/1abcde/title/
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the fetcher,
/// resolver and normalizer, and builds the speech engine.
pub mod app;

/// Command-line interface using clap.
///
/// - `play <url> [--once]` - Read a post aloud with stdin transport commands
/// - `text <url>` - Print the narration text
/// - `resolve <url>` - Print the resolved JSON endpoint
pub mod cli;

/// Configuration loaded from `~/.config/hearsay/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`PostReference`](domain::PostReference): Subreddit, post id and share id
/// - [`ExtractedContent`](domain::ExtractedContent): What gets read aloud
/// - [`PlaybackState`](domain::PlaybackState): Narration state
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for GET requests
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Narration controller and playback commands.
pub mod narration;

/// Reddit JSON parsing.
pub mod normalizer;

/// Link resolution, including share-link strategies.
pub mod resolver;

/// Speech engines.
pub mod speech;
