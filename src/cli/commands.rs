use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::app::{AppContext, ErrorKind, HearsayError, Result};
use crate::domain::PlaybackState;
use crate::narration::event::{Action, HELP};
use crate::narration::NarrationController;
use crate::speech;

pub async fn resolve(ctx: &AppContext, url: &str) -> Result<()> {
    let request = ctx.resolve(url).await?;
    println!("{}", request.endpoint);
    Ok(())
}

pub async fn print_text(ctx: &AppContext, url: &str) -> Result<()> {
    let content = ctx.load(url).await?;
    print!("{}", content.narration_text());
    Ok(())
}

/// Read a post aloud and take playback commands from stdin until `q` or
/// until stdin closes and narration ends.
pub async fn play(ctx: &AppContext, url: &str, once: bool) -> Result<()> {
    play_from(ctx, url, once, BufReader::new(tokio::io::stdin())).await
}

async fn play_from<R>(ctx: &AppContext, url: &str, once: bool, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let (events_tx, mut events) = speech::event_channel();
    let mut controller = NarrationController::new(ctx.speech_engine(events_tx));
    debug!("Speech engine: {}", controller.engine_name());

    if let Err(e) = open(ctx, &mut controller, url).await {
        if once {
            return Err(e);
        }
        report(&e);
    }
    if once && !controller.state().is_active() {
        return Ok(());
    }
    if !once {
        println!("Type ? for status, h for help, q to quit.");
    }

    let mut lines = input.lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        if !handle_action(ctx, &mut controller, Action::from(line.as_str())).await {
                            break;
                        }
                    }
                    None => {
                        debug!("stdin closed");
                        stdin_open = false;
                        // nobody is left to resume a paused narration
                        if *controller.state() != PlaybackState::Speaking {
                            break;
                        }
                    }
                }
            }
            Some(event) = events.recv() => {
                if let Some(e) = controller.handle_event(event) {
                    if once {
                        return Err(e);
                    }
                    report(&e);
                }
                if !controller.state().is_active() && (once || !stdin_open) {
                    break;
                }
            }
            else => break,
        }
    }

    if controller.state().can_stop() {
        if let Err(e) = controller.stop().await {
            debug!("Stop on exit failed: {}", e);
        }
    }
    Ok(())
}

async fn open(ctx: &AppContext, controller: &mut NarrationController, url: &str) -> Result<()> {
    println!("Fetching {}...", url.trim());
    controller.fetch_and_play(ctx.load(url)).await?;

    if let Some(content) = controller.content() {
        println!("Reading: {}", content.title);
    }
    Ok(())
}

/// Apply one typed command. Returns `false` to quit.
async fn handle_action(ctx: &AppContext, controller: &mut NarrationController, action: Action) -> bool {
    let result = match action {
        Action::Open(url) => open(ctx, controller, &url).await,
        Action::Play => controller.play().await,
        Action::Pause => controller.pause().await,
        Action::Stop => controller.stop().await,
        Action::ShowText => {
            match controller.text() {
                Some(text) => print!("{}", text),
                None => println!("No content loaded."),
            }
            Ok(())
        }
        Action::Status => {
            print_status(controller);
            Ok(())
        }
        Action::Help => {
            println!("{}", HELP);
            Ok(())
        }
        Action::Quit => return false,
        Action::Unknown(line) => {
            println!("Unknown command: {} (h for help)", line);
            Ok(())
        }
        Action::None => Ok(()),
    };

    if let Err(e) = result {
        report(&e);
    }
    true
}

fn report(error: &HearsayError) {
    eprintln!("{}", error);
    if let Some(hint) = hint(error) {
        eprintln!("{}", hint);
    }
}

fn hint(error: &HearsayError) -> Option<&'static str> {
    match error.kind() {
        ErrorKind::ResolutionFailure => Some("Try the full post link from the address bar."),
        ErrorKind::InvalidTransition => Some("Type ? to see what can be done now."),
        ErrorKind::SpeechUnsupported => Some("Use t to read the text instead."),
        _ => None,
    }
}

fn print_status(controller: &NarrationController) {
    let state = controller.state();
    match state.error() {
        Some(message) => println!("State: {} ({})", state.label(), message),
        None => println!("State: {}", state.label()),
    }
    if let Some(content) = controller.content() {
        println!(
            "Post: {} ({} comments)",
            content.title,
            content.comments.len()
        );
    }
    println!("Engine: {}", controller.engine_name());
    println!("Available: {}", available_commands(state).join(" "));
}

/// Transport commands that make sense in `state`.
fn available_commands(state: &PlaybackState) -> Vec<&'static str> {
    [
        (state.accepts_input(), "o <url>"),
        (state.can_play(), "r"),
        (state.can_pause(), "p"),
        (state.can_stop(), "s"),
    ]
    .into_iter()
    .filter_map(|(enabled, command)| enabled.then_some(command))
    .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::{Config, SpeechConfig};
    use crate::fetcher::testing::StaticFetcher;

    const POST_URL: &str = "https://www.reddit.com/r/rust/comments/abc123/ferris/";
    const THREAD: &str = r#"[
        {"kind": "Listing", "data": {"children": [
            {"kind": "t3", "data": {"id": "abc123", "title": "Ferris", "selftext": "Hello there."}}
        ]}}
    ]"#;

    fn context() -> AppContext {
        let config = Config {
            speech: SpeechConfig {
                command: Some("/bin/sh".into()),
                args: vec!["-c".into(), "sleep 1".into(), "hearsay".into()],
                ..SpeechConfig::default()
            },
            ..Config::default()
        };
        let fetcher = StaticFetcher::new()
            .with_page("https://www.reddit.com/r/rust/comments/abc123.json", THREAD);
        AppContext::with_fetcher(config, Arc::new(fetcher))
    }

    async fn run(input: &'static str) -> Result<()> {
        let ctx = context();
        tokio::time::timeout(
            Duration::from_secs(8),
            play_from(&ctx, POST_URL, false, input.as_bytes()),
        )
        .await
        .expect("play did not return")
    }

    #[tokio::test]
    async fn test_play_ends_after_narration_when_input_closes() {
        run("").await.unwrap();
    }

    #[tokio::test]
    async fn test_play_ends_when_input_closes_while_paused() {
        run("p\n").await.unwrap();
    }

    #[tokio::test]
    async fn test_play_quits_on_command() {
        run("?\nq\n").await.unwrap();
    }

    #[test]
    fn test_available_commands() {
        assert_eq!(available_commands(&PlaybackState::Idle), vec!["o <url>", "r"]);
        assert_eq!(
            available_commands(&PlaybackState::Speaking),
            vec!["o <url>", "p", "s"]
        );
        assert_eq!(
            available_commands(&PlaybackState::Paused),
            vec!["o <url>", "r", "s"]
        );
        assert!(available_commands(&PlaybackState::Fetching).is_empty());
    }

    #[test]
    fn test_hints_follow_error_kind() {
        let transition = HearsayError::InvalidTransition {
            action: "pause",
            state: "idle",
        };
        assert!(hint(&transition).unwrap().contains('?'));

        let unresolved = HearsayError::ResolutionFailure {
            url: "https://www.reddit.com/r/rust/s/AbCdEf1234".into(),
            attempted: vec!["follow-redirect".into()],
        };
        assert!(hint(&unresolved).is_some());

        assert!(hint(&HearsayError::InvalidInput("Please enter a Reddit URL.".into())).is_none());
    }

    #[tokio::test]
    async fn test_play_once_reports_fetch_failure() {
        let ctx = context();

        let err = play_from(&ctx, "https://www.reddit.com/r/rust/comments/zzz999/x/", true, "".as_bytes())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    }
}
