// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt::Write as _;
use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tunesearch_application::{Applied, AppState, SearchSession, Submission};
use tunesearch_config::load as load_config;
use tunesearch_itunes::SearchResult;

const QUIT: &str = ":q";

/// Search the iTunes catalog for songs.
///
/// Without `--once`, reads one search term per line from stdin. An empty
/// line clears the list; `:q` or end of input quits.
#[derive(Debug, Parser)]
#[command(name = "tunesearch", version)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single search, print the results and exit.
    #[arg(long, value_name = "TERM")]
    once: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_tracing(&config.telemetry.log_level);
    info!(target: "config", path = ?args.config, "configuration loaded");

    let state = AppState::new(config)?;
    state.on_start();

    match args.once {
        Some(term) => run_once(state.session(), &term).await,
        None => {
            let initial_term = state.config.session.initial_term.clone();
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = io::stdout();
            run_interactive(
                state.session(),
                &initial_term,
                stdin,
                &mut stdout,
                shutdown_signal(),
            )
            .await
        }
    }
}

fn init_tracing(default_level: &str) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

async fn run_once(mut session: SearchSession, term: &str) -> Result<()> {
    match session.search(term).await {
        Applied::Failed(err) => bail!("search for {term:?} failed: {err}"),
        _ => {
            print!("{}", render(session.results()));
            Ok(())
        }
    }
}

async fn run_interactive<R, W>(
    mut session: SearchSession,
    initial_term: &str,
    input: R,
    out: &mut W,
    shutdown: impl Future<Output = ()>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut reading = true;
    tokio::pin!(shutdown);

    submit(&mut session, initial_term, out)?;

    // After end of input, keep applying completions until nothing is in flight.
    while reading || session.in_flight() > 0 {
        tokio::select! {
            line = lines.next_line(), if reading => match line? {
                Some(line) if line.trim() == QUIT => break,
                Some(line) => submit(&mut session, &line, out)?,
                None => {
                    debug!(target: "cli", in_flight = session.in_flight(), "end of input");
                    reading = false;
                }
            },
            Some(completion) = session.next_completion() => {
                match session.apply(completion) {
                    Applied::Replaced(_) => show(out, session.results())?,
                    Applied::Failed(err) => {
                        eprintln!("search failed: {err}");
                    }
                    Applied::Cleared | Applied::Stale => {}
                }
            }
            _ = &mut shutdown => break,
        }
    }

    info!(target: "cli", in_flight = session.in_flight(), "exiting");
    Ok(())
}

fn submit<W: Write>(session: &mut SearchSession, term: &str, out: &mut W) -> io::Result<()> {
    match session.submit(term) {
        Submission::Cleared => show(out, session.results()),
        Submission::Issued(_) => Ok(()),
    }
}

fn show<W: Write>(out: &mut W, results: &SearchResult) -> io::Result<()> {
    out.write_all(render(results).as_bytes())?;
    out.flush()
}

fn render(results: &SearchResult) -> String {
    if results.is_empty() {
        return "no results\n".to_string();
    }

    let mut out = String::new();
    for (i, track) in results.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, track.title);
        let _ = writeln!(out, "     {}", track.album_or_collection_name);
    }
    out
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(err) => {
                warn!(target: "cli", error = %err, "cannot install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!(target: "cli", "shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use tunesearch_application::StalePolicy;
    use tunesearch_itunes::{QueryClient, Track, Transport, TransportError};
    use url::Url;

    /// Transport that answers every search after a short delay.
    struct SlowTransport {
        body: Vec<u8>,
        delay: Duration,
    }

    #[async_trait]
    impl Transport for SlowTransport {
        async fn get(&self, _url: &Url) -> std::result::Result<Vec<u8>, TransportError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.body.clone())
        }
    }

    fn slow_session() -> SearchSession {
        let body = serde_json::json!({
            "results": [{
                "trackId": 1440806041,
                "trackName": "Bohemian Rhapsody",
                "collectionName": "A Night at the Opera"
            }]
        });
        let transport = Arc::new(SlowTransport {
            body: body.to_string().into_bytes(),
            delay: Duration::from_millis(50),
        });
        let client = QueryClient::builder().transport(transport).build().unwrap();
        SearchSession::new(client, StalePolicy::Discard)
    }

    #[tokio::test]
    async fn test_interactive_waits_for_in_flight_search_after_eof() {
        let mut out = Vec::new();

        run_interactive(
            slow_session(),
            "",
            &b"queen\n"[..],
            &mut out,
            std::future::pending(),
        )
        .await
        .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(
            printed,
            "no results\n  1. Bohemian Rhapsody\n     A Night at the Opera\n"
        );
    }

    #[tokio::test]
    async fn test_interactive_quit_stops_without_waiting() {
        let mut out = Vec::new();

        run_interactive(
            slow_session(),
            "",
            &b"queen\n:q\n"[..],
            &mut out,
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "no results\n");
    }

    #[tokio::test]
    async fn test_interactive_shutdown_interrupts_draining() {
        let mut out = Vec::new();

        run_interactive(
            slow_session(),
            "",
            &b"queen\n"[..],
            &mut out,
            std::future::ready(()),
        )
        .await
        .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "no results\n");
    }

    #[test]
    fn test_render_lists_tracks_in_order() {
        let results = SearchResult::from(vec![
            Track {
                id: 1,
                title: "Billie Jean".to_string(),
                album_or_collection_name: "Thriller".to_string(),
            },
            Track {
                id: 2,
                title: "Bad".to_string(),
                album_or_collection_name: "Bad".to_string(),
            },
        ]);

        assert_eq!(
            render(&results),
            "  1. Billie Jean\n     Thriller\n  2. Bad\n     Bad\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&SearchResult::empty()), "no results\n");
    }

    #[test]
    fn test_args_parse_once_and_config() {
        let args = Args::parse_from(["tunesearch", "--config", "t.toml", "--once", "michael jackson"]);
        assert_eq!(args.config, Some(PathBuf::from("t.toml")));
        assert_eq!(args.once.as_deref(), Some("michael jackson"));
    }

    #[test]
    fn test_args_default_to_interactive() {
        let args = Args::parse_from(["tunesearch"]);
        assert!(args.config.is_none());
        assert!(args.once.is_none());
    }
}
