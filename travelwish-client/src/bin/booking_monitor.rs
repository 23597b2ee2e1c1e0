//! booking-monitor: watch and act on a provider's bookings from a terminal
//!
//! Usage:
//!   booking-monitor          live dashboard over the event stream
//!   booking-monitor poll     pending-only dashboard over REST
//!
//! Commands on stdin: `list`, `confirm <id>`, `reject <id>`, `retry` (poll
//! mode), `quit`.

use shared::{Booking, BookingStatus};
use tokio::io::{AsyncBufReadExt, BufReader};
use travelwish_client::{
    ClientConfig, LiveUpdateListener, PageScope, PollRefresher, RequestDispatcher,
    StatusUpdateDispatcher, StreamDispatcher, logging,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

enum Command {
    List,
    SetStatus(String, BookingStatus),
    Retry,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("list"), None) => Ok(Command::List),
        (Some("retry"), None) => Ok(Command::Retry),
        (Some("quit" | "exit"), None) => Ok(Command::Quit),
        (Some(verb @ ("confirm" | "reject")), Some(id)) => {
            let status = verb.parse::<BookingStatus>().map_err(|e| e.to_string())?;
            Ok(Command::SetStatus(id.to_string(), status))
        }
        _ => Err(format!("unrecognised command: {line}")),
    }
}

fn print_bookings(bookings: &[Booking]) {
    if bookings.is_empty() {
        println!("(no bookings)");
        return;
    }
    for b in bookings {
        println!(
            "{:<26} {:<10} {} {:>2} guests  {:<12} {}",
            b.id,
            b.status,
            b.booking_date.format("%Y-%m-%d %H:%M"),
            b.guests,
            b.table_type,
            b.customer_name,
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    if std::env::var("TRAVELWISH_LOG_FORMAT").as_deref() == Ok("json") {
        logging::init_json();
    } else {
        logging::init();
    }

    let config = ClientConfig::from_env()?;
    let poll_mode = std::env::args().nth(1).as_deref() == Some("poll");
    let scope = PageScope::mount();

    let result = if poll_mode {
        run_poll(&config, &scope).await
    } else {
        run_live(&config, &scope).await
    };

    scope.unmount();
    if let Err(ref e) = result {
        tracing::error!("booking-monitor failed: {e}");
    }
    result
}

async fn run_live(config: &ClientConfig, scope: &PageScope) -> Result<(), BoxError> {
    let listener = LiveUpdateListener::spawn(config.ws_url(), scope);
    if !listener.opened().await {
        return Err(format!("could not connect to {}", config.ws_url()).into());
    }
    let dispatcher = StreamDispatcher::new(listener.handle(), scope.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = listener.closed() => {
                eprintln!("connection closed");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::List) => print_bookings(&scope.snapshot()),
            Ok(Command::SetStatus(id, status)) => {
                if let Err(e) = dispatcher.update_status(&id, status).await {
                    eprintln!("{e}");
                }
            }
            Ok(Command::Retry) => eprintln!("retry is only available in poll mode"),
            Ok(Command::Quit) => break,
            Err(e) => eprintln!("{e}"),
        }
    }

    listener.close().await;
    Ok(())
}

async fn run_poll(config: &ClientConfig, scope: &PageScope) -> Result<(), BoxError> {
    let provider_id = config.require_provider_id()?.clone();
    let http = config.build_http_client()?;
    let refresher = PollRefresher::new(http.clone(), provider_id, scope.clone());
    let dispatcher = RequestDispatcher::new(http, scope.clone());

    let refresh = |outcome: Result<usize, travelwish_client::ClientError>| match outcome {
        Ok(count) => println!("{count} pending booking(s)"),
        Err(_) => eprintln!("{} (type `retry`)", refresher.error().unwrap_or_default()),
    };

    refresh(refresher.refresh().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::List) => print_bookings(&scope.snapshot()),
            Ok(Command::SetStatus(id, status)) => {
                if let Err(e) = dispatcher.update_status(&id, status).await {
                    eprintln!("{e}");
                }
            }
            Ok(Command::Retry) => refresh(refresher.retry().await),
            Ok(Command::Quit) => break,
            Err(e) => eprintln!("{e}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert!(matches!(parse_command("list"), Ok(Command::List)));
        assert!(matches!(
            parse_command("confirm abc123"),
            Ok(Command::SetStatus(ref id, BookingStatus::Confirmed)) if id == "abc123"
        ));
        assert!(matches!(
            parse_command("  reject  x "),
            Ok(Command::SetStatus(_, BookingStatus::Rejected))
        ));
        assert!(parse_command("confirm").is_err());
        assert!(parse_command("list extra").is_err());
    }
}
