mod config;
mod connection;
mod events;
mod relay;
mod tui;

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

use config::RelayConfig;
use events::RelayEvent;
use relay::{Relay, SharedRelay};
use tui::TuiState;

#[derive(Parser)]
#[command(name = "skirmish-relay")]
#[command(about = "Skirmish multiplayer relay")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    #[arg(short, long, default_value_t = 32)]
    max_peers: usize,

    #[arg(long, default_value_t = 64 * 1024, help = "Largest accepted text frame in bytes")]
    max_frame_bytes: usize,

    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let bind_addr = format!("{}:{}", args.bind, args.port);

    let config = RelayConfig {
        max_peers: args.max_peers,
        max_frame_bytes: args.max_frame_bytes,
    };

    let runtime = Runtime::new()?;
    let listener = runtime.block_on(TcpListener::bind(&bind_addr))?;
    let local_addr = listener.local_addr()?;
    let relay = Relay::shared(config);

    if args.headless {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("Relay listening on {}", local_addr);
        runtime.block_on(run_headless(listener, relay.clone()))?;
        log::info!("Relay shutting down");
    } else {
        runtime.spawn(connection::serve(listener, relay.clone()));
        run_with_tui(&relay, local_addr)?;
    }

    relay.lock().disconnect_all();
    runtime.shutdown_timeout(Duration::from_secs(1));
    Ok(())
}

async fn run_headless(listener: TcpListener, relay: SharedRelay) -> io::Result<()> {
    let server = tokio::spawn(connection::serve(listener, relay.clone()));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(Duration::from_millis(250));

    let result = loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Relay already logs joins and leaves; only surface failures here.
                for event in relay.lock().drain_events() {
                    match event {
                        RelayEvent::ConnectionDenied { addr, reason } => {
                            log::warn!("Connection denied to {}: {}", addr, reason);
                        }
                        RelayEvent::Error { message } => log::error!("{}", message),
                        _ => {}
                    }
                }
            }
            signal = &mut shutdown => break signal,
        }
    };

    server.abort();
    result
}

fn run_with_tui(relay: &SharedRelay, local_addr: SocketAddr) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut tui_state = TuiState::new();
    tui_state.log_info(format!("Relay listening on {}", local_addr));

    let mut running = true;
    while running {
        let (stats, peers) = {
            let mut relay = relay.lock();
            for event in relay.drain_events() {
                match event {
                    RelayEvent::PeerConnected { peer_id, addr } => {
                        tui_state.log_info(format!("Peer {} connected from {}", peer_id, addr));
                    }
                    RelayEvent::PeerDisconnected { peer_id, reason } => {
                        tui_state.log_info(format!("Peer {} {}", peer_id, reason.as_str()));
                    }
                    RelayEvent::ConnectionDenied { addr, reason } => {
                        tui_state.log_warn(format!("Connection denied to {}: {}", addr, reason));
                    }
                    RelayEvent::Error { message } => {
                        tui_state.log_error(message);
                    }
                }
            }
            (relay.stats(), relay.peer_infos())
        };

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => running = false,
                        _ => {}
                    }
                }
            }
        }

        terminal.draw(|frame| {
            tui::render(frame, &tui_state, &stats, &peers);
        })?;
    }

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;

    Ok(())
}
