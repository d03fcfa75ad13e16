mod bot;
mod config;
mod stats;
mod transport;

use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use bot::{Bot, BotConfig};
use config::ClientConfig;
use skirmish::{Arena, Game, GameConfig, SystemClock, WireMessage};
use stats::SessionStats;
use transport::ChannelTransport;

#[derive(Parser)]
#[command(name = "skirmish-bot")]
#[command(about = "Headless skirmish client driven by a bot")]
struct Args {
    #[arg(short, long, default_value = config::DEFAULT_SERVER_URL, help = "Relay WebSocket URL")]
    server: String,

    #[arg(short, long, default_value_t = 60)]
    frame_rate: u32,

    #[arg(short, long, help = "Stop after this many seconds")]
    duration: Option<u64>,

    #[arg(long, help = "Seed for spawn jitter and bot decisions")]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = ClientConfig {
        server_url: args.server,
        frame_rate: args.frame_rate.max(1),
        duration: args.duration.map(Duration::from_secs),
        seed: args.seed,
        ..Default::default()
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))
}

async fn run(config: ClientConfig) -> Result<()> {
    let (ws_stream, _) = connect_async(config.server_url.as_str()).await?;
    log::info!("Connected to {}", config.server_url);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
                log::warn!("Failed to send frame: {}", e);
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel::<WireMessage>();
    let reader = tokio::spawn(async move {
        while let Some(frame) = ws_receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => match WireMessage::decode(text.as_str()) {
                    Ok(message) => {
                        if inbound_tx.send(message).is_err() {
                            break;
                        }
                    }
                    Err(e) => log::warn!("Ignoring frame: {}", e),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    log::warn!("WebSocket error: {}", e);
                    break;
                }
            }
        }
    });

    let seed = config.seed.unwrap_or_else(rand::random);
    let mut game = Game::with_seed(GameConfig::default(), Rc::new(SystemClock), Arena::new(), seed);
    let mut transport = ChannelTransport::new(outbound_tx);
    let mut bot = Bot::new(BotConfig::default(), seed);
    let mut session = SessionStats::new(config.frame_rate);

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / config.frame_rate as f64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let started = Instant::now();
    let mut last_frame = started;
    let mut last_report = started;

    'frames: loop {
        ticker.tick().await;
        let now = Instant::now();
        let delta = now.duration_since(last_frame).as_secs_f32().min(0.1);
        last_frame = now;

        loop {
            match inbound_rx.try_recv() {
                Ok(message) => {
                    game.handle_inbound(&message.event, &message.payload);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::info!("Relay closed the connection");
                    break 'frames;
                }
            }
        }

        let input = bot.think(&game, delta);
        let report = game.update(&input, delta);
        for peer_id in &report.hits {
            log::debug!("Hit {}", peer_id);
        }
        game.tick_network(delta, &mut transport);

        for notification in game.notifications().drain() {
            log::info!("[{:?}] {} {}", notification.icon, notification.title, notification.body);
        }
        // Nothing renders the scene here.
        game.scene().drain();

        session.record_frame(delta);

        if last_report.elapsed() >= config.report_interval {
            last_report = Instant::now();
            let window = session.take_window(game.stats(), transport.frames_sent());
            log::info!(
                "{} | health {} | {} | {} peers | {} fired, {} hits | {} in, {} dropped, {} out | {:.0} fps",
                game.local_id(),
                game.player().health(),
                game.ammo_indicator().label(),
                game.remotes().len(),
                window.bullets_fired,
                window.hits_dealt,
                window.inbound_applied,
                window.inbound_dropped,
                window.frames_out,
                window.fps
            );
            if window.late_frames > 0 {
                log::warn!(
                    "{} of {} frames ran late, worst {:.1}ms",
                    window.late_frames,
                    window.frames,
                    window.worst_frame_ms
                );
            }
        }

        if let Some(duration) = config.duration {
            if started.elapsed() >= duration {
                break;
            }
        }
    }

    game.flush(&mut transport);
    drop(transport);
    let _ = writer.await;
    reader.abort();

    log::info!("Disconnected after {:.1}s", started.elapsed().as_secs_f32());
    Ok(())
}
