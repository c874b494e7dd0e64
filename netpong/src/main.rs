use clap::{Parser, Subcommand};
use engine::{Phase, Session, TickOutput};
use log::{debug, error, info};
use macroquad::prelude::*;
use netpong::input::InputTracker;
use netpong::render::Renderer;
use netpong::transport::{Transport, TransportStatus};
use shared::{FIELD_HEIGHT, FIELD_WIDTH, PADDLE_START_OFFSET};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Display name sent to the opponent during the handshake
    #[arg(short, long, default_value = "player")]
    name: String,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Play offline against the scripted opponent
    Single,
    /// Host a match and wait for one opponent
    Host {
        /// Port to listen on; the full host:port is the join code
        #[arg(short, long, default_value = "7777")]
        port: u16,
    },
    /// Join a hosted match
    Join {
        /// Host address as host:port
        addr: String,
    },
}

fn window_conf() -> Conf {
    Conf {
        window_title: "netpong".to_string(),
        window_width: FIELD_WIDTH as i32,
        window_height: FIELD_HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            return;
        }
    };

    let mut session = Session::new(args.name.clone());
    let mut renderer = Renderer::new();
    let mut input = InputTracker::new();
    let mut transport: Option<Transport> = None;
    let mut link_announced = false;

    match &args.mode {
        Mode::Single => {
            let out = session.start_single();
            renderer.note_sounds(&out.sounds);
        }
        Mode::Host { port } => {
            session.start_host();
            match runtime.block_on(Transport::host(&format!("0.0.0.0:{}", port))) {
                Ok((t, addr)) => {
                    info!("Opponent can join with: netpong join {}", addr);
                    transport = Some(t);
                }
                Err(e) => {
                    error!("Failed to host on port {}: {}", port, e);
                    session.transport_failed("could not open listener");
                }
            }
        }
        Mode::Join { addr } => {
            session.start_join();
            match runtime.block_on(Transport::join(addr)) {
                Ok(t) => transport = Some(t),
                Err(e) => {
                    error!("Failed to join {}: {}", addr, e);
                    session.transport_failed("could not reach host");
                }
            }
        }
    }

    loop {
        if is_key_pressed(KeyCode::Escape) {
            if session.phase() == Phase::Menu {
                break;
            }
            // Explicit return to the menu tears the peer link down too.
            session.leave();
            transport = None;
            link_announced = false;
        }

        if session.phase() == Phase::Menu && is_key_pressed(KeyCode::Key1) {
            let out = session.start_single();
            renderer.note_sounds(&out.sounds);
        }

        let mut frame_out = TickOutput::default();
        let mut drop_transport = false;

        if let Some(link) = transport.as_mut() {
            match link.status() {
                TransportStatus::Open => {
                    if !link_announced {
                        link_announced = true;
                        merge(&mut frame_out, session.transport_opened());
                    }
                }
                TransportStatus::Closed | TransportStatus::Failed => {
                    if matches!(
                        session.phase(),
                        Phase::HostWaiting | Phase::Joining | Phase::Playing
                    ) {
                        session.transport_failed("peer link lost");
                    }
                    drop_transport = true;
                }
                TransportStatus::Connecting => {}
            }

            while let Some(message) = link.try_recv() {
                merge(&mut frame_out, session.handle_message(message));
            }
        }
        if drop_transport {
            transport = None;
            link_announced = false;
        }

        let current = session
            .local_side()
            .and_then(|side| session.match_state().map(|state| state.paddle(side)))
            .unwrap_or(PADDLE_START_OFFSET);
        let offset = input.desired_offset(current);

        merge(&mut frame_out, session.tick(offset));

        if let Some(link) = transport.as_ref() {
            for message in frame_out.outgoing.drain(..) {
                link.send(message);
            }
        }
        for cue in &frame_out.sounds {
            debug!("Sound cue: {:?}", cue);
        }
        renderer.note_sounds(&frame_out.sounds);

        renderer.draw(&session);
        next_frame().await;
    }
}

fn merge(into: &mut TickOutput, mut from: TickOutput) {
    into.outgoing.append(&mut from.outgoing);
    into.sounds.append(&mut from.sounds);
}
