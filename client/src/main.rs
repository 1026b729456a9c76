use clap::Parser;
use client::input::{InputAction, TextInput};
use client::network::{NetworkClient, NetworkEvent};
use client::rendering::Renderer;
use client::session::{ChatSession, NamePrompt};
use log::{info, warn};
use macroquad::prelude::*;
use std::time::Instant;

/// Longest draft the name field accepts; validation reports anything over the real limit
const NAME_INPUT_LIMIT: usize = 32;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebSocket URL of the chat server
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:3000/ws")]
    server: String,

    /// Window width
    #[arg(short = 'w', long, default_value = "480")]
    width: i32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "720")]
    height: i32,
}

fn window_conf() -> Conf {
    let args = Args::parse();
    Conf {
        window_title: "Chat".to_string(),
        window_width: args.width,
        window_height: args.height,
        ..Default::default()
    }
}

enum Screen {
    Prompt {
        prompt: NamePrompt,
        input: TextInput,
    },
    Chat {
        session: ChatSession,
        input: TextInput,
        network: NetworkClient,
        connected: bool,
    },
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start network runtime: {}", e);
            return;
        }
    };

    let renderer = Renderer::new();
    let mut screen = Screen::Prompt {
        prompt: NamePrompt::new(),
        input: TextInput::with_limit(NAME_INPUT_LIMIT),
    };

    loop {
        let now = Instant::now();

        screen = match screen {
            Screen::Prompt {
                mut prompt,
                mut input,
            } => {
                let mut chosen = None;
                for action in input.poll() {
                    match action {
                        InputAction::Submitted(draft) => chosen = prompt.submit(&draft),
                        InputAction::Cancelled => chosen = Some(prompt.cancel()),
                        InputAction::Edited(_) | InputAction::None => {}
                    }
                    if chosen.is_some() {
                        break;
                    }
                }

                match chosen.map(|name| ChatSession::start(&name)) {
                    Some(Ok((session, join))) => {
                        info!("Joining {} as {}", args.server, session.username());
                        let network = NetworkClient::spawn(runtime.handle(), args.server.clone());
                        network.send(join);
                        Screen::Chat {
                            session,
                            input: TextInput::new(),
                            network,
                            connected: false,
                        }
                    }
                    Some(Err(e)) => {
                        prompt.error = Some(e);
                        renderer.render_prompt(&prompt, input.text());
                        Screen::Prompt { prompt, input }
                    }
                    None => {
                        renderer.render_prompt(&prompt, input.text());
                        Screen::Prompt { prompt, input }
                    }
                }
            }

            Screen::Chat {
                mut session,
                mut input,
                mut network,
                mut connected,
            } => {
                for event in network.poll() {
                    match event {
                        NetworkEvent::Connected => connected = true,
                        NetworkEvent::Inbound(inbound) => session.handle_inbound(inbound, now),
                        NetworkEvent::Disconnected { reason } => {
                            warn!("Disconnected: {}", reason);
                            connected = false;
                            session.notice(format!("Disconnected from server ({})", reason));
                        }
                    }
                }

                for action in input.poll() {
                    match action {
                        InputAction::Edited(draft) => {
                            if let Some(event) = session.input_changed(&draft, now) {
                                network.send(event);
                            }
                        }
                        InputAction::Submitted(draft) => {
                            for event in session.submit(&draft, now) {
                                network.send(event);
                            }
                        }
                        InputAction::Cancelled | InputAction::None => {}
                    }
                }

                if let Some(event) = session.tick(now) {
                    network.send(event);
                }

                renderer.render_chat(&session, input.text(), connected, now);
                Screen::Chat {
                    session,
                    input,
                    network,
                    connected,
                }
            }
        };

        next_frame().await;
    }
}
