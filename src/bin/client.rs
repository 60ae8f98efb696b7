//! Take Six player client.
//!
//! Without `--bot` it relays server lines to the terminal and sends what the
//! user types whenever the server asks for a card or a row. With `--bot` a
//! built-in strategy plays the whole game.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::info;

use take_six::agent::{play, StrategyKind};
use take_six::server::{logging, ServerMessage};

#[derive(Parser, Debug)]
#[command(author, version, about = "Take Six player client", long_about = None)]
struct ClientArgs {
    /// Server host
    host: String,

    /// Server port
    port: u16,

    /// Display name (at most 31 characters are kept)
    name: String,

    /// Play automatically: lowest or least-risk
    #[arg(long)]
    bot: Option<StrategyKind>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ClientArgs::parse();
    logging::init(args.debug)?;

    let stream = TcpStream::connect((args.host.as_str(), args.port))
        .await
        .with_context(|| format!("cannot connect to {}:{}", args.host, args.port))?;

    match args.bot {
        Some(kind) => {
            let mut strategy = kind.build();
            let summary = play(stream, &args.name, strategy.as_mut()).await?;
            info!(
                game = ?summary.game_id,
                scores = ?summary.scores,
                cards = summary.cards_played,
                completed = summary.completed(),
                "connection closed"
            );
            if let Some(standings) = &summary.standings {
                println!("{}", standings);
            }
            Ok(())
        }
        None => interactive(stream, &args.name).await,
    }
}

async fn interactive(stream: TcpStream, name: &str) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut server_lines = BufReader::new(reader).lines();
    let mut user_lines = BufReader::new(tokio::io::stdin()).lines();

    writer.write_all(format!("{}\n", name).as_bytes()).await?;

    while let Some(line) = server_lines.next_line().await? {
        println!("{}", line);

        let prompt = line
            .parse::<ServerMessage>()
            .map(|msg| msg.is_prompt())
            .unwrap_or(false);
        if !prompt {
            continue;
        }

        let Some(answer) = user_lines.next_line().await? else {
            break;
        };
        writer.write_all(format!("{}\n", answer.trim()).as_bytes()).await?;
    }
    Ok(())
}
