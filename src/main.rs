use clap::{Parser, Subcommand};
use genesis_vgm::chips::{RecordingSink, SinkEvent, TraceSink};
use genesis_vgm::clock::SAMPLE_RATE;
use genesis_vgm::vgm::{self, VgmHeader};
use genesis_vgm::{ManualClock, Player};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "genesis-vgm")]
#[command(version = "0.1.0")]
#[command(about = "Play Sega Genesis VGM/VGZ logs", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the parsed header as JSON
    Info {
        /// Input VGM or VGZ file
        input: PathBuf,

        /// Output compact JSON (default is pretty-printed)
        #[arg(short, long)]
        compact: bool,
    },
    /// Play in real time, logging chip writes
    Play {
        /// Input VGM or VGZ file
        input: PathBuf,

        /// Loop forever at the loop point
        #[arg(short, long = "loop")]
        looping: bool,

        /// Loop this many times, then finish
        #[arg(long)]
        loops: Option<u32>,

        /// Microseconds between scheduler polls
        #[arg(long, default_value_t = 500)]
        poll_us: u64,
    },
    /// Run the log as fast as possible and print every chip write as JSON
    Dump {
        /// Input VGM or VGZ file
        input: PathBuf,

        /// Loop this many times before finishing
        #[arg(long, default_value_t = 0)]
        loops: u32,

        /// Output JSON file (writes to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (default is pretty-printed)
        #[arg(short, long)]
        compact: bool,
    },
}

#[derive(Serialize)]
struct Dump {
    header: VgmHeader,
    samples_played: u64,
    loop_count: u32,
    events: Vec<SinkEvent>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Info { input, compact } => {
            let header = vgm::read_header(input)?;
            emit(&header, None, compact)?;
        }
        Command::Play {
            input,
            looping,
            loops,
            poll_us,
        } => play(input, looping || loops.is_some(), loops, poll_us)?,
        Command::Dump {
            input,
            loops,
            output,
            compact,
        } => {
            let dump = dump(input, loops)?;
            emit(&dump, output, compact)?;
        }
    }

    Ok(())
}

fn play(
    input: PathBuf,
    looping: bool,
    max_loops: Option<u32>,
    poll_us: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut player = Player::new(TraceSink::new());
    player.set_looping(looping);
    player.set_max_loops(max_loops);
    player.play_file(&input)?;

    let poll = Duration::from_micros(poll_us);
    while player.is_playing() {
        player.update();
        std::thread::sleep(poll);
    }

    let sink = player.sink();
    tracing::info!(
        "{} samples, {} loops: {} PSG, {} FM, {} DAC writes",
        player.samples_played(),
        player.loop_count(),
        sink.psg_writes(),
        sink.fm_writes(),
        sink.dac_writes()
    );
    player.stop();
    Ok(())
}

fn dump(input: PathBuf, loops: u32) -> Result<Dump, Box<dyn std::error::Error>> {
    let clock = ManualClock::new();
    let mut player = Player::with_clock(RecordingSink::new(), clock.clone());
    player.set_looping(loops > 0);
    player.set_max_loops(Some(loops));
    player.play_file(&input)?;

    // One frame of samples per poll
    let frame = (SAMPLE_RATE / 60) as u64;
    while player.is_playing() {
        clock.advance_samples(frame);
        player.update();
    }

    let header = player.header().cloned().unwrap_or_default();
    let samples_played = player.samples_played();
    let loop_count = player.loop_count();
    let events = player.into_sink().take_events();
    Ok(Dump {
        header,
        samples_played,
        loop_count,
        events,
    })
}

fn emit<T: Serialize>(
    value: &T,
    output: Option<PathBuf>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_string = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };

    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json_string.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => println!("{}", json_string),
    }
    Ok(())
}
