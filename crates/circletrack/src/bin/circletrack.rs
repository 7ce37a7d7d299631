use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use circletrack::capture::ImageSequenceSource;
use circletrack::command::{
    Command, CommandClient, CommandError, CommandPoller, EnabledFlag, HttpCommandSource,
};
use circletrack::config::AppConfig;
use circletrack::detect::DetectionPipeline;
use circletrack::runner::{FrameLoop, LoopExit, RunError};
use circletrack::sink::AnnotatedImageSink;
use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};

/// Circle target tracker with remote arming and foreign-object warnings.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace). With the `tracing`
    /// feature, `RUST_LOG` takes precedence when set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit JSON logs (requires the `tracing` feature).
    #[arg(long, global = true, default_value_t = false)]
    json_log: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Track a target over a directory of frames.
    Run {
        /// JSON config; defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Input frame directory (overrides `source.input_dir`).
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output directory (overrides `sink.output_dir`).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Stop after this many frames (overrides `sink.max_frames`).
        #[arg(long)]
        max_frames: Option<u64>,
        /// Force the armed flag on and skip remote polling.
        #[arg(long, default_value_t = false)]
        armed: bool,
    },
    /// Run the pipeline on a single image and print the result as JSON.
    Detect {
        image: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Process as if the armed flag were off.
        #[arg(long, default_value_t = false)]
        disarmed: bool,
    },
    /// Send a command to the remote command service.
    Send {
        /// `start` or `stop`.
        action: Command,
        /// Endpoint (overrides `command.send_url`).
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig, RunError> {
    match path {
        Some(path) => Ok(AppConfig::load_json(path)?),
        None => Ok(AppConfig::default()),
    }
}

fn run(
    config: AppConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    max_frames: Option<u64>,
    armed: bool,
) -> Result<LoopExit, Box<dyn std::error::Error>> {
    let input = input
        .or(config.source.input_dir.clone())
        .ok_or("no input directory: pass --input or set source.input_dir")?;
    let output = output.unwrap_or_else(|| config.sink.output_dir.clone());
    let max_frames = max_frames.or(config.sink.max_frames);

    let mut source = ImageSequenceSource::open(&input).map_err(RunError::from)?;
    let mut sink = AnnotatedImageSink::create(&output, max_frames).map_err(RunError::from)?;

    let flag = EnabledFlag::new(armed);
    let poller = if armed {
        info!("armed from the command line; remote polling disabled");
        None
    } else {
        let remote =
            HttpCommandSource::new(config.command.poll_url.clone(), config.command.request_timeout());
        info!("polling {}", remote.url());
        Some(
            CommandPoller::spawn(remote, flag.clone(), config.command.poller())
                .map_err(RunError::Poller)?,
        )
    };

    let mut frame_loop = FrameLoop::new(
        DetectionPipeline::new(config.pipeline.clone()),
        config.stability.tracker(),
        flag,
    );
    let summary = frame_loop.run(&mut source, &mut sink);

    if let Some(poller) = poller {
        poller.stop();
    }
    let summary = summary?;
    info!(
        "processed {} frames into {}",
        summary.frames,
        sink.dir().display()
    );
    Ok(summary.exit)
}

fn detect(
    config: AppConfig,
    image: PathBuf,
    disarmed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = image::open(&image)?.to_rgb8();
    let result = DetectionPipeline::new(config.pipeline).process(&frame, !disarmed);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Mirrors the control-panel messages.
fn send_message(result: &Result<String, CommandError>) -> String {
    match result {
        Ok(state) => format!("state: {state}"),
        Err(CommandError::Status(code)) => format!("Error: {code}"),
        Err(CommandError::Connection(_)) => "Connection Error".to_string(),
        Err(CommandError::Timeout) => "Request Timed Out".to_string(),
        Err(other) => format!("Error: {other}"),
    }
}

fn init_logging(level: LevelFilter, json: bool) {
    #[cfg(feature = "tracing")]
    circletrack::core::init_tracing(json, level);
    #[cfg(not(feature = "tracing"))]
    {
        if json {
            eprintln!("--json-log needs the `tracing` feature; using plain logs");
        }
        if let Err(err) = circletrack::core::init_with_level(level) {
            eprintln!("failed to install logger: {err}");
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = LevelFilter::from_str(&cli.log_level).unwrap_or(LevelFilter::Info);
    init_logging(level, cli.json_log);

    let outcome: Result<ExitCode, Box<dyn std::error::Error>> = match cli.command {
        Cmd::Run {
            config,
            input,
            output,
            max_frames,
            armed,
        } => load_config(config.as_ref())
            .map_err(Into::into)
            .and_then(|cfg| run(cfg, input, output, max_frames, armed))
            .map(|exit| match exit {
                LoopExit::CaptureFailed(_) => ExitCode::from(2),
                LoopExit::Quit | LoopExit::EndOfStream => ExitCode::SUCCESS,
            }),
        Cmd::Detect {
            image,
            config,
            disarmed,
        } => load_config(config.as_ref())
            .map_err(Into::into)
            .and_then(|cfg| detect(cfg, image, disarmed))
            .map(|()| ExitCode::SUCCESS),
        Cmd::Send {
            action,
            url,
            config,
        } => load_config(config.as_ref()).map_err(Into::into).map(|cfg| {
            let url = url.unwrap_or_else(|| cfg.command.send_url.clone());
            let client = CommandClient::new(url, cfg.command.request_timeout());
            let result = client.send(action);
            println!("{}", send_message(&result));
            if result.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }),
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_messages_match_control_panel() {
        assert_eq!(send_message(&Ok("start".into())), "state: start");
        assert_eq!(send_message(&Err(CommandError::Status(503))), "Error: 503");
        assert_eq!(
            send_message(&Err(CommandError::Connection("refused".into()))),
            "Connection Error"
        );
        assert_eq!(send_message(&Err(CommandError::Timeout)), "Request Timed Out");
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "circletrack",
            "--log-level",
            "debug",
            "run",
            "--input",
            "frames",
            "--max-frames",
            "10",
            "--armed",
        ])
        .expect("parse");
        assert_eq!(
            LevelFilter::from_str(&cli.log_level).expect("level"),
            LevelFilter::Debug
        );
        match cli.command {
            Cmd::Run {
                input,
                max_frames,
                armed,
                ..
            } => {
                assert_eq!(input, Some(PathBuf::from("frames")));
                assert_eq!(max_frames, Some(10));
                assert!(armed);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_send_action() {
        assert!(Cli::try_parse_from(["circletrack", "send", "pause"]).is_err());
    }
}
