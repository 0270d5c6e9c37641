mod actions;
mod cmd;
mod util;

use std::{any::Any, process::ExitCode};

use tokio::task::JoinError;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::builder()
        // Default to info level
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    // stdout is reserved for workflow commands and --dry-run output
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_filter(env_filter))
        .init();

    let args: cmd::notify::Args = argp::parse_args_or_exit(argp::DEFAULT);
    match tokio::spawn(cmd::notify::run(args)).await {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            tracing::error!("{:?}", e);
            actions::set_failed(&format!("{e:#}"));
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{:?}", e);
            actions::set_failed(&unhandled_message(e));
            ExitCode::FAILURE
        }
    }
}

fn unhandled_message(e: JoinError) -> String {
    if !e.is_panic() {
        return format!("Unhandled Error: {e}");
    }
    let payload = e.into_panic();
    match panic_message(payload.as_ref()) {
        Some(message) => message.to_string(),
        None => "Unhandled Error: task panicked".to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else {
        payload.downcast_ref::<String>()?.as_str()
    };
    (!message.is_empty()).then_some(message)
}
