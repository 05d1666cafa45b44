use anyhow::Result;
use clap::{Parser, Subcommand};
use movo_relay::{
    messages::{ArmSide, GoalRequest, PoseStamped},
    relay_config::RelayConfig,
};
use movo_zenoh::{
    error::WrapperError,
    logging,
    session::{open_session, zenoh_config},
};
use std::{path::PathBuf, time::Duration};
use tokio::time::sleep;
use tracing::info;
use zenoh::prelude::r#async::*;

#[derive(Parser)]
#[command(author, version)]
struct Args {
    /// Relay config, json or yaml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Endpoints to connect to
    #[arg(long)]
    connect: Vec<String>,

    /// Sets the level of verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a goal pose for one arm
    Goal {
        #[arg(long, value_parser = parse_arm)]
        arm: ArmSide,

        /// Frame the pose is expressed in, defaults to the reference frame
        #[arg(long)]
        frame: Option<String>,

        /// x y z qx qy qz qw
        #[arg(num_args = 7, allow_negative_numbers = true, required = true)]
        pose: Vec<f64>,
    },
    /// Execute the last plan
    Execute,
    /// Ask for a plan to the current right arm pose
    Identity,
}

fn parse_arm(text: &str) -> Result<ArmSide, String> {
    text.parse().map_err(|error: movo_relay::messages::UnknownArm| error.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup_tracing(args.verbose, false);

    let config = match &args.config {
        Some(path) => RelayConfig::load(path)?,
        None => RelayConfig::included(),
    };
    let session = open_session(zenoh_config(None, &[], &args.connect)?).await?;

    let (topic, payload) = match args.command {
        Command::Goal { arm, frame, pose } => {
            let mut components = [0.0; 7];
            components.copy_from_slice(&pose);
            let frame = frame.unwrap_or_else(|| config.pose_reference_frame.clone());
            let request = GoalRequest::new(arm, PoseStamped::in_frame(frame, components));
            (
                config.topics.goal_pose.clone(),
                serde_json::to_string(&request)?,
            )
        }
        Command::Execute => (config.topics.move_to_goal.clone(), "execute".to_owned()),
        Command::Identity => (
            config.topics.identity_pose_request.clone(),
            "identity".to_owned(),
        ),
    };

    info!(%topic, "Publishing");
    session
        .put(topic, payload)
        .res()
        .await
        .map_err(WrapperError::from)?;
    // let the sample flush before the session closes
    sleep(Duration::from_millis(200)).await;
    Ok(())
}
