use anyhow::Result;
use clap::Parser;
use movo_relay::{
    goal_relay::{GoalOutcome, GoalRelay},
    messages::GoalRequest,
    relay_config::RelayConfig,
};
use movo_zenoh::{
    dispatch::keep_latest,
    error::WrapperError,
    logging,
    session::{open_session, zenoh_config},
    zenoh_planner::{ZenohMotionPlanner, ZenohPlanPublisher},
};
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, info, warn};
use zenoh::prelude::r#async::*;

#[derive(Parser)]
#[command(author, version)]
struct Args {
    /// Relay config, json or yaml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Zenoh config file
    #[arg(long)]
    zenoh_config: Option<PathBuf>,

    /// Endpoints to listen on
    #[arg(long)]
    listen: Vec<String>,

    /// Endpoints to connect to
    #[arg(long)]
    connect: Vec<String>,

    /// Don't send an identity plan on startup
    #[arg(long)]
    skip_startup_identity: bool,

    /// Log as json
    #[arg(long)]
    json_logs: bool,

    /// Sets the level of verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup_tracing(args.verbose, args.json_logs);

    let config = match &args.config {
        Some(path) => RelayConfig::load(path)?,
        None => RelayConfig::included(),
    };
    info!(
        left = %config.left_arm_group,
        right = %config.right_arm_group,
        reference_frame = %config.pose_reference_frame,
        "Arm groups"
    );

    let session = open_session(zenoh_config(
        args.zenoh_config.as_deref(),
        &args.listen,
        &args.connect,
    )?)
    .await?;

    let planner = ZenohMotionPlanner::new(session.clone(), config.clone()).await?;
    let publisher = ZenohPlanPublisher::new(session.clone(), &config).await?;
    let relay = Arc::new(GoalRelay::new(
        Box::new(planner),
        Box::new(publisher),
        config.clone(),
    ));

    let goals = session
        .declare_subscriber(config.topics.goal_pose.clone())
        .res()
        .await
        .map_err(WrapperError::from)?;
    let execute_triggers = session
        .declare_subscriber(config.topics.move_to_goal.clone())
        .res()
        .await
        .map_err(WrapperError::from)?;
    let identity_requests = session
        .declare_subscriber(config.topics.identity_pose_request.clone())
        .res()
        .await
        .map_err(WrapperError::from)?;

    // each topic gets its own task
    // goals and triggers that queued up while the relay was busy are stale, only the newest is handled
    let goal_task = tokio::spawn({
        let relay = relay.clone();
        async move {
            while let Ok(sample) = goals.recv_async().await {
                let (sample, dropped) = keep_latest(sample, || goals.try_recv().ok());
                if dropped > 0 {
                    debug!(dropped, "Skipped stale goal poses");
                }
                let payload = sample.value.payload.contiguous();
                let request: GoalRequest = match serde_json::from_slice(&payload) {
                    Ok(request) => request,
                    Err(error) => {
                        warn!(%error, "Dropping malformed goal pose");
                        continue;
                    }
                };
                if let GoalOutcome::Ignored { selector } = relay.on_goal_pose(request).await {
                    info!(%selector, "Goal pose names no arm");
                }
            }
        }
    });

    let execute_task = tokio::spawn({
        let relay = relay.clone();
        async move {
            while let Ok(sample) = execute_triggers.recv_async().await {
                let (sample, dropped) = keep_latest(sample, || execute_triggers.try_recv().ok());
                if dropped > 0 {
                    debug!(dropped, "Skipped stale execute triggers");
                }
                let outcome = relay
                    .on_execute_trigger(&sample.value.payload.contiguous())
                    .await;
                info!(?outcome, "Execute trigger handled");
            }
        }
    });

    let identity_task = tokio::spawn({
        let relay = relay.clone();
        async move {
            while identity_requests.recv_async().await.is_ok() {
                relay.generate_identity_plan(true).await;
            }
        }
    });

    if !args.skip_startup_identity {
        tokio::spawn({
            let relay = relay.clone();
            async move {
                if relay.generate_identity_plan(true).await.is_none() {
                    warn!("Startup identity plan failed");
                }
            }
        });
    }

    info!("Relay running");
    tokio::signal::ctrl_c().await?;
    info!("Detected Ctrl+c");

    goal_task.abort();
    execute_task.abort();
    identity_task.abort();
    Ok(())
}
