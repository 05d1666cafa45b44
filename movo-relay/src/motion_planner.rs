use crate::messages::{ArmSide, PoseStamped, RobotTrajectory};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("planner returned an empty trajectory for {group}")]
    EmptyTrajectory { group: String },
    #[error("{call} call timed out after {timeout_ms}ms")]
    Timeout { call: &'static str, timeout_ms: u64 },
    #[error("planning service error: {0}")]
    Service(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected reply to {call} call")]
    UnexpectedReply { call: &'static str },
}

type Result<T> = std::result::Result<T, PlannerError>;

/// Planning and execution backend for both arm groups
#[async_trait]
pub trait MotionPlanner: Send + Sync {
    /// Plan from the current configuration of `arm` to `target`
    ///
    /// An empty trajectory means planning failed
    async fn plan(&self, arm: ArmSide, target: &PoseStamped) -> Result<RobotTrajectory>;
    async fn execute(&self, arm: ArmSide, trajectory: &RobotTrajectory) -> Result<bool>;
    async fn current_pose(&self, arm: ArmSide) -> Result<PoseStamped>;
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to encode plan")]
    Encoding(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outbound channel observers use to see freshly planned trajectories
#[async_trait]
pub trait PlanPublisher: Send + Sync {
    async fn publish_plan(
        &self,
        arm: ArmSide,
        trajectory: &RobotTrajectory,
    ) -> std::result::Result<(), PublishError>;
}
