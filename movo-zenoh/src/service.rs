//! Wire protocol spoken with the planning service
//!
//! Requests go out on `<prefix>/request`, replies come back on
//! `<prefix>/response` carrying the id of the request they answer.

use movo_relay::messages::{PoseStamped, RobotTrajectory};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum ServiceCall {
    Plan { target: PoseStamped },
    Execute { trajectory: RobotTrajectory },
    CurrentPose,
}

impl ServiceCall {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceCall::Plan { .. } => "plan",
            ServiceCall::Execute { .. } => "execute",
            ServiceCall::CurrentPose => "current_pose",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    pub id: Uuid,
    /// Arm group the call is for
    pub group: String,
    #[serde(flatten)]
    pub call: ServiceCall,
}

impl ServiceRequest {
    pub fn new(group: impl Into<String>, call: ServiceCall) -> Self {
        Self {
            id: Uuid::new_v4(),
            group: group.into(),
            call,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum ServiceReply {
    Plan { trajectory: RobotTrajectory },
    Execute { success: bool },
    CurrentPose { pose: PoseStamped },
    Error { message: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub reply: ServiceReply,
}
