use crate::{
    error::WrapperError,
    pending::Pending,
    service::{ServiceCall, ServiceReply, ServiceRequest, ServiceResponse},
};
use async_trait::async_trait;
use movo_relay::{
    messages::{ArmSide, PoseStamped, RobotTrajectory},
    motion_planner::{MotionPlanner, PlanPublisher, PlannerError, PublishError},
    relay_config::RelayConfig,
};
use std::{sync::Arc, time::Duration};
use tokio::{sync::oneshot, task::JoinHandle};
use tracing::{error, trace, warn};
use uuid::Uuid;
use zenoh::{prelude::r#async::*, publication::Publisher, Session};

/// Planning service client
///
/// Requests are correlated with replies by id, a background task routes
/// every reply to whoever is waiting for it.
pub struct ZenohMotionPlanner {
    requests: Publisher<'static>,
    pending: Pending,
    config: RelayConfig,
    reply_router: JoinHandle<()>,
}

impl ZenohMotionPlanner {
    pub async fn new(session: Arc<Session>, config: RelayConfig) -> Result<Self, WrapperError> {
        let prefix = &config.topics.planning_service;
        let requests = session
            .declare_publisher(format!("{}/request", prefix))
            .res()
            .await?;
        let responses = session
            .declare_subscriber(format!("{}/response", prefix))
            .res()
            .await?;

        let pending = Pending::new();
        let reply_router = tokio::spawn({
            let pending = pending.clone();
            async move {
                while let Ok(sample) = responses.recv_async().await {
                    let payload = sample.value.payload.contiguous();
                    match serde_json::from_slice::<ServiceResponse>(&payload) {
                        Ok(response) => {
                            trace!(id = %response.id, "Planning service reply");
                            pending.complete(response.id, response.reply);
                        }
                        Err(error) => warn!(%error, "Malformed planning service reply"),
                    }
                }
                error!("Planning service reply subscriber closed");
            }
        });

        Ok(Self {
            requests,
            pending,
            config,
            reply_router,
        })
    }

    async fn call(
        &self,
        arm: ArmSide,
        call: ServiceCall,
        timeout_ms: u64,
    ) -> Result<ServiceReply, PlannerError> {
        let name = call.name();
        let request = ServiceRequest::new(self.config.group_for(arm), call);
        let id = request.id;
        let payload =
            serde_json::to_string(&request).map_err(|e| PlannerError::Transport(e.to_string()))?;

        let receiver = self.pending.register(id);
        if let Err(error) = self.requests.put(payload).res().await {
            self.pending.cancel(&id);
            return Err(PlannerError::Transport(error.to_string()));
        }
        wait_for_reply(&self.pending, id, receiver, name, timeout_ms).await
    }
}

/// Waits for the reply registered under `id`, dropping the waiter on timeout
async fn wait_for_reply(
    pending: &Pending,
    id: Uuid,
    receiver: oneshot::Receiver<ServiceReply>,
    call: &'static str,
    timeout_ms: u64,
) -> Result<ServiceReply, PlannerError> {
    match tokio::time::timeout(Duration::from_millis(timeout_ms), receiver).await {
        Ok(Ok(ServiceReply::Error { message })) => Err(PlannerError::Service(message)),
        Ok(Ok(reply)) => Ok(reply),
        Ok(Err(_)) => Err(PlannerError::Transport(
            "reply channel closed".to_owned(),
        )),
        Err(_) => {
            pending.cancel(&id);
            Err(PlannerError::Timeout { call, timeout_ms })
        }
    }
}

fn into_trajectory(reply: ServiceReply) -> Result<RobotTrajectory, PlannerError> {
    match reply {
        ServiceReply::Plan { trajectory } => Ok(trajectory),
        _ => Err(PlannerError::UnexpectedReply { call: "plan" }),
    }
}

fn into_success(reply: ServiceReply) -> Result<bool, PlannerError> {
    match reply {
        ServiceReply::Execute { success } => Ok(success),
        _ => Err(PlannerError::UnexpectedReply { call: "execute" }),
    }
}

fn into_pose(reply: ServiceReply) -> Result<PoseStamped, PlannerError> {
    match reply {
        ServiceReply::CurrentPose { pose } => Ok(pose),
        _ => Err(PlannerError::UnexpectedReply {
            call: "current_pose",
        }),
    }
}

impl Drop for ZenohMotionPlanner {
    fn drop(&mut self) {
        self.reply_router.abort();
    }
}

#[async_trait]
impl MotionPlanner for ZenohMotionPlanner {
    async fn plan(
        &self,
        arm: ArmSide,
        target: &PoseStamped,
    ) -> Result<RobotTrajectory, PlannerError> {
        let call = ServiceCall::Plan {
            target: target.clone(),
        };
        into_trajectory(
            self.call(arm, call, self.config.service_call_timeout_ms)
                .await?,
        )
    }

    async fn execute(
        &self,
        arm: ArmSide,
        trajectory: &RobotTrajectory,
    ) -> Result<bool, PlannerError> {
        let call = ServiceCall::Execute {
            trajectory: trajectory.clone(),
        };
        into_success(self.call(arm, call, self.config.execution_timeout_ms).await?)
    }

    async fn current_pose(&self, arm: ArmSide) -> Result<PoseStamped, PlannerError> {
        into_pose(
            self.call(
                arm,
                ServiceCall::CurrentPose,
                self.config.service_call_timeout_ms,
            )
            .await?,
        )
    }
}

/// Publishes fresh plans on the per arm plan topics
pub struct ZenohPlanPublisher {
    left: Publisher<'static>,
    right: Publisher<'static>,
}

impl ZenohPlanPublisher {
    pub async fn new(session: Arc<Session>, config: &RelayConfig) -> Result<Self, WrapperError> {
        let left = session
            .declare_publisher(config.plan_topic_for(ArmSide::Left).to_owned())
            .res()
            .await?;
        let right = session
            .declare_publisher(config.plan_topic_for(ArmSide::Right).to_owned())
            .res()
            .await?;
        Ok(Self { left, right })
    }
}

#[async_trait]
impl PlanPublisher for ZenohPlanPublisher {
    async fn publish_plan(
        &self,
        arm: ArmSide,
        trajectory: &RobotTrajectory,
    ) -> Result<(), PublishError> {
        let json = serde_json::to_string(trajectory)?;
        let publisher = match arm {
            ArmSide::Left => &self.left,
            ArmSide::Right => &self.right,
        };
        publisher
            .put(json)
            .res()
            .await
            .map_err(|error| PublishError::Transport(error.to_string()))
    }
}
