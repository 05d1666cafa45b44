use crate::{
    messages::{ArmSide, GoalRequest, Plan, PoseStamped},
    motion_planner::{MotionPlanner, PlanPublisher, PlannerError},
    relay_config::RelayConfig,
};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

/// Snapshot of what the relay currently holds
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelayState {
    pub current_plan: Option<Plan>,
    pub current_arm: Option<ArmSide>,
    pub planning_in_progress: bool,
}

#[derive(Debug)]
pub enum GoalOutcome {
    /// Selector was empty or named an unknown arm
    Ignored { selector: String },
    Planned { arm: ArmSide, published: bool },
    PlanningFailed { arm: ArmSide, error: PlannerError },
}

#[derive(Debug)]
pub enum ExecuteOutcome {
    NoArmSelected,
    NothingToExecute { arm: ArmSide },
    Executed { arm: ArmSide, success: bool },
    ExecutionFailed { arm: ArmSide, error: PlannerError },
    /// Planning did not finish within the configured wait
    PlanningTimedOut,
}

#[derive(Default)]
struct PlanSlot {
    current_plan: Option<Plan>,
    current_arm: Option<ArmSide>,
}

/// Raises the planning flag for as long as it lives
struct PlanningGuard<'a> {
    flag: &'a watch::Sender<bool>,
}

impl<'a> PlanningGuard<'a> {
    fn raise(flag: &'a watch::Sender<bool>) -> Self {
        flag.send_replace(true);
        Self { flag }
    }
}

impl Drop for PlanningGuard<'_> {
    fn drop(&mut self) {
        self.flag.send_replace(false);
    }
}

/// Relays VR goal poses to the planner and executes the latest plan on request
///
/// The plan slot lock is held for the whole duration of a planning call.
/// Execution acquires the same lock before reading the plan so it never
/// overlaps with planning, but it releases the lock before the robot moves.
/// Goals arriving during execution therefore replace the stored plan.
pub struct GoalRelay {
    planner: Box<dyn MotionPlanner>,
    publisher: Box<dyn PlanPublisher>,
    config: RelayConfig,
    slot: Mutex<PlanSlot>,
    planning: watch::Sender<bool>,
}

impl GoalRelay {
    pub fn new(
        planner: Box<dyn MotionPlanner>,
        publisher: Box<dyn PlanPublisher>,
        config: RelayConfig,
    ) -> Self {
        let (planning, _) = watch::channel(false);
        Self {
            planner,
            publisher,
            config,
            slot: Mutex::new(PlanSlot::default()),
            planning,
        }
    }

    pub fn planning_in_progress(&self) -> bool {
        *self.planning.borrow()
    }

    pub fn subscribe_planning(&self) -> watch::Receiver<bool> {
        self.planning.subscribe()
    }

    /// Waits for any planning in flight before taking the snapshot
    pub async fn state(&self) -> RelayState {
        let slot = self.slot.lock().await;
        RelayState {
            current_plan: slot.current_plan.clone(),
            current_arm: slot.current_arm,
            planning_in_progress: self.planning_in_progress(),
        }
    }

    pub async fn on_goal_pose(&self, request: GoalRequest) -> GoalOutcome {
        let Some(arm) = request.arm() else {
            debug!(selector = %request.arm_to_move, "Ignoring goal without a known arm");
            return GoalOutcome::Ignored {
                selector: request.arm_to_move,
            };
        };
        let mut slot = self.slot.lock().await;
        let _planning = PlanningGuard::raise(&self.planning);
        slot.current_arm = Some(arm);
        info!(%arm, "Planning");

        let target = self.stamp(request.target_for(arm).clone());
        match self.plan_for(arm, &target).await {
            Ok(plan) => {
                let published = self.publish(&plan).await;
                slot.current_plan = Some(plan);
                info!(%arm, "Done planning");
                GoalOutcome::Planned { arm, published }
            }
            Err(error) => {
                error!(%arm, %error, "Plan failed");
                slot.current_plan = None;
                GoalOutcome::PlanningFailed { arm, error }
            }
        }
    }

    /// Trigger payload is ignored
    pub async fn on_execute_trigger(&self, _trigger: &[u8]) -> ExecuteOutcome {
        let wait = self.config.planning_wait_timeout();
        // the lock only covers the snapshot, a new goal may plan while this one executes
        let (arm, plan) = match tokio::time::timeout(wait, self.slot.lock()).await {
            Ok(slot) => (slot.current_arm, slot.current_plan.clone()),
            Err(_) => {
                warn!(
                    timeout_ms = self.config.planning_wait_timeout_ms,
                    "Planning still in progress, dropping execute request"
                );
                return ExecuteOutcome::PlanningTimedOut;
            }
        };

        let Some(arm) = arm else {
            debug!("No arm selected yet");
            return ExecuteOutcome::NoArmSelected;
        };
        let Some(plan) = plan else {
            warn!(%arm, "Nothing to execute");
            return ExecuteOutcome::NothingToExecute { arm };
        };

        match self.planner.execute(arm, &plan.trajectory).await {
            Ok(success) => {
                info!(%arm, success, "Execute status");
                ExecuteOutcome::Executed { arm, success }
            }
            Err(error) => {
                error!(%arm, %error, "Execution failed");
                ExecuteOutcome::ExecutionFailed { arm, error }
            }
        }
    }

    /// Plan to where the right arm already is
    ///
    /// Used to force observers to refresh their joint states
    pub async fn generate_identity_plan(&self, execute: bool) -> Option<Plan> {
        self.identity_plan(ArmSide::Right, execute).await
    }

    pub async fn identity_plan(&self, arm: ArmSide, execute: bool) -> Option<Plan> {
        let plan = {
            // serialized with goal planning, the stored plan is left alone
            let _slot = self.slot.lock().await;
            let _planning = PlanningGuard::raise(&self.planning);

            let current = match self.planner.current_pose(arm).await {
                Ok(pose) => pose,
                Err(error) => {
                    error!(%arm, %error, "Failed to read current pose");
                    return None;
                }
            };
            debug!(%arm, pose = ?current.pose.components(), "Identity target pose");

            let target = self.stamp(current);
            match self.plan_for(arm, &target).await {
                Ok(plan) => plan,
                Err(error) => {
                    error!(%arm, %error, "Identity plan failed");
                    return None;
                }
            }
        };
        self.publish(&plan).await;

        if execute {
            match self.planner.execute(arm, &plan.trajectory).await {
                Ok(success) => info!(%arm, success, "Identity execute status"),
                Err(error) => error!(%arm, %error, "Identity execution failed"),
            }
        }
        Some(plan)
    }

    async fn plan_for(&self, arm: ArmSide, target: &PoseStamped) -> Result<Plan, PlannerError> {
        let trajectory = self.planner.plan(arm, target).await?;
        if trajectory.is_empty() {
            return Err(PlannerError::EmptyTrajectory {
                group: self.config.group_for(arm).to_owned(),
            });
        }
        debug!(
            %arm,
            joints = trajectory.joint_trajectory.joint_names.len(),
            points = trajectory.joint_trajectory.points.len(),
            "Plan"
        );
        Ok(Plan::new(arm, trajectory))
    }

    async fn publish(&self, plan: &Plan) -> bool {
        match self.publisher.publish_plan(plan.arm, &plan.trajectory).await {
            Ok(()) => true,
            Err(error) => {
                warn!(arm = %plan.arm, %error, "Failed to publish plan");
                false
            }
        }
    }

    fn stamp(&self, mut target: PoseStamped) -> PoseStamped {
        if target.header.frame_id.is_empty() {
            target.header.frame_id = self.config.pose_reference_frame.clone();
        }
        target
    }
}
