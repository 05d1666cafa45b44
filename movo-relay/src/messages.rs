use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmSide {
    Left,
    Right,
}

impl ArmSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArmSide::Left => "left",
            ArmSide::Right => "right",
        }
    }
}

impl fmt::Display for ArmSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownArm(pub String);

impl fmt::Display for UnknownArm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown arm {:?}", self.0)
    }
}

impl std::error::Error for UnknownArm {}

impl FromStr for ArmSide {
    type Err = UnknownArm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(ArmSide::Left),
            "right" => Ok(ArmSide::Right),
            other => Err(UnknownArm(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub frame_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
struct PointMsg {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct QuaternionMsg {
    x: f64,
    y: f64,
    z: f64,
    w: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct PoseMsg {
    position: PointMsg,
    orientation: QuaternionMsg,
}

/// End effector pose
///
/// Serialized the same way geometry_msgs/Pose is laid out in JSON
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PoseMsg", into = "PoseMsg")]
pub struct Pose {
    pub position: na::Vector3<f64>,
    pub orientation: na::Quaternion<f64>,
}

impl Pose {
    pub fn new(position: na::Vector3<f64>, orientation: na::Quaternion<f64>) -> Pose {
        Pose {
            position,
            orientation,
        }
    }

    /// Pose from `[x, y, z, qx, qy, qz, qw]`
    pub fn from_components(components: [f64; 7]) -> Pose {
        let [x, y, z, qx, qy, qz, qw] = components;
        Pose::new(
            na::Vector3::new(x, y, z),
            na::Quaternion::new(qw, qx, qy, qz),
        )
    }

    pub fn components(&self) -> [f64; 7] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.orientation.i,
            self.orientation.j,
            self.orientation.k,
            self.orientation.w,
        ]
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::new(na::Vector3::zeros(), na::Quaternion::identity())
    }
}

impl From<PoseMsg> for Pose {
    fn from(msg: PoseMsg) -> Self {
        let PoseMsg {
            position,
            orientation,
        } = msg;
        Pose::from_components([
            position.x,
            position.y,
            position.z,
            orientation.x,
            orientation.y,
            orientation.z,
            orientation.w,
        ])
    }
}

impl From<Pose> for PoseMsg {
    fn from(pose: Pose) -> Self {
        let [x, y, z, qx, qy, qz, qw] = pose.components();
        PoseMsg {
            position: PointMsg { x, y, z },
            orientation: QuaternionMsg {
                x: qx,
                y: qy,
                z: qz,
                w: qw,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseStamped {
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub pose: Pose,
}

impl PoseStamped {
    pub fn new(frame_id: impl Into<String>, pose: Pose) -> PoseStamped {
        PoseStamped {
            header: Header {
                frame_id: frame_id.into(),
            },
            pose,
        }
    }

    pub fn in_frame(frame_id: impl Into<String>, components: [f64; 7]) -> PoseStamped {
        PoseStamped::new(frame_id, Pose::from_components(components))
    }
}

/// Goal sent by the VR side
///
/// Carries a candidate pose for both arms, `arm_to_move` decides which one is meant
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GoalRequest {
    #[serde(default)]
    pub arm_to_move: String,
    #[serde(default)]
    pub left_arm: PoseStamped,
    #[serde(default)]
    pub right_arm: PoseStamped,
}

impl GoalRequest {
    pub fn new(arm: ArmSide, target: PoseStamped) -> GoalRequest {
        let mut request = GoalRequest {
            arm_to_move: arm.as_str().to_owned(),
            ..Default::default()
        };
        match arm {
            ArmSide::Left => request.left_arm = target,
            ArmSide::Right => request.right_arm = target,
        }
        request
    }

    /// `None` when the selector is empty or not a known arm
    pub fn arm(&self) -> Option<ArmSide> {
        self.arm_to_move.parse().ok()
    }

    pub fn target_for(&self, arm: ArmSide) -> &PoseStamped {
        match arm {
            ArmSide::Left => &self.left_arm,
            ArmSide::Right => &self.right_arm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointTrajectoryPoint {
    #[serde(default)]
    pub positions: Vec<f64>,
    #[serde(default)]
    pub velocities: Vec<f64>,
    #[serde(default)]
    pub accelerations: Vec<f64>,
    /// seconds
    #[serde(default)]
    pub time_from_start: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointTrajectory {
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub joint_names: Vec<String>,
    #[serde(default)]
    pub points: Vec<JointTrajectoryPoint>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotTrajectory {
    #[serde(default)]
    pub joint_trajectory: JointTrajectory,
}

impl RobotTrajectory {
    /// Planners report failure with a trajectory that names no joints
    pub fn is_empty(&self) -> bool {
        self.joint_trajectory.joint_names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub arm: ArmSide,
    pub trajectory: RobotTrajectory,
}

impl Plan {
    pub fn new(arm: ArmSide, trajectory: RobotTrajectory) -> Plan {
        Plan { arm, trajectory }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parse_arm_side() {
        assert_eq!("left".parse::<ArmSide>(), Ok(ArmSide::Left));
        assert_eq!("right".parse::<ArmSide>(), Ok(ArmSide::Right));
        assert!("".parse::<ArmSide>().is_err());
        assert!("Right".parse::<ArmSide>().is_err());
    }

    #[test]
    fn pose_components_keep_quaternion_order() {
        let pose = Pose::from_components([1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 0.9]);
        assert_relative_eq!(pose.position, na::Vector3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(pose.orientation.w, 0.9);
        assert_relative_eq!(pose.orientation.i, 0.1);
        assert_eq!(pose.components(), [1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 0.9]);
    }

    #[test]
    fn default_pose_is_identity() {
        let pose = Pose::default();
        assert_eq!(pose.components(), [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn parse_goal_request() {
        let json = r#"{
            "arm_to_move": "right",
            "right_arm": {
                "header": {"frame_id": "/base_link"},
                "pose": {
                    "position": {"x": 1.0, "y": 2.0, "z": 3.0},
                    "orientation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}
                }
            }
        }"#;
        let request: GoalRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.arm(), Some(ArmSide::Right));
        assert_eq!(
            request.target_for(ArmSide::Right),
            &PoseStamped::in_frame("/base_link", [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 1.0])
        );
        assert_eq!(request.left_arm, PoseStamped::default());
    }

    #[test]
    fn missing_selector_is_no_arm() {
        let request: GoalRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.arm(), None);
        let request = GoalRequest {
            arm_to_move: "both".to_owned(),
            ..Default::default()
        };
        assert_eq!(request.arm(), None);
    }

    #[test]
    fn pose_serializes_like_geometry_msgs() {
        let pose = Pose::from_components([1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 1.0]);
        let value = serde_json::to_value(pose).unwrap();
        assert_eq!(value["position"]["z"], 3.0);
        assert_eq!(value["orientation"]["w"], 1.0);
    }

    #[test]
    fn trajectory_without_joints_is_empty() {
        let mut trajectory = RobotTrajectory::default();
        assert!(trajectory.is_empty());
        trajectory.joint_trajectory.joint_names = vec!["right_shoulder_pan_joint".to_owned()];
        assert!(!trajectory.is_empty());
    }
}
