use crate::messages::ArmSide;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("error while accessing configuration")]
    IoError(#[from] std::io::Error),
    #[error("error while parsing json")]
    JsonError(#[from] serde_json::Error),
    #[error("error while parsing yaml")]
    YamlError(#[from] serde_yaml::Error),
}

type Result<T> = std::result::Result<T, ConfigError>;

lazy_static! {
    static ref INCLUDED: RelayConfig = {
        let json = include_str!("../config/movo.json");
        RelayConfig::parse_json(json).expect("included config is valid")
    };
}

/// Key expressions the relay listens and publishes on
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TopicConfig {
    pub goal_pose: String,
    pub move_to_goal: String,
    pub identity_pose_request: String,
    pub left_arm_plan: String,
    pub right_arm_plan: String,
    /// Prefix of the planning service request/response keys
    pub planning_service: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        TopicConfig {
            goal_pose: "ros_reality/goal_pose".to_owned(),
            move_to_goal: "ros_reality/move_to_goal".to_owned(),
            identity_pose_request: "holocontrol/identity_pose_request".to_owned(),
            left_arm_plan: "movo_moveit/left_arm_plan".to_owned(),
            right_arm_plan: "movo_moveit/right_arm_plan".to_owned(),
            planning_service: "movo_moveit/planning_service".to_owned(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RelayConfig {
    pub left_arm_group: String,
    pub right_arm_group: String,
    /// Frame used for goal poses that arrive without one
    pub pose_reference_frame: String,
    #[serde(default)]
    pub topics: TopicConfig,
    /// How long an execute trigger waits for planning to finish
    pub planning_wait_timeout_ms: u64,
    pub service_call_timeout_ms: u64,
    pub execution_timeout_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            left_arm_group: "left_arm".to_owned(),
            right_arm_group: "right_arm".to_owned(),
            pose_reference_frame: "/base_link".to_owned(),
            topics: TopicConfig::default(),
            planning_wait_timeout_ms: 30_000,
            service_call_timeout_ms: 10_000,
            execution_timeout_ms: 60_000,
        }
    }
}

impl RelayConfig {
    /// Movo comes with an included config file.
    ///
    /// This file is packaged with the binary
    /// This method retrieves this included version
    pub fn included() -> RelayConfig {
        INCLUDED.clone()
    }

    pub fn group_for(&self, arm: ArmSide) -> &str {
        match arm {
            ArmSide::Left => &self.left_arm_group,
            ArmSide::Right => &self.right_arm_group,
        }
    }

    pub fn plan_topic_for(&self, arm: ArmSide) -> &str {
        match arm {
            ArmSide::Left => &self.topics.left_arm_plan,
            ArmSide::Right => &self.topics.right_arm_plan,
        }
    }

    pub fn planning_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.planning_wait_timeout_ms)
    }

    pub fn parse_json(text: &str) -> Result<RelayConfig> {
        let config: RelayConfig = serde_json::from_str(text)?;
        Ok(config)
    }

    pub fn parse_yaml(text: &str) -> Result<RelayConfig> {
        let config: RelayConfig = serde_yaml::from_str(text)?;
        Ok(config)
    }

    pub fn serialize_to_json(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    pub fn serialize_to_yaml(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(yaml)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.serialize_to_json()?)?;
        Ok(())
    }

    pub fn save_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.serialize_to_yaml()?)?;
        Ok(())
    }

    /// Loads yaml for `.yaml`/`.yml` paths and json otherwise
    pub fn load(path: impl AsRef<Path>) -> Result<RelayConfig> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => RelayConfig::parse_yaml(&text),
            _ => RelayConfig::parse_json(&text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_JSON: &str = "{\"left_arm_group\":\"left_arm\",\"right_arm_group\":\"right_arm\",\"pose_reference_frame\":\"/base_link\",\"planning_wait_timeout_ms\":30000,\"service_call_timeout_ms\":10000,\"execution_timeout_ms\":60000}";

    #[test]
    fn parse_from_json() {
        let config = RelayConfig::parse_json(MINIMAL_JSON).unwrap();
        assert_eq!(config, RelayConfig::default());
    }

    #[test]
    fn parse_from_yaml() {
        // json is valid yaml
        let config = RelayConfig::parse_yaml(MINIMAL_JSON).unwrap();
        assert_eq!(config, RelayConfig::default());
    }

    #[test]
    fn serialize_to_yaml() {
        let config = RelayConfig::default();
        let yaml = config.serialize_to_yaml().unwrap();
        let parsed_config = RelayConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config, parsed_config);
    }

    #[test]
    fn included_matches_default() {
        assert_eq!(RelayConfig::included(), RelayConfig::default());
    }

    #[test]
    fn arm_lookups() {
        let config = RelayConfig::default();
        assert_eq!(config.group_for(ArmSide::Left), "left_arm");
        assert_eq!(config.group_for(ArmSide::Right), "right_arm");
        assert_eq!(
            config.plan_topic_for(ArmSide::Right),
            "movo_moveit/right_arm_plan"
        );
    }

    #[test]
    fn load_picks_format_from_extension() {
        let dir = std::env::temp_dir().join(format!("movo-relay-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let mut config = RelayConfig::default();
        config.pose_reference_frame = "/odom".to_owned();

        let yaml_path = dir.join("relay.yaml");
        config.save_yaml(&yaml_path).unwrap();
        assert_eq!(RelayConfig::load(&yaml_path).unwrap(), config);

        let json_path = dir.join("relay.json");
        config.save_json(&json_path).unwrap();
        assert_eq!(RelayConfig::load(&json_path).unwrap(), config);

        fs::remove_dir_all(&dir).unwrap();
    }
}
