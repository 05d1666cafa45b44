#![doc = include_str!("../../README.md")]

pub mod goal_relay;
pub mod messages;
pub mod motion_planner;
pub mod relay_config;
