mod badge;
mod helpers;
mod log;
mod status;
mod target;
mod water;

pub(crate) use badge::{cmd_badges_check, cmd_badges_list};
pub(crate) use helpers::CliEvents;
pub(crate) use log::cmd_log;
pub(crate) use status::{cmd_reset, cmd_status};
pub(crate) use target::{cmd_target_set, cmd_target_show};
pub(crate) use water::{cmd_water_log, cmd_water_undo};
