mod analyze;
mod edit;
mod entry;
mod export;
mod helpers;
mod profile;
mod report;

pub(crate) use analyze::cmd_analyze;
pub(crate) use edit::cmd_edit;
pub(crate) use entry::{cmd_log, cmd_show};
pub(crate) use export::cmd_export;
pub(crate) use profile::{cmd_profile_set, cmd_profile_show};
pub(crate) use report::cmd_report;
