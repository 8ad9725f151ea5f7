//! CLI subcommands.

pub mod config;
pub mod extract;
pub mod output;
pub mod scan;

use rcpt_core::RcptConfig;

pub(crate) fn load_config(path: Option<&str>) -> anyhow::Result<RcptConfig> {
    Ok(match path {
        Some(p) => RcptConfig::from_file(std::path::Path::new(p))?,
        None => RcptConfig::default(),
    })
}
