//! Command line and environment configuration of the `findex-chat` binary.

use clap::Parser;

use crate::travel;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "findex-chat",
    version,
    about = "Offline travel assistant backed by a function index"
)]
pub struct ChatConfig {
    /// Maximum number of candidate functions considered per message
    #[arg(long, env = "FINDEX_MAX_RESULTS", default_value_t = 3)]
    pub max_results: usize,

    /// Module whose indexed functions the assistant may call; repeatable
    #[arg(
        long = "module",
        env = "FINDEX_MODULES",
        value_delimiter = ',',
        default_values_t = travel::MODULES.map(String::from)
    )]
    pub modules: Vec<String>,

    /// Answer a single message and exit
    #[arg(long)]
    pub once: Option<String>,

    /// List the callable functions with their descriptions and exit
    #[arg(long)]
    pub list: bool,

    /// Print the JSON declarations of every indexed function in the binary
    /// and exit
    #[arg(long, conflicts_with = "list")]
    pub declarations: bool,
}
