//! Clap derive structures for the `sdnboard` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sdnboard -- admin dashboard for Ryu SDN controllers
#[derive(Debug, Parser)]
#[command(
    name = "sdnboard",
    version,
    about = "Monitor and administer a Ryu SDN controller from the command line",
    long_about = "Inspect connected and blocked hosts, switch ports, per-port traffic\n\
        thresholds and the network topology of a Ryu SDN controller, and block\n\
        or unblock addresses and ports.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "SDNBOARD_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "SDNBOARD_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// REST shape served by the controller (overrides profile)
    #[arg(long, short = 'L', env = "SDNBOARD_LAYOUT", global = true)]
    pub layout: Option<LayoutArg>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SDNBOARD_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "SDNBOARD_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile) [default: 30]
    #[arg(long, env = "SDNBOARD_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output, Color & Layout Enums ─────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    /// Stock Ryu apps: plain IP lists, per-switch ports, thresholds
    Switches,
    /// Service-port builds: rich host rows and a flat port list
    Services,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store a session token
    Login(LoginArgs),

    /// Drop the stored session token
    Logout,

    /// Show session state for the active profile
    Status,

    /// Connected and blocked hosts
    #[command(alias = "h")]
    Hosts(HostsArgs),

    /// Service ports and switch ports
    #[command(alias = "p")]
    Ports(PortsArgs),

    /// Per-port traffic thresholds
    #[command(alias = "th")]
    Thresholds(ThresholdsArgs),

    /// Switches, hosts and links
    #[command(alias = "topo")]
    Topology(TopologyArgs),

    /// Summary counts for the dashboard
    Stats,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SESSION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (prompted when omitted)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  HOSTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Case-insensitive substring search over a list.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Only show rows containing this text
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct HostsArgs {
    #[command(subcommand)]
    pub command: HostsCommand,
}

#[derive(Debug, Subcommand)]
pub enum HostsCommand {
    /// List connected hosts
    #[command(alias = "ls")]
    Connected(SearchArgs),

    /// List blocked hosts
    Blocked(SearchArgs),

    /// Block an IP address
    Block {
        /// IP address to block
        ip: String,
    },

    /// Unblock an IP address
    Unblock {
        /// IP address to unblock
        ip: String,
    },

    /// Show which switch port each host is attached to
    Connections(SearchArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PORTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PortsArgs {
    #[command(subcommand)]
    pub command: PortsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PortsCommand {
    /// List service ports
    #[command(alias = "ls")]
    List(SearchArgs),

    /// Block a service port
    Block {
        /// Port number
        port: u16,
    },

    /// Unblock a service port
    Unblock {
        /// Port number
        port: u16,
    },

    /// List switch ports with their blocked state
    Switches(SearchArgs),

    /// Block a port on a switch
    BlockSwitch {
        /// Datapath id
        dpid: u64,
        /// Port number on that switch
        port: u32,
    },

    /// Unblock a port on a switch
    UnblockSwitch {
        /// Datapath id
        dpid: u64,
        /// Port number on that switch
        port: u32,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  THRESHOLDS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ThresholdsArgs {
    #[command(subcommand)]
    pub command: ThresholdsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ThresholdsCommand {
    /// List per-port thresholds
    #[command(alias = "ls")]
    List(SearchArgs),

    /// Set the threshold of one switch port
    Set {
        /// Datapath id
        dpid: u64,
        /// Port number on that switch
        port: u32,
        /// New threshold value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TOPOLOGY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TopologyArgs {
    /// Rendering of the graph
    #[arg(long, short = 'f', default_value = "table", value_enum)]
    pub format: TopologyFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TopologyFormat {
    /// Node and edge tables
    Table,
    /// JSON document of nodes and edges
    Json,
    /// Graphviz DOT
    Dot,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a profile value
    Set {
        /// Profile key (controller, layout, insecure, timeout, ca_cert,
        /// auth.mode, auth.username, auth.password_env, auth.login_path,
        /// auth.verify_path)
        key: String,

        /// Value to set
        value: String,
    },

    /// Store the local-mode password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
