//! Clap derive structures for the `warden` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// warden -- console for critical rules, firewall rules and users
#[derive(Debug, Parser)]
#[command(
    name = "warden",
    version,
    about = "Manage critical rules, firewall rules and users from the command line",
    long_about = "Administrative console for a rules backend.\n\n\
        Sign in once with `warden login`; the access token is kept in a\n\
        cookie file per profile and sent as a bearer token on every request.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "WARDEN_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "WARDEN_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WARDEN_OUTPUT",
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

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "WARDEN_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "WARDEN_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the access token
    Login(LoginArgs),

    /// Forget the stored access token
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Summary counts for rules and users
    #[command(alias = "dash")]
    Dashboard,

    /// Manage critical rules
    #[command(alias = "cr")]
    Rules(RulesArgs),

    /// View firewall rules (read-only)
    #[command(alias = "fw")]
    FirewallRules(FirewallRulesArgs),

    /// Manage user accounts
    Users(UsersArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Page selection shared by every list command.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page index, starting at 0
    #[arg(long, default_value = "0")]
    pub page: u32,

    /// Rows per page
    #[arg(
        long,
        short = 'l',
        default_value = "25",
        value_parser = clap::value_parser!(u32).range(1..=500)
    )]
    pub page_size: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SESSION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username or email (defaults to the profile's username)
    pub username: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CRITICAL RULES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List critical rules
    #[command(alias = "ls")]
    List(PageArgs),

    /// Create a critical rule
    Create(RuleFields),

    /// Update a critical rule; only the given fields change
    Update {
        /// Critical rule ID
        id: i64,

        #[command(flatten)]
        fields: RuleFields,
    },

    /// Delete one or more critical rules
    #[command(alias = "rm")]
    Delete {
        /// Critical rule IDs (space or comma separated)
        #[arg(required = true, value_delimiter = ',')]
        ids: Vec<i64>,
    },
}

/// Editable critical-rule fields. Values are validated before anything is
/// sent.
#[derive(Debug, Default, Args)]
pub struct RuleFields {
    /// Rule title (required on create, max 100 characters)
    #[arg(long)]
    pub title: Option<String>,

    /// Action applied to matching traffic
    #[arg(long, value_enum)]
    pub action: Option<RuleAction>,

    /// Protocol (e.g. tcp, udp)
    #[arg(long)]
    pub protocol: Option<String>,

    /// Source address
    #[arg(long)]
    pub src_address: Option<String>,

    /// Destination address
    #[arg(long)]
    pub des_address: Option<String>,

    /// Source port (0-65535)
    #[arg(long)]
    pub src_port: Option<String>,

    /// Destination port (0-65535)
    #[arg(long)]
    pub des_port: Option<String>,

    /// NAT source port (0-65535)
    #[arg(long)]
    pub nat_src_port: Option<String>,

    /// NAT destination port (0-65535)
    #[arg(long)]
    pub nat_des_port: Option<String>,

    /// First day the rule applies (YYYY-MM-DD)
    #[arg(long)]
    pub start_time: Option<String>,

    /// Last day the rule applies (YYYY-MM-DD)
    #[arg(long)]
    pub end_time: Option<String>,

    /// Free-form description (max 400 characters)
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RuleAction {
    Allow,
    Block,
    Drop,
}

impl RuleAction {
    /// Wire value of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Block => "block",
            Self::Drop => "drop",
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FIREWALL RULES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FirewallRulesArgs {
    #[command(subcommand)]
    pub command: FirewallRulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FirewallRulesCommand {
    /// List firewall rules
    #[command(alias = "ls")]
    List(PageArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users
    #[command(alias = "ls")]
    List(PageArgs),

    /// Create a user (new users start active)
    Create {
        /// Email address
        #[arg(long)]
        email: Option<String>,

        /// Login name
        #[arg(long)]
        username: Option<String>,

        /// First name
        #[arg(long)]
        first_name: Option<String>,

        /// Last name
        #[arg(long)]
        last_name: Option<String>,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Update a user; only the given fields change
    Update {
        /// User ID
        id: i64,

        /// Email address
        #[arg(long)]
        email: Option<String>,

        /// First name
        #[arg(long)]
        first_name: Option<String>,

        /// Last name
        #[arg(long)]
        last_name: Option<String>,

        /// Prompt for a new password
        #[arg(long)]
        set_password: bool,
    },

    /// Flip a user's active flag
    Toggle {
        /// User ID
        id: i64,
    },

    /// Delete a user (the backend refuses active users)
    #[command(alias = "rm")]
    Delete {
        /// User ID
        id: i64,
    },
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

    /// Set a value on the active profile
    Set {
        /// Profile key (api_url, username, password_env, cookie_file, ca_cert, insecure, timeout)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
