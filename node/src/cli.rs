//! # CLI Interface
//!
//! Defines the command-line argument structure for `jedo-node` using
//! `clap` derive. Supports five subcommands: `init`, `invoke`, `query`,
//! `events`, and `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use jedo_contracts::identity::IdentityConfig;
use jedo_contracts::config::{
    DEFAULT_ADMIN_ATTRIBUTE, DEFAULT_ADMIN_MARKER, DEFAULT_GENS_DEPTH, DEFAULT_ROOT_ADMIN_CN,
};
use jedo_ledger::config::{DEFAULT_ISSUER, DEFAULT_MSP_ID};
use jedo_ledger::X509Identity;

/// JEDO wallet ledger peer.
///
/// Hosts the wallet chaincode over a persistent world state. Every call
/// runs as one invocation under the identity given on the command line;
/// state-changing calls commit atomically or not at all.
#[derive(Parser, Debug)]
#[command(
    name = "jedo-node",
    about = "JEDO wallet ledger peer",
    version,
    propagate_version = true
)]
pub struct JedoNodeCli {
    /// Path to the data directory holding the ledger database.
    #[arg(long, short = 'd', env = "JEDO_DATA_DIR", default_value = ".jedo", global = true)]
    pub data_dir: PathBuf,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "JEDO_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: String,

    /// Default log filter when `RUST_LOG` is not set.
    #[arg(long, default_value = "warn,jedo_node=info", global = true)]
    pub log_level: String,

    #[command(flatten)]
    pub roles: RoleArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the JEDO node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and initialize the wallet ledger.
    Init,
    /// Submit a state-changing function and commit its writes.
    Invoke(CallArgs),
    /// Evaluate a function without committing anything.
    Query(CallArgs),
    /// List committed chaincode events.
    Events(EventsArgs),
    /// Print version information and exit.
    Version,
}

/// How certificate names map to roles.
#[derive(Args, Debug, Clone)]
pub struct RoleArgs {
    /// Certificate attribute that grants admin when set to `true`.
    #[arg(long, default_value = DEFAULT_ADMIN_ATTRIBUTE, global = true)]
    pub admin_attribute: String,

    /// Common name of the root administrator.
    #[arg(long, env = "JEDO_ROOT_ADMIN_CN", default_value = DEFAULT_ROOT_ADMIN_CN, global = true)]
    pub root_admin_cn: String,

    /// Single-label common name that denotes an admin.
    #[arg(long, env = "JEDO_ADMIN_MARKER", default_value = DEFAULT_ADMIN_MARKER, global = true)]
    pub admin_marker: String,

    /// Number of dotted labels in a gens common name.
    #[arg(long, env = "JEDO_GENS_DEPTH", default_value_t = DEFAULT_GENS_DEPTH, global = true)]
    pub gens_depth: usize,
}

impl RoleArgs {
    pub fn to_config(&self) -> IdentityConfig {
        IdentityConfig {
            admin_attribute: self.admin_attribute.clone(),
            root_admin_cn: self.root_admin_cn.clone(),
            admin_marker: self.admin_marker.clone(),
            gens_depth: self.gens_depth,
        }
    }
}

/// Arguments for `invoke` and `query`.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Caller subject DN, e.g. `CN=hans.worb.alps.ea.jedo.cc,OU=client,O=alps`.
    #[arg(long, short = 's')]
    pub subject: String,

    /// Caller issuer DN.
    #[arg(long, default_value = DEFAULT_ISSUER)]
    pub issuer: String,

    /// Caller MSP id.
    #[arg(long, env = "JEDO_MSP_ID", default_value = DEFAULT_MSP_ID)]
    pub msp_id: String,

    /// Certificate attribute as `name=value`. Repeatable.
    #[arg(long = "attr", value_parser = parse_attribute)]
    pub attributes: Vec<(String, String)>,

    /// Chaincode function name, e.g. `Transfer`.
    pub function: String,

    /// Positional function arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl CallArgs {
    /// The caller identity these flags describe.
    pub fn identity(&self) -> X509Identity {
        self.attributes.iter().fold(
            X509Identity::new(self.subject.as_str())
                .with_issuer(self.issuer.as_str())
                .with_msp_id(self.msp_id.as_str()),
            |identity, (name, value)| identity.with_attribute(name.as_str(), value.as_str()),
        )
    }
}

/// Arguments for the `events` subcommand.
#[derive(Args, Debug)]
pub struct EventsArgs {
    /// First commit sequence to list.
    #[arg(long, default_value_t = 0)]
    pub from: u64,

    /// Maximum number of events; 0 lists all.
    #[arg(long, short = 'n', default_value_t = 0)]
    pub limit: usize,
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use jedo_ledger::ClientIdentity;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        JedoNodeCli::command().debug_assert();
    }

    #[test]
    fn invoke_keeps_negative_looking_args() {
        let cli = JedoNodeCli::parse_from([
            "jedo-node",
            "invoke",
            "--subject",
            "CN=admin.alps.ea.jedo.cc",
            "--attr",
            "admin=true",
            "Credit",
            "W001",
            "-5",
        ]);
        let Commands::Invoke(call) = cli.command else {
            panic!("expected invoke");
        };
        assert_eq!(call.function, "Credit");
        assert_eq!(call.args, vec!["W001", "-5"]);
        assert_eq!(
            call.identity().attribute("admin").unwrap(),
            Some("true".to_string())
        );
    }

    #[test]
    fn role_flags_build_identity_config() {
        let cli = JedoNodeCli::parse_from(["jedo-node", "--gens-depth", "6", "version"]);
        let config = cli.roles.to_config();
        assert_eq!(config.gens_depth, 6);
        assert_eq!(config.root_admin_cn, DEFAULT_ROOT_ADMIN_CN);
    }

    #[test]
    fn default_role_flags_resolve_network_names() {
        use jedo_contracts::{CertificateRoleResolver, Role, RoleResolver};

        let cli = JedoNodeCli::parse_from(["jedo-node", "version"]);
        let resolver = CertificateRoleResolver::new(cli.roles.to_config());
        let gens = X509Identity::from_common_name("worb.alps.ea.jedo.cc");
        let human = X509Identity::from_common_name("hans.worb.alps.ea.jedo.cc");
        assert_eq!(resolver.resolve(&gens).unwrap().role, Role::Gens);
        assert_eq!(resolver.resolve(&human).unwrap().role, Role::Human);
    }

    #[test]
    fn attribute_requires_name() {
        assert!(parse_attribute("=x").is_err());
        assert!(parse_attribute("novalue").is_err());
        assert_eq!(parse_attribute("role=").unwrap(), ("role".into(), String::new()));
    }
}
