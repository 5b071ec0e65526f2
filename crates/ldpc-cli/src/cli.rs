use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ldpc_dataset::LinkDescriptor;

#[derive(Parser)]
#[command(
    name = "ldpc",
    about = "LDPC: canonical Linked-Data resource store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store directory (overrides the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store an N-Triples file as a resource, replacing any previous graph
    Put(PutArgs),
    /// Print a stored resource
    Get(UriArgs),
    /// Add the statements of an N-Triples file to a stored resource
    Append(PutArgs),
    /// Create a direct container whose membership resource is <resource>
    Link(LinkArgs),
    /// Find the container linked from a resource
    Resolve(ResolveArgs),
    /// Add a member to a container
    AddMember(AddMemberArgs),
    /// Show a container's membership resource, relation and members
    Container(UriArgs),
    /// Print the canonical form and content hash of an N-Triples file
    Canon(CanonArgs),
    /// Print the content hash of a stored resource
    Hash(UriArgs),
}

#[derive(Args)]
pub struct UriArgs {
    pub uri: String,
}

#[derive(Args)]
pub struct PutArgs {
    pub uri: String,
    /// N-Triples input (`-` reads stdin)
    pub file: PathBuf,
}

#[derive(Args)]
pub struct LinkArgs {
    pub container: String,
    pub resource: String,
    #[command(flatten)]
    pub relation: RelationArgs,
}

#[derive(Args)]
pub struct ResolveArgs {
    pub resource: String,
    #[command(flatten)]
    pub relation: RelationArgs,
}

#[derive(Args)]
pub struct AddMemberArgs {
    pub container: String,
    pub member: String,
}

#[derive(Args)]
pub struct CanonArgs {
    /// N-Triples input (`-` reads stdin)
    pub file: PathBuf,
}

#[derive(Args, Clone, Debug)]
#[group(required = true, multiple = false)]
pub struct RelationArgs {
    /// Forward membership relation (ldp:hasMemberRelation)
    #[arg(long)]
    pub rel: Option<String>,
    /// Inverse membership relation (ldp:isMemberOfRelation)
    #[arg(long)]
    pub rev: Option<String>,
}

impl From<RelationArgs> for LinkDescriptor {
    fn from(args: RelationArgs) -> Self {
        LinkDescriptor {
            rel: args.rel,
            rev: args.rev,
        }
    }
}
