use std::io::Read;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use ldpc_codec::{ntriples, Codec, NTriplesCodec};
use ldpc_crypto::ContentHasher;
use ldpc_dataset::{Container, Dataset, LinkDescriptor};
use ldpc_store::{FileStorage, Storage};
use ldpc_types::Graph;
use serde::Serialize;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

/// Result of one command, printed as text or JSON.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Written {
        uri: String,
        hash: String,
    },
    Resource {
        uri: String,
        statements: usize,
        ntriples: String,
    },
    Resolved {
        resource: String,
        container: String,
    },
    Container {
        uri: String,
        membership_resource: String,
        relation: String,
        value: String,
        members: Vec<String>,
    },
    Canonical {
        hash: String,
        statements: usize,
        ntriples: String,
    },
    Hash {
        uri: String,
        hash: String,
    },
}

impl From<Container> for Report {
    fn from(container: Container) -> Self {
        Report::Container {
            relation: container.relation.alias().to_string(),
            value: container.relation.value().to_string(),
            uri: container.uri,
            membership_resource: container.membership_resource,
            members: container.members,
        }
    }
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    let report = match cli.command {
        // Works on a file only; no store is opened.
        Command::Canon(args) => {
            let codec = NTriplesCodec::new(config.dataset.canon.clone());
            cmd_canon(&codec, &read_input(&args.file)?)?
        }
        command => {
            let root = cli.root.unwrap_or(config.root);
            let storage = FileStorage::open(&root)
                .await
                .with_context(|| format!("opening store at {}", root.display()))?;
            debug!(root = %root.display(), "store opened");
            let dataset = Dataset::with_config(storage, config.dataset);
            execute(&dataset, command).await?
        }
    };

    print_report(&report, cli.format)
}

/// Run a store command against `dataset`.
pub async fn execute<S: Storage>(dataset: &Dataset<S>, command: Command) -> anyhow::Result<Report> {
    match command {
        Command::Put(args) => {
            let graph = parse_input(dataset.codec(), &args.file)?;
            let (uri, hash) = dataset.update_resource_with_hash(&args.uri, &graph).await?;
            Ok(Report::Written {
                uri,
                hash: hash.to_hex(),
            })
        }
        Command::Get(args) => {
            let graph = dataset.get_resource(&args.uri).await?;
            Ok(Report::Resource {
                statements: graph.len(),
                ntriples: ntriples::serialize(&graph),
                uri: args.uri,
            })
        }
        Command::Append(args) => {
            let graph = parse_input(dataset.codec(), &args.file)?;
            let uri = dataset.append_to_resource(&args.uri, &graph).await?;
            written(dataset, uri).await
        }
        Command::Link(args) => {
            let link = LinkDescriptor::from(args.relation);
            let uri = dataset
                .create_linked_container(&args.container, &args.resource, &link)
                .await?;
            written(dataset, uri).await
        }
        Command::Resolve(args) => {
            let link = LinkDescriptor::from(args.relation);
            let container = dataset
                .get_linked_container_uri(&args.resource, &link)
                .await?;
            Ok(Report::Resolved {
                resource: args.resource,
                container,
            })
        }
        Command::AddMember(args) => {
            let uri = dataset
                .add_member_to_container(&args.container, &args.member)
                .await?;
            written(dataset, uri).await
        }
        Command::Container(args) => Ok(dataset.get_container(&args.uri).await?.into()),
        Command::Hash(args) => {
            let hash = dataset.content_hash(&args.uri).await?;
            Ok(Report::Hash {
                uri: args.uri,
                hash: hash.to_hex(),
            })
        }
        Command::Canon(args) => cmd_canon(dataset.codec(), &read_input(&args.file)?),
    }
}

async fn written<S: Storage>(dataset: &Dataset<S>, uri: String) -> anyhow::Result<Report> {
    let hash = dataset.content_hash(&uri).await?;
    Ok(Report::Written {
        uri,
        hash: hash.to_hex(),
    })
}

fn cmd_canon(codec: &NTriplesCodec, raw: &[u8]) -> anyhow::Result<Report> {
    let graph = codec.parse(raw).context("parsing input")?;
    let canonical = codec.canonicalize(&graph)?;
    let hash = ContentHasher::RESOURCE.hash(&canonical);
    Ok(Report::Canonical {
        hash: hash.to_hex(),
        statements: graph.len(),
        ntriples: String::from_utf8(canonical).context("canonical output is not UTF-8")?,
    })
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn parse_input(codec: &NTriplesCodec, path: &Path) -> anyhow::Result<Graph> {
    let raw = read_input(path)?;
    codec
        .parse(&raw)
        .with_context(|| format!("parsing {}", path.display()))
}

fn print_report(report: &Report, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => print_text(report),
    }
    Ok(())
}

fn print_text(report: &Report) {
    match report {
        Report::Written { uri, hash } => {
            println!("{} Stored {}", "✓".green().bold(), uri.bold());
            println!("  Hash: {}", hash.yellow());
        }
        Report::Resource { ntriples, .. } => print!("{ntriples}"),
        Report::Resolved {
            resource,
            container,
        } => {
            println!("{} {} {}", resource.bold(), "→".dimmed(), container.green());
        }
        Report::Container {
            uri,
            membership_resource,
            relation,
            value,
            members,
        } => {
            println!("Container {}", uri.bold());
            println!("  Membership resource: {}", membership_resource.cyan());
            println!("  Relation: {} {}", relation, value.cyan());
            if members.is_empty() {
                println!("  Members: {}", "none".dimmed());
            } else {
                println!("  Members:");
                for member in members {
                    println!("    {}", member.blue());
                }
            }
        }
        Report::Canonical {
            hash, ntriples, ..
        } => {
            print!("{ntriples}");
            eprintln!("{} {}", "hash:".dimmed(), hash.yellow());
        }
        Report::Hash { hash, .. } => println!("{hash}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldpc_store::InMemoryStorage;

    const R1: &str = "http://ex/r1";
    const C1: &str = "http://ex/c1";
    const HAS_PART: &str = "http://ex/hasPart";

    fn input(dir: &tempfile::TempDir, name: &str, doc: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, doc).unwrap();
        path
    }

    fn rel(iri: &str) -> RelationArgs {
        RelationArgs {
            rel: Some(iri.to_string()),
            rev: None,
        }
    }

    #[tokio::test]
    async fn put_get_and_hash() {
        let dir = tempfile::tempdir().unwrap();
        let ds = Dataset::new(InMemoryStorage::new());
        let file = input(&dir, "r1.nt", "<http://ex/r1> <http://xmlns.com/foaf/0.1/name> \"Alice\" .\n");

        let put = execute(&ds, Command::Put(PutArgs { uri: R1.into(), file }))
            .await
            .unwrap();
        let Report::Written { uri, hash } = put else {
            panic!("expected a write report");
        };
        assert_eq!(uri, R1);

        let got = execute(&ds, Command::Get(UriArgs { uri: R1.into() })).await.unwrap();
        assert_eq!(
            got,
            Report::Resource {
                uri: R1.into(),
                statements: 1,
                ntriples: "<http://ex/r1> <http://xmlns.com/foaf/0.1/name> \"Alice\" .\n".into(),
            }
        );

        let report = execute(&ds, Command::Hash(UriArgs { uri: R1.into() })).await.unwrap();
        assert_eq!(report, Report::Hash { uri: R1.into(), hash });
    }

    #[tokio::test]
    async fn link_resolve_and_members() {
        let ds = Dataset::new(InMemoryStorage::new());
        execute(
            &ds,
            Command::Link(LinkArgs {
                container: C1.into(),
                resource: R1.into(),
                relation: rel(HAS_PART),
            }),
        )
        .await
        .unwrap();

        let resolved = execute(
            &ds,
            Command::Resolve(ResolveArgs {
                resource: R1.into(),
                relation: rel(HAS_PART),
            }),
        )
        .await
        .unwrap();
        assert_eq!(
            resolved,
            Report::Resolved {
                resource: R1.into(),
                container: C1.into(),
            }
        );

        execute(
            &ds,
            Command::AddMember(AddMemberArgs {
                container: C1.into(),
                member: "http://ex/m1".into(),
            }),
        )
        .await
        .unwrap();

        let container = execute(&ds, Command::Container(UriArgs { uri: C1.into() }))
            .await
            .unwrap();
        assert_eq!(
            container,
            Report::Container {
                uri: C1.into(),
                membership_resource: R1.into(),
                relation: "rel".into(),
                value: HAS_PART.into(),
                members: vec!["http://ex/m1".into()],
            }
        );
    }

    #[tokio::test]
    async fn append_merges_file() {
        let dir = tempfile::tempdir().unwrap();
        let ds = Dataset::new(InMemoryStorage::new());
        let first = input(&dir, "a.nt", "<http://ex/r1> <http://ex/p> <http://ex/a> .\n");
        let second = input(&dir, "b.nt", "<http://ex/r1> <http://ex/p> <http://ex/b> .\n");
        execute(&ds, Command::Put(PutArgs { uri: R1.into(), file: first }))
            .await
            .unwrap();
        execute(&ds, Command::Append(PutArgs { uri: R1.into(), file: second }))
            .await
            .unwrap();
        assert_eq!(ds.get_resource(R1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn errors_carry_context() {
        let dir = tempfile::tempdir().unwrap();
        let ds = Dataset::new(InMemoryStorage::new());
        let bad = input(&dir, "bad.nt", "<http://ex/r1> nonsense\n");
        let err = execute(&ds, Command::Put(PutArgs { uri: R1.into(), file: bad }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("parsing"));

        let err = execute(&ds, Command::Get(UriArgs { uri: R1.into() }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn canon_is_label_independent() {
        let codec = NTriplesCodec::default();
        let a = cmd_canon(&codec, b"_:x <http://ex/p> \"v\" .\n").unwrap();
        let b = cmd_canon(&codec, b"_:other <http://ex/p> \"v\" .\n").unwrap();
        assert_eq!(a, b);
        let Report::Canonical { ntriples, statements, .. } = a else {
            panic!("expected a canonical report");
        };
        assert_eq!(statements, 1);
        assert_eq!(ntriples, "_:c14n0 <http://ex/p> \"v\" .\n");
    }

    #[test]
    fn json_report_is_tagged() {
        let report = Report::Resolved {
            resource: R1.into(),
            container: C1.into(),
        };
        let value: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["kind"], "resolved");
        assert_eq!(value["container"], C1);
    }
}
