use std::io::Write;

use anyhow::Context;
use colored::Colorize;

use anchorage_ledger::FileAnchorLedger;
use anchorage_sdk::{Anchorage, StoreRequest};
use anchorage_store::{BlobStore, DiskBlobStore};
use anchorage_types::ContentAddress;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let anchorage = open_repo(&cli.repo)?;
    match cli.command {
        Command::Store(args) => cmd_store(&anchorage, args),
        Command::Anchor(args) => cmd_anchor(&anchorage, args),
        Command::List(args) => cmd_list(&anchorage, args),
        Command::Cat(args) => cmd_cat(&anchorage, args),
        Command::Verify(args) => cmd_verify(&anchorage, args),
    }
}

type Repo = Anchorage<DiskBlobStore, FileAnchorLedger>;

/// Open the repository directory: a `blocks/` store plus an `anchors.log`.
fn open_repo(repo: &str) -> anyhow::Result<Repo> {
    let root = std::path::Path::new(repo);
    let store = DiskBlobStore::open(root.join("blocks"))
        .with_context(|| format!("opening block store in {repo}"))?;
    let ledger = FileAnchorLedger::open(root.join("anchors.log"))
        .with_context(|| format!("opening anchor log in {repo}"))?;
    Ok(Anchorage::new(store, ledger))
}

fn cmd_store(anchorage: &Repo, args: StoreArgs) -> anyhow::Result<()> {
    let mut request = StoreRequest::from_path(&args.path);
    if let Some(size) = args.block_size {
        request = request.max_block_size(size);
    }

    let outcome = anchorage.store_and_anchor(request, &args.owner)?;
    println!(
        "{} Stored and anchored {}",
        "✓".green().bold(),
        args.path.bold()
    );
    println!("  Root: {}", outcome.object_root.to_hex().yellow());
    println!("  Seq:  {}", outcome.record.seq);
    Ok(())
}

fn cmd_anchor(anchorage: &Repo, args: AnchorArgs) -> anyhow::Result<()> {
    let root = parse_root(&args.root)?;
    let record = anchorage.anchor_existing(&args.owner, root)?;
    println!(
        "{} Anchored {} at seq {}",
        "✓".green().bold(),
        root.short_hex().yellow(),
        record.seq
    );
    Ok(())
}

fn cmd_list(anchorage: &Repo, args: ListArgs) -> anyhow::Result<()> {
    let records = anchorage.list_anchored_from(&args.owner, args.from)?;
    if records.is_empty() {
        println!("No anchored records.");
        return Ok(());
    }
    for record in &records {
        println!(
            "{}  {}  {}",
            format!("#{}", record.seq).yellow().bold(),
            record.object_root.to_hex(),
            format!("{}ms", record.receipt.confirmed_at_ms).dimmed()
        );
    }
    Ok(())
}

fn cmd_cat(anchorage: &Repo, args: CatArgs) -> anyhow::Result<()> {
    let root = parse_root(&args.root)?;
    let bytes = anchorage.retrieve(&root)?;
    std::io::stdout().write_all(&bytes)?;
    Ok(())
}

fn cmd_verify(anchorage: &Repo, args: VerifyArgs) -> anyhow::Result<()> {
    let owner = args.owner.parse().context("parsing owner address")?;
    anchorage.ledger().validate_stream(&owner)?;

    let records = anchorage.list_anchored(&args.owner)?;
    let mut missing = 0usize;
    for record in &records {
        if !anchorage.store().contains(&record.object_root)? {
            missing += 1;
            println!(
                "  {} seq {} root {} not in store",
                "missing:".red(),
                record.seq,
                record.object_root.short_hex()
            );
        }
    }

    if missing == 0 {
        println!(
            "{} {} records verified: chain intact, all roots present",
            "✓".green().bold(),
            records.len()
        );
        Ok(())
    } else {
        anyhow::bail!("{missing} of {} anchored roots are unretrievable", records.len());
    }
}

fn parse_root(hex: &str) -> anyhow::Result<ContentAddress> {
    ContentAddress::from_hex(hex).context("parsing object root")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchorage_types::OwnerAddress;

    fn temp_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempfile::tempdir().unwrap();
        let repo = open_repo(dir.path().to_str().unwrap()).unwrap();
        (dir, repo)
    }

    fn owner() -> String {
        OwnerAddress::from_raw([0x11; 20]).to_string()
    }

    #[test]
    fn store_command_persists_and_anchors() {
        let (dir, repo) = temp_repo();
        let input = dir.path().join("input.txt");
        std::fs::write(&input, b"cli payload").unwrap();

        cmd_store(
            &repo,
            StoreArgs {
                path: input.to_str().unwrap().into(),
                owner: owner(),
                block_size: None,
            },
        )
        .unwrap();

        let records = repo.list_anchored(&owner()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(repo.retrieve(&records[0].object_root).unwrap(), b"cli payload");
    }

    #[test]
    fn anchor_command_requires_stored_root() {
        let (_dir, repo) = temp_repo();
        let err = cmd_anchor(
            &repo,
            AnchorArgs {
                root: ContentAddress::from_bytes(b"phantom").to_hex(),
                owner: owner(),
            },
        )
        .unwrap_err();
        // The cause chain names the missing block.
        assert!(format!("{err:#}").contains("not found"));
    }

    #[test]
    fn verify_command_passes_on_intact_repo() {
        let (dir, repo) = temp_repo();
        let input = dir.path().join("input.txt");
        std::fs::write(&input, b"verified").unwrap();
        cmd_store(
            &repo,
            StoreArgs {
                path: input.to_str().unwrap().into(),
                owner: owner(),
                block_size: None,
            },
        )
        .unwrap();

        cmd_verify(&repo, VerifyArgs { owner: owner() }).unwrap();
    }

    #[test]
    fn bad_root_hex_is_rejected() {
        assert!(parse_root("not hex").is_err());
        assert!(parse_root("abcd").is_err());
    }
}
