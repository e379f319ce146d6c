use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "anchorage",
    about = "Anchorage — content-addressed storage with anchored ownership",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Repository directory holding the block store and the anchor log
    #[arg(long, global = true, default_value = ".anchorage")]
    pub repo: String,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a file and anchor its root under an owner
    Store(StoreArgs),
    /// Anchor an already-stored object root
    Anchor(AnchorArgs),
    /// List anchored records for an owner
    List(ListArgs),
    /// Write an object's bytes to stdout
    Cat(CatArgs),
    /// Verify an owner's record chain and block availability
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct StoreArgs {
    /// File to store
    pub path: String,
    /// Owner address (0x + 40 hex chars)
    #[arg(short, long)]
    pub owner: String,
    /// Maximum data block size in bytes
    #[arg(long)]
    pub block_size: Option<usize>,
}

#[derive(Args)]
pub struct AnchorArgs {
    /// Object root (64 hex chars)
    pub root: String,
    /// Owner address (0x + 40 hex chars)
    #[arg(short, long)]
    pub owner: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Owner address (0x + 40 hex chars)
    pub owner: String,
    /// First sequence number to list
    #[arg(long, default_value = "0")]
    pub from: u64,
}

#[derive(Args)]
pub struct CatArgs {
    /// Object root (64 hex chars)
    pub root: String,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Owner address (0x + 40 hex chars)
    pub owner: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_store() {
        let cli = Cli::try_parse_from([
            "anchorage",
            "store",
            "report.pdf",
            "--owner",
            "0xabc",
        ])
        .unwrap();
        if let Command::Store(args) = cli.command {
            assert_eq!(args.path, "report.pdf");
            assert_eq!(args.owner, "0xabc");
            assert_eq!(args.block_size, None);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_store_with_block_size() {
        let cli = Cli::try_parse_from([
            "anchorage",
            "store",
            "big.bin",
            "-o",
            "0xabc",
            "--block-size",
            "1024",
        ])
        .unwrap();
        if let Command::Store(args) = cli.command {
            assert_eq!(args.block_size, Some(1024));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_anchor() {
        let cli = Cli::try_parse_from(["anchorage", "anchor", "deadbeef", "--owner", "0xabc"])
            .unwrap();
        if let Command::Anchor(args) = cli.command {
            assert_eq!(args.root, "deadbeef");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_list_with_from() {
        let cli = Cli::try_parse_from(["anchorage", "list", "0xabc", "--from", "5"]).unwrap();
        if let Command::List(args) = cli.command {
            assert_eq!(args.owner, "0xabc");
            assert_eq!(args.from, 5);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_cat() {
        let cli = Cli::try_parse_from(["anchorage", "cat", "deadbeef"]).unwrap();
        assert!(matches!(cli.command, Command::Cat(_)));
    }

    #[test]
    fn parse_verify() {
        let cli = Cli::try_parse_from(["anchorage", "verify", "0xabc"]).unwrap();
        assert!(matches!(cli.command, Command::Verify(_)));
    }

    #[test]
    fn parse_global_repo() {
        let cli = Cli::try_parse_from(["anchorage", "--repo", "/data/repo", "cat", "aa"]).unwrap();
        assert_eq!(cli.repo, "/data/repo");
    }

    #[test]
    fn store_requires_owner() {
        assert!(Cli::try_parse_from(["anchorage", "store", "file"]).is_err());
    }
}
