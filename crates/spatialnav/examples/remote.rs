//! Replay a sequence of remote-control presses over a grid and print the
//! resulting focus tree.
//!
//! ```text
//! cargo run --example remote -- --cols 4 --rows 3 right right down
//! ```

use anyhow::Result;
use clap::Parser;
use spatialnav::{Direction, Engine, Navigation, NodeConfig, Options, testing::Grid};
use tracing::info;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Grid columns
    #[clap(short, long, default_value_t = 4)]
    cols: usize,

    /// Grid rows
    #[clap(short, long, default_value_t = 3)]
    rows: usize,

    /// Nest the grid this many levels deep instead of laying it out flat
    #[clap(short, long)]
    nested: Option<usize>,

    /// Swap left and right
    #[clap(long)]
    rtl: bool,

    /// Colorize the tree dump
    #[clap(long)]
    color: bool,

    /// Print the layout table after the tree
    #[clap(short, long)]
    table: bool,

    /// Directions to press, in order
    presses: Vec<Direction>,
}

pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut engine = Engine::new();
    engine.init(Options::default().with_rtl(args.rtl));

    match args.nested {
        Some(levels) => {
            Grid::install(&mut engine, levels, args.cols.max(1))?;
        }
        None => {
            engine.register(NodeConfig::with_key("grid").focusable(false))?;
            Grid::flat(&mut engine, Some("grid"), "cell", args.cols, args.rows)?;
        }
    }

    for dir in args.presses {
        match engine.navigate(dir, None)? {
            Navigation::Moved { from, to } => {
                let from = from.map_or_else(|| "-".to_string(), |k| k.to_string());
                info!(%dir, %from, %to, "moved");
            }
            other => info!(%dir, ?other, "stayed"),
        }
        engine.release_direction(dir, None)?;
    }

    print!("{}", engine.dump(args.color)?);
    if args.table {
        println!("{}", engine.layout_table()?);
    }
    Ok(())
}
