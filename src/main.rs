use std::path::PathBuf;
use std::time::Duration;

use box_packer::config::PackOptions;
use box_packer::error::{PackError, Result};
use box_packer::export::Visualization;
use box_packer::job::Job;
use box_packer::ordering::OrderingPolicy;
use box_packer::render;
use box_packer::solver::Packer;
use box_packer::types::{Dims, Item, PlacedItem};
use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "box_packer",
    about = "Checks whether a set of boxes fits into one container"
)]
struct Cli {
    /// Container dimensions (LxWxH, e.g. 600x400x400)
    #[arg(long, required_unless_present = "job")]
    container: Option<String>,

    /// Items as LxWxH:qty (e.g. 380x320x100:2 40x210x80:12)
    #[arg(long = "items", num_args = 1..)]
    items: Vec<String>,

    /// Read container and items from a JSON job file instead
    #[arg(long, conflicts_with_all = ["container", "items"])]
    job: Option<PathBuf>,

    /// Warning budget in milliseconds before the search starts cutting corners
    #[arg(long)]
    budget_ms: Option<u64>,

    /// Item order: volume, base-area, or dimension
    #[arg(long, value_parser = parse_order)]
    order: Option<OrderingPolicy>,

    /// Write the placement as viewer JSON to this file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Show an ASCII top view of each layer
    #[arg(long)]
    layout: bool,

    /// Log search progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_order(s: &str) -> std::result::Result<OrderingPolicy, String> {
    s.parse().map_err(|e: PackError| e.to_string())
}

fn parse_dimensions(s: &str) -> Result<Dims> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 3 {
        return Err(PackError::InvalidInput(format!(
            "invalid dimensions '{}', expected LxWxH",
            s
        )));
    }
    let mut edges = [0i64; 3];
    for (edge, part) in edges.iter_mut().zip(&parts) {
        *edge = part
            .parse::<i64>()
            .map_err(|_| PackError::InvalidInput(format!("invalid number '{}' in '{}'", part, s)))?;
    }
    Dims::try_new(edges[0], edges[1], edges[2])
}

fn parse_item(s: &str) -> Result<Item> {
    let (dims, qty) = s.split_once(':').unwrap_or((s, "1"));
    let qty = qty
        .parse::<i64>()
        .map_err(|_| PackError::InvalidInput(format!("invalid quantity in '{}'", s)))?;
    let qty = u32::try_from(qty).map_err(|_| PackError::InvalidQuantity(qty))?;
    Ok(Item::new(parse_dimensions(dims)?, qty))
}

fn load(cli: &Cli) -> Result<(Dims, Vec<Item>, PackOptions)> {
    let (container, items, mut options) = match &cli.job {
        Some(path) => {
            let job = Job::from_path(path)?;
            (job.container()?, job.items()?, job.options(PackOptions::default())?)
        }
        None => {
            let text = cli
                .container
                .as_deref()
                .ok_or_else(|| PackError::InvalidInput("missing --container".to_string()))?;
            let items = cli
                .items
                .iter()
                .map(|s| parse_item(s))
                .collect::<Result<Vec<_>>>()?;
            (parse_dimensions(text)?, items, PackOptions::default())
        }
    };

    if let Some(ms) = cli.budget_ms {
        options.warning_budget = Duration::from_millis(ms);
    }
    if let Some(order) = cli.order {
        options.ordering = order;
    }
    options.check_unit_count(&items)?;
    Ok((container, items, options))
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let (container, items, options) = load(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let mut packer = Packer::new(container, options);
    if !packer.pack(&items) {
        println!("The items cannot fit in the container {}.", container);
        std::process::exit(2);
    }

    println!("The items fit in the container {}.", container);

    let mut records = packer.placements().to_vec();
    records.sort_by_key(|r| r.item_index);
    for r in &records {
        println!("  #{} {} @ {}", r.item_index + 1, r.orientation, r.position);
    }

    if cli.layout {
        let placed: Vec<PlacedItem> = records.iter().map(|r| r.placed()).collect();
        for z in render::layer_heights(&placed) {
            println!("\nLayer z={}:", z);
            print!("{}", render::render_layer(container, &placed, z));
        }
    }

    let viz = Visualization::build(container, &records);
    println!(
        "\nSummary: {} item{} placed, {:.1}% of container volume used",
        viz.stats.total_items,
        if viz.stats.total_items == 1 { "" } else { "s" },
        viz.stats.utilization_rate,
    );

    if let Some(path) = &cli.export {
        viz.write_json(path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        println!("Viewer data written to {}", path.display());
    }
}
