//! pnc — 覆盖图构造与性质分析命令行入口.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pncover::cover::{analyze, build_cover_graph, build_cover_graph_stepped, write_dot};
use pncover::net::{Marking, Net, NetDescription};

#[derive(Parser)]
#[command(
    name = "pnc",
    version,
    about = "Coverability graph construction and property analysis for weighted P/T nets"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the coverability graph and print its nodes and edges
    Build {
        /// Net description file (.json or .ron)
        net: PathBuf,
        /// Write the graph as Graphviz DOT to this path
        #[arg(long)]
        dot: Option<PathBuf>,
        /// Write the net structure itself as Graphviz DOT to this path
        #[arg(long)]
        net_dot: Option<PathBuf>,
    },
    /// Build step by step and print the replayable history messages
    Step {
        net: PathBuf,
    },
    /// Build the coverability graph and report net properties
    Analyze {
        net: PathBuf,
    },
}

fn main() -> Result<()> {
    if std::env::var("PNC_LOG").is_ok() {
        let env = env_logger::Env::new()
            .filter("PNC_LOG")
            .write_style("PNC_LOG_STYLE");
        env_logger::init_from_env(env);
    } else {
        env_logger::init();
    }

    let cli = Cli::parse();
    match cli.command {
        Command::Build { net, dot, net_dot } => {
            let (net, initial) = load_net(&net)?;
            let graph = build_cover_graph(&net, &initial)?;
            print_graph(&graph, &net);
            if let Some(path) = dot {
                write_dot(&graph, &net, &path)
                    .with_context(|| format!("failed to write DOT file {}", path.display()))?;
                println!("\nDOT written to {}", path.display());
            }
            if let Some(path) = net_dot {
                net.write_dot(&path)
                    .with_context(|| format!("failed to write DOT file {}", path.display()))?;
                println!("net DOT written to {}", path.display());
            }
        }
        Command::Step { net } => {
            let (net, initial) = load_net(&net)?;
            let (graph, history) = build_cover_graph_stepped(&net, &initial)?;
            for (step, entry) in history.iter().enumerate() {
                println!("step {step}: {}", entry.message);
            }
            println!(
                "\nfinal graph: {} nodes, {} edges",
                graph.node_count(),
                graph.edge_count()
            );
        }
        Command::Analyze { net } => {
            let (net, initial) = load_net(&net)?;
            let enabled: Vec<&str> = net
                .enabled_transitions(&initial)
                .into_iter()
                .map(|t| net.transition_name(t))
                .collect();
            println!("enabled at start: {}", enabled.join(", "));
            let graph = build_cover_graph(&net, &initial)?;
            println!(
                "graph: {} nodes, {} edges\n",
                graph.node_count(),
                graph.edge_count()
            );
            println!("{}", analyze(&graph, &net));
        }
    }
    Ok(())
}

fn load_net(path: &PathBuf) -> Result<(Net, Marking)> {
    let description = NetDescription::from_path(path)
        .with_context(|| format!("failed to read net description {}", path.display()))?;
    let net = description
        .build()
        .with_context(|| format!("invalid net description {}", path.display()))?;
    let initial = net.initial_marking();
    Ok((net, initial))
}

fn print_graph(graph: &pncover::CoverGraph, net: &Net) {
    println!("Nodes:");
    for node in graph.nodes() {
        println!("  N{}: {} tag='{}'", node.id.raw(), node.marking, node.tag);
    }
    println!("\nArcs:");
    for edge in graph.edges() {
        println!(
            "  N{} --{}--> N{}",
            edge.src.raw(),
            net.transition_name(edge.transition),
            edge.dst.raw()
        );
    }
}
