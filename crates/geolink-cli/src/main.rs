//! Geolink CLI: the `geolink` command.

mod cli;
mod commands;
mod md;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Doctor {
            adjacency,
            clusters,
            out,
            md,
            repair_symmetry,
            json,
            quiet,
            profile,
        } => commands::doctor::run(commands::doctor::Args {
            adjacency,
            clusters,
            out,
            md,
            repair_symmetry,
            json,
            quiet,
            profile,
        }),

        Commands::Gate {
            adjacency,
            clusters,
            policy,
            out,
            md,
            strict,
            json,
            quiet,
            profile,
        } => commands::gate::run(commands::gate::Args {
            adjacency,
            clusters,
            policy,
            out,
            md,
            strict,
            json,
            quiet,
            profile,
        }),

        Commands::Links {
            adjacency,
            node,
            max,
            json,
        } => commands::links::run(adjacency, node, max, json),
    }
}
