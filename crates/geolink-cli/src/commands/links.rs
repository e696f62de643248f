use crate::support;
use geolink_kernel::links::{link_map, neighbors_for};
use geolink_kernel::normalize::{normalize, parse_adjacency};
use serde_json::json;

const TAG: &str = "links";
const LINKS_KIND: &str = "geolink.links.v1";

pub fn run(adjacency_path: String, node: Option<String>, max: usize, json_output: bool) {
    let raw = support::read_json_file(&adjacency_path, "adjacency")
        .unwrap_or_else(|e| support::input_error(TAG, &e));
    let entries = parse_adjacency(&raw).unwrap_or_else(|e| support::input_error(TAG, &e));
    let adj = normalize(&entries);

    match node {
        Some(node) => {
            let slug = node.to_lowercase();
            let neighbors = neighbors_for(&slug, &adj, max);
            if json_output {
                let payload = json!({
                    "schema": 1,
                    "linksKind": LINKS_KIND,
                    "maxPerNode": max,
                    "node": slug,
                    "neighbors": neighbors,
                });
                println!("{}", support::render_payload_or_exit(TAG, &payload));
            } else {
                println!("[{TAG}] {slug}: {}", neighbors.join(", "));
            }
        }
        None => {
            let links = link_map(&adj, max);
            if json_output {
                let payload = json!({
                    "schema": 1,
                    "linksKind": LINKS_KIND,
                    "maxPerNode": max,
                    "links": links,
                });
                println!("{}", support::render_payload_or_exit(TAG, &payload));
            } else {
                for (node, neighbors) in &links {
                    println!("[{TAG}] {node}: {}", neighbors.join(", "));
                }
            }
        }
    }
}
