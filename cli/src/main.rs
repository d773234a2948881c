//! Thin demo binary: builds a small configuration by hand, runs it to
//! convergence, and prints plain summary lines. Not a report generator —
//! a host embedding `txverify-sim-core` is expected to render its own
//! view of the resulting statistics.

use txverify_sim_core::{ServerConfig, SimulationConfig, SourceConfig};
use txverify_sim_core::Simulation;

fn main() {
    let config = SimulationConfig {
        sources: vec![
            SourceConfig { id: "s1".into(), priority: 1, lambda: 0.5 },
            SourceConfig { id: "s2".into(), priority: 2, lambda: 0.3 },
        ],
        servers: vec![
            ServerConfig { id: "srv1".into(), min_time: 1.0, max_time: 3.0 },
            ServerConfig { id: "srv2".into(), min_time: 1.0, max_time: 3.0 },
        ],
        buffer_capacity: 5,
        simulation_time: 500.0,
        seed: 12345,
    };

    let mut simulation = match Simulation::new(config, true) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    let steps = simulation.run_automated(0.1, 0.9);
    let state = simulation.get_state();

    println!("completed_steps={steps}");
    println!("final_time={:.2}", state.time);
    println!("total_transactions={}", state.total_transactions);
    println!("rejection_rate={:.4}", state.rejection_rate);

    for source_id in ["s1", "s2"] {
        let stats = simulation.source_statistics(source_id);
        println!(
            "source={source_id} generated={} rejected={} completed={} avg_wait={:.3} avg_service={:.3}",
            stats.generated, stats.rejected, stats.completed, stats.avg_wait_time, stats.avg_service_time
        );
    }

    for server_id in ["srv1", "srv2"] {
        let stats = simulation.server_statistics(server_id);
        println!(
            "server={server_id} processed={} utilization={:.3}",
            stats.processed, stats.utilization
        );
    }
}
