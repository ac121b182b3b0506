fn main() {
    fsm_graph_viz::cli::init_tracing();
    if let Err(err) = fsm_graph_viz::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
