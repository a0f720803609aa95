use bottega::{Config, run};

fn main() -> anyhow::Result<()> {
    // The runtime is built by hand so [general].worker_threads can size
    // it; 0 leaves the tokio default in place.
    let worker_threads = Config::load()?.general.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if worker_threads > 0 {
        builder.worker_threads(worker_threads);
    }

    builder.build()?.block_on(run())
}
