use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context as _;

use crate::browser::Browser;
use crate::config::Config;
use crate::error::Result;

/// Serve the configured directory until interrupted.
pub(crate) fn run(config: &Config, browser: Arc<dyn Browser + Send + Sync>) -> Result<()> {
    let root = serving_root(config)?;

    let mut server = httpdir::ServerBuilder::new(&root);
    // all interfaces, so the dev loop can be hit from the LAN too
    server.hostname("0.0.0.0");
    server.port(config.port);
    let server = Arc::new(server.build());

    let interrupted = Arc::clone(&server);
    ctrlc::set_handler(move || interrupted.close())
        .context("failed to install the interrupt handler")?;

    let url = format!("http://localhost:{}/", config.port);
    log::info!("Serving {} through static file server", root.display());
    log::info!("Server listening on {url}");
    log::info!("Ctrl-c to stop the server");
    open_once_running(&server, browser, url);

    server.serve()?;
    log::info!("Server stopped");

    Ok(())
}

/// Fire-and-forget browser launch, deferred until the listener is up so
/// a failed bind never spawns a tab pointing at nothing.
fn open_once_running(
    server: &Arc<httpdir::Server>,
    browser: Arc<dyn Browser + Send + Sync>,
    url: String,
) {
    let watched = Arc::clone(server);
    thread::spawn(move || {
        for _ in 0..50 {
            if watched.is_running() {
                browser.open(&url);
                return;
            }
            thread::sleep(Duration::from_millis(100));
        }
    });
}

/// The serving root lives next to the executable, so launching from any
/// working directory serves the same tree.
fn serving_root(config: &Config) -> Result<PathBuf> {
    let exe = std::env::current_exe().context("could not locate the running executable")?;
    let dir = exe
        .parent()
        .context("the executable has no parent directory")?;
    let dir = dunce::canonicalize(dir)
        .with_context(|| format!("failed to canonicalize `{}`", dir.display()))?;
    let root = dir.join(config.root);
    anyhow::ensure!(
        root.is_dir(),
        "serving directory `{}` not found (expected at {})",
        config.root,
        root.display()
    );
    Ok(root)
}
