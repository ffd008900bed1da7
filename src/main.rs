mod logger;

use std::{
    path::{Path, PathBuf},
    process,
};

use http::{
    error::ServerError,
    feature::{StaticFiles, cross_origin_isolation},
    server::HttpServer,
    service::HttpService,
};
use tracing::{error, info, warn};

/// Every interface, fixed port
const LISTEN_ADDRESS: &str = "0.0.0.0:8000";

#[tokio::main]
async fn main() {
    logger::init_logger();

    let result = match program_dist_dir() {
        Ok(root) => run(root, LISTEN_ADDRESS).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("Startup failed: {e}");
        eprintln!("devserver: {e}");
        process::exit(1);
    }
}

async fn run(root: PathBuf, address: &str) -> Result<(), ServerError> {
    // checked before the port is touched
    let files = StaticFiles::new(root)?;
    info!("Serving files from {}", files.root().display());

    let service = HttpService::new(files.into_handler()).layer(cross_origin_isolation);

    let mut server = HttpServer::new();
    server.set_address(address).set_service(service);

    let bound = server.bind().await?;
    println!("===> Open your browser at http://localhost:8000/");

    bound.serve_with_shutdown(interrupted()).await?;

    println!("\nKeyboard interrupt received, exiting.");
    Ok(())
}

/// `<directory of this executable>/../dist`
fn program_dist_dir() -> Result<PathBuf, ServerError> {
    let program = std::env::current_exe()?;
    Ok(dist_dir_for(&program))
}

fn dist_dir_for(program: &Path) -> PathBuf {
    program
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("..")
        .join("dist")
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // without a handler the default signal disposition still ends the process
        warn!("Unable to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
