use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>, no_open: bool) -> anyhow::Result<()> {
    crate::root::require_initialized(root)?;
    let config = super::load_config(root)?;
    let port = port.unwrap_or(config.server.port);

    let rt = super::runtime()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
            .await
            .with_context(|| format!("failed to bind port {port}"))?;
        let actual_port = listener.local_addr()?.port();
        let pid = std::process::id();
        println!("Wizard -> http://localhost:{actual_port}  (PID {pid})");

        tokio::select! {
            res = wizard_server::serve_on(root_buf, listener, !no_open) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
