use std::net::SocketAddr;

use tokio::net::TcpListener;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut bind_addr: SocketAddr = "127.0.0.1:0".parse()?;
    let mut options = ledgercheck_testserver::TestServerOptions::default();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--bind" => {
                let addr = args.next().ok_or_else(|| {
                    anyhow::anyhow!("--bind requires an address, e.g. 127.0.0.1:0")
                })?;
                bind_addr = addr.parse()?;
            }
            "--email" => {
                options.email = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--email requires a value"))?;
            }
            "--password" => {
                options.password = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--password requires a value"))?;
            }
            "--allow-duplicate-names" => options.allow_duplicate_names = true,
            "-h" | "--help" => {
                eprintln!(
                    "ledgercheck-testserver\n\nUSAGE:\n  ledgercheck-testserver [--bind 127.0.0.1:0] [--email <email>] [--password <password>] [--allow-duplicate-names]\n\nOUTPUT:\n  Prints HTTP_URL=<url> to stdout once ready."
                );
                return Ok(());
            }
            other => {
                return Err(anyhow::anyhow!("unknown argument: {other}"));
            }
        }
    }

    let listener = TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;

    let state = ledgercheck_testserver::AppState::new(options);
    let app = ledgercheck_testserver::router(state);

    println!("HTTP_URL=http://{addr}");

    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = tokio::signal::ctrl_c().await;
    });

    serve.await?;
    Ok(())
}
