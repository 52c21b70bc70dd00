use actix_web::*;
use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct HttpServerConfig {
    pub port: u16,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_scope() -> String {
    "/api".to_string()
}

fn default_workers() -> usize {
    1
}

impl HttpServerConfig {
    pub async fn run_server<F>(&self, scopes: F) -> anyhow::Result<()>
    where
        F: Fn() -> Vec<Scope> + Send + Clone + 'static,
    {
        let prefix = self.scope.clone();

        let http_server = HttpServer::new(move || {
            let mut root = web::scope(&prefix);
            for scope in scopes() {
                root = root.service(scope);
            }

            App::new().wrap(tracing_actix_web::TracingLogger::default()).service(root)
        })
        .workers(self.workers)
        .bind(("0.0.0.0", self.port))
        .with_context(|| format!("Error binding HTTP server to port {}", self.port))?;

        tracing::info!("HTTP server listening on port {} under {}", self.port, self.scope);

        http_server
            .run()
            .await
            .with_context(|| format!("Error starting HTTP server on port {}", self.port))
    }
}
