//! Demo application served by `switchyard serve`

use anyhow::{Context as _, Result};
use http_body_util::BodyExt;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use switchyard_config::{Config, MiddlewareConfig};
use switchyard_core::StatusCode;
use switchyard_middleware::{
    BearerAuth, BearerAuthConfig, LoggingConfig, MiddlewareBuilder, Recovery, RequestIdConfig,
    TimeoutConfig,
};
use switchyard_router::prelude::*;
use switchyard_router::RouterConfig;

/// Build the global middleware stack described by `config`.
///
/// Order: recovery, request ID, logging, timeout. Authentication is not
/// part of the global stack; it is attached to the `/api` group.
pub fn middleware_stack(config: &MiddlewareConfig) -> Result<Vec<Arc<dyn Handler>>> {
    let mut builder = MiddlewareBuilder::new();

    if config.recovery.enabled {
        builder = builder.with_middleware(Arc::new(
            Recovery::new().expose_errors(config.recovery.expose_errors),
        ));
    }

    if config.request_id.enabled {
        builder = builder.with_request_id_config(RequestIdConfig {
            header_name: config.request_id.header.clone(),
            ..Default::default()
        });
    }

    if config.logging.enabled {
        let log_level = tracing::Level::from_str(&config.logging.level)
            .with_context(|| format!("invalid log level '{}'", config.logging.level))?;
        builder = builder.with_logging_config(LoggingConfig {
            log_level,
            log_headers: config.logging.log_headers,
            sensitive_headers: config.logging.sensitive_headers.clone(),
            log_response: true,
        });
    }

    if let Some(timeout) = &config.timeout {
        builder = builder.with_timeout_config(TimeoutConfig {
            request_timeout: timeout.duration,
            custom_error_message: timeout.message.clone(),
        });
    }

    Ok(builder.build())
}

/// Build the demo router from configuration
pub fn build_router(config: &Config) -> Result<Router> {
    let mut router = Router::with_config(RouterConfig {
        pool_max_idle: config.router.pool_max_idle,
    });

    router.use_all(middleware_stack(&config.middleware)?)?;

    router
        .get("/", only(Index))?
        .get("/health", only(Health))?;

    let mut api = router.group("/api")?;
    if let Some(auth) = &config.middleware.auth {
        api.use_middleware(Arc::new(BearerAuth::with_config(BearerAuthConfig {
            tokens: auth.tokens.clone(),
            skip_paths: auth.skip_paths.clone(),
            realm: auth.realm.clone(),
        })))?;
    }

    {
        let mut users = api.group("/users")?;
        users
            .get("", only(ListUsers))?
            .post("", only(Echo))?
            .get("/:id", only(ShowUser))?
            .put("/:id", only(Echo))?
            .delete("/:id", only(DeleteUser))?;
    }

    api.get("/files/*path", only(ShowFile))?;

    Ok(router)
}

fn only<H: Handler + 'static>(handler: H) -> Vec<Arc<dyn Handler>> {
    vec![Arc::new(handler) as Arc<dyn Handler>]
}

/// `GET /`
#[derive(Debug)]
struct Index;

#[async_trait]
impl Handler for Index {
    async fn call(&self, ctx: &mut Context, _next: Next) -> Result<(), Error> {
        ctx.response_mut().json(
            StatusCode::OK,
            &json!({
                "name": "switchyard",
                "version": env!("CARGO_PKG_VERSION"),
            }),
        )?;
        Ok(())
    }
}

/// `GET /health`
#[derive(Debug)]
struct Health;

#[async_trait]
impl Handler for Health {
    async fn call(&self, ctx: &mut Context, _next: Next) -> Result<(), Error> {
        ctx.response_mut().text(StatusCode::OK, "OK");
        Ok(())
    }
}

#[derive(Debug)]
struct ListUsers;

#[async_trait]
impl Handler for ListUsers {
    async fn call(&self, ctx: &mut Context, _next: Next) -> Result<(), Error> {
        ctx.response_mut()
            .json(StatusCode::OK, &json!({ "users": ["1", "2", "3"] }))?;
        Ok(())
    }
}

#[derive(Debug)]
struct ShowUser;

#[async_trait]
impl Handler for ShowUser {
    async fn call(&self, ctx: &mut Context, _next: Next) -> Result<(), Error> {
        let id = ctx.param("id").unwrap_or_default().to_string();
        ctx.response_mut()
            .json(StatusCode::OK, &json!({ "id": id }))?;
        Ok(())
    }
}

#[derive(Debug)]
struct DeleteUser;

#[async_trait]
impl Handler for DeleteUser {
    async fn call(&self, ctx: &mut Context, _next: Next) -> Result<(), Error> {
        ctx.response_mut().set_status(StatusCode::NO_CONTENT);
        Ok(())
    }
}

/// Echoes the request body back with the matched route and parameters
#[derive(Debug)]
struct Echo;

#[async_trait]
impl Handler for Echo {
    async fn call(&self, ctx: &mut Context, _next: Next) -> Result<(), Error> {
        let body = ctx
            .request()
            .body()
            .clone()
            .collect()
            .await
            .unwrap_or_else(|never| match never {})
            .to_bytes();

        let params: serde_json::Map<String, serde_json::Value> = ctx
            .params()
            .iter()
            .map(|(name, value)| (name.to_string(), json!(value)))
            .collect();

        let payload = json!({
            "method": ctx.method().as_str(),
            "route": ctx.route_pattern(),
            "params": params,
            "body": String::from_utf8_lossy(&body),
        });
        ctx.response_mut().json(StatusCode::OK, &payload)?;
        Ok(())
    }
}

#[derive(Debug)]
struct ShowFile;

#[async_trait]
impl Handler for ShowFile {
    async fn call(&self, ctx: &mut Context, _next: Next) -> Result<(), Error> {
        let path = ctx.param("path").unwrap_or_default().to_string();
        ctx.response_mut().text(StatusCode::OK, path);
        Ok(())
    }
}
