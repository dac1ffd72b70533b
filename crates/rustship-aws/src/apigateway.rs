//! API Gateway (REST) backed routing service.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_apigateway::Client;
use aws_sdk_apigateway::error::ProvideErrorMetadata;
use aws_sdk_apigateway::types::IntegrationType;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use rustship_core::Route;
use rustship_provider::{ProviderError, ProviderResult, RoutingService};

/// [`RoutingService`] over the API Gateway REST API.
///
/// Manages one REST API (looked up by name, created on first use).
/// Method and integration writes stage the configuration; only
/// `create_deployment` makes it live under a stage, which is the atomic
/// cutover the pipeline requires.
#[derive(Debug)]
pub struct ApiGatewayRoutingService {
    client: Client,
    region: String,
    api_name: String,
    api_id: OnceCell<String>,
}

impl ApiGatewayRoutingService {
    /// Wrap an API Gateway client managing the REST API named `api_name`.
    #[must_use]
    pub fn new(client: Client, region: impl Into<String>, api_name: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
            api_name: api_name.into(),
            api_id: OnceCell::new(),
        }
    }

    /// Resolve the managed REST API id, creating the API on first use.
    async fn api_id(&self) -> ProviderResult<&str> {
        self.api_id
            .get_or_try_init(|| async {
                let existing = self
                    .client
                    .get_rest_apis()
                    .limit(500)
                    .send()
                    .await
                    .map_err(|e| ProviderError::api(message_of(&e)))?;

                if let Some(api) = existing
                    .items()
                    .iter()
                    .find(|api| api.name() == Some(self.api_name.as_str()))
                {
                    let id = api.id().unwrap_or_default().to_owned();
                    debug!(api = %self.api_name, id = %id, "found existing REST API");
                    return Ok(id);
                }

                let created = self
                    .client
                    .create_rest_api()
                    .name(&self.api_name)
                    .send()
                    .await
                    .map_err(|e| ProviderError::api(message_of(&e)))?;
                let id = created.id().unwrap_or_default().to_owned();
                info!(api = %self.api_name, id = %id, "created REST API");
                Ok(id)
            })
            .await
            .map(String::as_str)
    }

    /// Ensure the resource hierarchy for `path` exists and return the id
    /// of its leaf resource.
    async fn ensure_resource(&self, api_id: &str, path: &str) -> ProviderResult<String> {
        let resources = self
            .client
            .get_resources()
            .rest_api_id(api_id)
            .limit(500)
            .send()
            .await
            .map_err(|e| ProviderError::api(message_of(&e)))?;

        let mut by_path: HashMap<String, String> = resources
            .items()
            .iter()
            .filter_map(|r| Some((r.path()?.to_owned(), r.id()?.to_owned())))
            .collect();

        let root_id = by_path
            .get("/")
            .cloned()
            .ok_or_else(|| ProviderError::api("REST API has no root resource"))?;

        let mut parent_id = root_id;
        let mut current_path = String::new();
        for segment in path_segments(path) {
            current_path.push('/');
            current_path.push_str(segment);

            if let Some(id) = by_path.get(&current_path) {
                parent_id = id.clone();
                continue;
            }

            let created = self
                .client
                .create_resource()
                .rest_api_id(api_id)
                .parent_id(&parent_id)
                .path_part(segment)
                .send()
                .await
                .map_err(|e| ProviderError::api(message_of(&e)))?;
            let id = created.id().unwrap_or_default().to_owned();
            by_path.insert(current_path.clone(), id.clone());
            parent_id = id;
        }

        Ok(parent_id)
    }
}

#[async_trait]
impl RoutingService for ApiGatewayRoutingService {
    async fn bind_route(
        &self,
        _stage: &str,
        route: &Route,
        qualified_arn: &str,
        execution_role: &str,
    ) -> ProviderResult<()> {
        let api_id = self.api_id().await?.to_owned();
        let resource_id = self.ensure_resource(&api_id, &route.path).await?;

        match self
            .client
            .put_method()
            .rest_api_id(&api_id)
            .resource_id(&resource_id)
            .http_method(route.method.as_str())
            .authorization_type("NONE")
            .send()
            .await
        {
            Ok(_) => {}
            // The method already exists from a previous deployment.
            Err(e) if e.meta().code() == Some("ConflictException") => {}
            Err(e) => return Err(ProviderError::api(message_of(&e))),
        }

        self.client
            .put_integration()
            .rest_api_id(&api_id)
            .resource_id(&resource_id)
            .http_method(route.method.as_str())
            .r#type(IntegrationType::AwsProxy)
            .integration_http_method("POST")
            .uri(invocation_uri(&self.region, qualified_arn))
            .credentials(execution_role)
            .send()
            .await
            .map_err(|e| ProviderError::api(message_of(&e)))?;

        debug!(%route, function = %qualified_arn, "route integration written");
        Ok(())
    }

    async fn activate_stage(&self, stage: &str) -> ProviderResult<()> {
        let api_id = self.api_id().await?.to_owned();
        self.client
            .create_deployment()
            .rest_api_id(&api_id)
            .stage_name(stage)
            .send()
            .await
            .map_err(|e| ProviderError::api(message_of(&e)))?;
        info!(api = %self.api_name, stage = %stage, "stage deployment created");
        Ok(())
    }
}

/// Lambda invocation URI for an AWS_PROXY integration.
fn invocation_uri(region: &str, qualified_arn: &str) -> String {
    format!(
        "arn:aws:apigateway:{region}:lambda:path/2015-03-31/functions/{qualified_arn}/invocations"
    )
}

/// Non-empty segments of a resource path.
fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Render an SDK error into the provider-facing message.
fn message_of<E, R>(err: &aws_sdk_apigateway::error::SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    err.meta()
        .message()
        .map_or_else(|| err.to_string(), ToOwned::to_owned)
}
