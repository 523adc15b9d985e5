pub mod query;
pub mod startup;

mod error;

pub use error::{Error, QUOTA_EXCEEDED_MESSAGE, Result};
pub use query::{DiscoveryContext, QueryBuilder, QueryMode, SearchOptions, SearchRequest};
pub use startup::{Bootstrap, bootstrap};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use disco_providers::{DiscoveryClient, DiscoveryParams};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait DiscoveryProvider
where
	Self: Send + Sync,
{
	fn environments<'a>(&'a self) -> BoxFuture<'a, disco_providers::Result<Value>>;

	fn collections<'a>(
		&'a self,
		environment_id: &'a str,
	) -> BoxFuture<'a, disco_providers::Result<Value>>;

	fn query<'a>(
		&'a self,
		params: &'a DiscoveryParams,
	) -> BoxFuture<'a, disco_providers::Result<Value>>;
}

impl DiscoveryProvider for DiscoveryClient {
	fn environments<'a>(&'a self) -> BoxFuture<'a, disco_providers::Result<Value>> {
		Box::pin(DiscoveryClient::environments(self))
	}

	fn collections<'a>(
		&'a self,
		environment_id: &'a str,
	) -> BoxFuture<'a, disco_providers::Result<Value>> {
		Box::pin(DiscoveryClient::collections(self, environment_id))
	}

	fn query<'a>(
		&'a self,
		params: &'a DiscoveryParams,
	) -> BoxFuture<'a, disco_providers::Result<Value>> {
		Box::pin(DiscoveryClient::query(self, params))
	}
}

pub struct DiscoveryService {
	builder: QueryBuilder,
	provider: Arc<dyn DiscoveryProvider>,
}
impl DiscoveryService {
	pub fn new(builder: QueryBuilder, provider: Arc<dyn DiscoveryProvider>) -> Self {
		Self { builder, provider }
	}

	pub fn context(&self) -> &DiscoveryContext {
		self.builder.context()
	}

	/// Runs one search against the configured collection and returns the raw result payload.
	pub async fn search(&self, request: &SearchRequest) -> Result<Value> {
		let params = self.builder.build(request);
		let result = self.provider.query(&params).await;

		result.map_err(|err| {
			let err = Error::from(err);

			tracing::warn!(status = err.status(), error = %err, "Discovery query failed.");

			err
		})
	}
}
