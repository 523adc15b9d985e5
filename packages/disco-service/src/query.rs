use disco_providers::DiscoveryParams;

/// Identifiers scoping which indexed document set queries run against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryContext {
	pub environment_id: String,
	pub collection_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryMode {
	#[default]
	Plain,
	NaturalLanguage,
}
impl QueryMode {
	/// Maps the client's `queryType` parameter. Anything other than `natural_language_query` is a
	/// plain query.
	pub fn from_query_type(query_type: Option<&str>) -> Self {
		match query_type {
			Some("natural_language_query") => Self::NaturalLanguage,
			_ => Self::Plain,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
	pub text: Option<String>,
	pub filter: Option<String>,
	pub count: Option<u32>,
	pub mode: QueryMode,
}

/// Raw builder input. The caller picks the mode by populating one of the two text slots.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
	pub natural_language_query: Option<String>,
	pub query: Option<String>,
	pub filter: Option<String>,
	pub count: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
	context: DiscoveryContext,
	aggregation: Option<String>,
	return_fields: Option<String>,
}
impl QueryBuilder {
	pub fn new(search: &disco_config::Search) -> Self {
		Self {
			context: DiscoveryContext::default(),
			aggregation: search.aggregation.clone(),
			return_fields: search.return_fields.clone(),
		}
	}

	pub fn set_environment_id(&mut self, environment_id: impl Into<String>) {
		self.context.environment_id = environment_id.into();
	}

	pub fn set_collection_id(&mut self, collection_id: impl Into<String>) {
		self.context.collection_id = collection_id.into();
	}

	pub fn context(&self) -> &DiscoveryContext {
		&self.context
	}

	/// Natural-language text wins when both slots are populated; `query` is dropped in that case.
	pub fn search(&self, options: SearchOptions) -> DiscoveryParams {
		let (query, natural_language_query) = match options.natural_language_query {
			Some(text) => (None, Some(text)),
			None => (options.query, None),
		};

		DiscoveryParams {
			environment_id: self.context.environment_id.clone(),
			collection_id: self.context.collection_id.clone(),
			query,
			natural_language_query,
			filter: options.filter,
			count: options.count,
			aggregation: self.aggregation.clone(),
			return_fields: self.return_fields.clone(),
		}
	}

	/// A request without text leaves both text slots empty, so the upstream receives neither.
	pub fn build(&self, request: &SearchRequest) -> DiscoveryParams {
		let text = request.text.clone();
		let options = match request.mode {
			QueryMode::NaturalLanguage => SearchOptions {
				natural_language_query: text,
				filter: request.filter.clone(),
				count: request.count,
				..Default::default()
			},
			QueryMode::Plain => SearchOptions {
				query: text,
				filter: request.filter.clone(),
				count: request.count,
				..Default::default()
			},
		};

		self.search(options)
	}
}
