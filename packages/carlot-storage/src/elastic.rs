use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value, json};

use carlot_domain::{
	ExactHit, ExactPage, ExactQuery, FieldFilter, SortDirection, SortKey, TextField, Vehicle,
};

use crate::{Error, Result};

const TEXT_FIELDS: [&str; 8] = [
	"brand^3",
	"model^3",
	"description^2",
	"body_type",
	"fuel_type",
	"color",
	"features",
	"city",
];

pub struct ElasticIndex {
	client: Client,
	url: String,
	index: String,
}
impl ElasticIndex {
	pub fn new(cfg: &carlot_config::ExactBackend) -> Result<Self> {
		let url = cfg
			.url
			.as_deref()
			.ok_or_else(|| Error::InvalidArgument("backends.exact.url is required.".to_string()))?;
		let index = cfg.index.clone().ok_or_else(|| {
			Error::InvalidArgument("backends.exact.index is required.".to_string())
		})?;
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self { client, url: url.trim_end_matches('/').to_string(), index })
	}

	pub async fn search(&self, query: &ExactQuery) -> Result<ExactPage> {
		let url = format!("{}/{}/_search", self.url, self.index);
		let body = build_search_body(query);
		let res = self.client.post(url).json(&body).send().await?;
		let json: Value = res.error_for_status()?.json().await?;

		parse_search_response(json)
	}

	pub async fn sample(&self, limit: u32) -> Result<Vec<Vehicle>> {
		let page = self.search(&ExactQuery::match_all(limit)).await?;

		Ok(page.hits.into_iter().map(|hit| hit.payload).collect())
	}
}

/// Translates a plan into an Elasticsearch `_search` body.
///
/// Structured filters go to `filter` (ranges also require the attribute to exist), the text clause
/// is `must` only when required, and description boosts are always `should`.
pub fn build_search_body(query: &ExactQuery) -> Value {
	let mut must = Vec::new();
	let mut filter = Vec::new();
	let mut should = Vec::new();

	for item in &query.filters {
		match item {
			FieldFilter::Match { field, value } => filter.push(json!({
				"match": { field.as_str(): { "query": value, "operator": "and" } }
			})),
			FieldFilter::AllOf { field, values } =>
				for value in values {
					filter.push(json!({
						"match": { field.as_str(): { "query": value, "operator": "and" } }
					}));
				},
			FieldFilter::Contains { field, value } => filter.push(json!({
				"wildcard": {
					field.as_str(): { "value": format!("*{value}*"), "case_insensitive": true }
				}
			})),
			FieldFilter::Range { field, min, max } => {
				let mut range = Map::new();

				if let Some(min) = min {
					range.insert("gte".to_string(), json!(min));
				}
				if let Some(max) = max {
					range.insert("lte".to_string(), json!(max));
				}

				filter.push(json!({ "exists": { "field": field.storage_name() } }));
				filter.push(json!({ "range": { field.storage_name(): range } }));
			},
		}
	}

	if let Some(text) = query.text.as_deref() {
		let clause = json!({
			"multi_match": {
				"query": text,
				"fields": TEXT_FIELDS,
				"type": "best_fields",
				"fuzziness": "AUTO"
			}
		});

		if query.require_text {
			must.push(clause);
		} else {
			should.push(clause);
		}
	}

	for boost in &query.boosts {
		should.push(json!({
			"match": {
				TextField::Description.as_str(): { "query": boost.value, "boost": boost.weight }
			}
		}));
	}

	let bool_query = if must.is_empty() && filter.is_empty() && should.is_empty() {
		json!({ "match_all": {} })
	} else {
		json!({ "bool": { "must": must, "filter": filter, "should": should } })
	};
	let mut sort: Vec<Value> = query
		.sort
		.iter()
		.map(|key| match key {
			SortKey::Field { field, direction } => json!({
				field.storage_name(): { "order": direction_name(*direction), "missing": "_last" }
			}),
			SortKey::Relevance => json!({ "_score": { "order": "desc" } }),
		})
		.collect();

	sort.push(json!({ "id": { "order": "asc" } }));

	json!({
		"query": bool_query,
		"sort": sort,
		"from": query.offset,
		"size": query.limit,
		"track_scores": true,
		"track_total_hits": true
	})
}

pub fn parse_search_response(json: Value) -> Result<ExactPage> {
	let hits = json
		.get("hits")
		.ok_or_else(|| Error::InvalidResponse("Search response is missing hits.".to_string()))?;
	let total = match hits.get("total") {
		Some(Value::Number(number)) => number.as_u64(),
		Some(total) => total.get("value").and_then(Value::as_u64),
		None => None,
	}
	.ok_or_else(|| Error::InvalidResponse("Search response is missing hits.total.".to_string()))?;
	let items = hits.get("hits").and_then(Value::as_array).ok_or_else(|| {
		Error::InvalidResponse("Search response is missing hits.hits.".to_string())
	})?;
	let mut out = Vec::with_capacity(items.len());

	for item in items {
		let mut source = item
			.get("_source")
			.and_then(Value::as_object)
			.cloned()
			.ok_or_else(|| Error::InvalidResponse("Search hit is missing _source.".to_string()))?;

		let doc_id = item.get("_id").and_then(Value::as_str).and_then(|id| id.parse::<u64>().ok());

		if !source.contains_key("id")
			&& let Some(id) = doc_id
		{
			source.insert("id".to_string(), json!(id));
		}

		let payload: Vehicle = serde_json::from_value(Value::Object(source))
			.map_err(|err| Error::InvalidResponse(format!("Search hit has invalid _source: {err}")))?;
		let score = item.get("_score").and_then(Value::as_f64).unwrap_or(0.0) as f32;

		out.push(ExactHit { id: payload.id, score, payload });
	}

	let took_ms = json.get("took").and_then(Value::as_u64).unwrap_or(0);

	Ok(ExactPage { hits: out, total, took_ms })
}

fn direction_name(direction: SortDirection) -> &'static str {
	match direction {
		SortDirection::Asc => "asc",
		SortDirection::Desc => "desc",
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use carlot_domain::{
		ExactQuery, FieldFilter, NumericField, SortDirection, SortKey, TextBoost, TextField,
	};

	use crate::elastic::{build_search_body, parse_search_response};

	fn plan() -> ExactQuery {
		ExactQuery {
			filters: vec![
				FieldFilter::Match { field: TextField::Color, value: "red".to_string() },
				FieldFilter::Range {
					field: NumericField::EngineVolume,
					min: Some(1_800.0),
					max: None,
				},
			],
			text: Some("family wagon".to_string()),
			require_text: false,
			boosts: vec![TextBoost { value: "red".to_string(), weight: 2.0 }],
			sort: vec![
				SortKey::Field { field: NumericField::Year, direction: SortDirection::Desc },
				SortKey::Relevance,
			],
			offset: 20,
			limit: 10,
		}
	}

	#[test]
	fn filters_are_strict_and_text_is_soft() {
		let body = build_search_body(&plan());
		let filter = body["query"]["bool"]["filter"].as_array().expect("Filter must be an array.");
		let should = body["query"]["bool"]["should"].as_array().expect("Should must be an array.");

		assert_eq!(filter.len(), 3);
		assert_eq!(filter[0]["match"]["color"]["query"], "red");
		assert_eq!(filter[1]["exists"]["field"], "engine_volume_cc");
		assert_eq!(filter[2]["range"]["engine_volume_cc"]["gte"], 1_800.0);
		assert!(filter[2]["range"]["engine_volume_cc"].get("lte").is_none());
		assert_eq!(should.len(), 2);
		assert_eq!(should[0]["multi_match"]["query"], "family wagon");
		assert_eq!(should[1]["match"]["description"]["boost"], 2.0);
		assert!(body["query"]["bool"]["must"].as_array().is_some_and(Vec::is_empty));
	}

	#[test]
	fn required_text_is_a_must_clause() {
		let mut query = plan();

		query.filters.clear();
		query.boosts.clear();
		query.require_text = true;

		let body = build_search_body(&query);

		assert_eq!(body["query"]["bool"]["must"][0]["multi_match"]["query"], "family wagon");
	}

	#[test]
	fn sort_and_window_are_forwarded() {
		let body = build_search_body(&plan());

		assert_eq!(body["sort"][0]["year"]["order"], "desc");
		assert_eq!(body["sort"][1]["_score"]["order"], "desc");
		assert_eq!(body["sort"][2]["id"]["order"], "asc");
		assert_eq!(body["from"], 20);
		assert_eq!(body["size"], 10);
		assert_eq!(body["track_scores"], true);
	}

	#[test]
	fn empty_plan_matches_everything() {
		let body = build_search_body(&ExactQuery::match_all(5));

		assert!(body["query"].get("match_all").is_some());
	}

	#[test]
	fn parses_hits_total_and_took() {
		let page = parse_search_response(json!({
			"took": 7,
			"hits": {
				"total": { "value": 42, "relation": "eq" },
				"hits": [
					{ "_id": "9", "_score": 3.5, "_source": { "brand": "Zeta", "price": 900000 } },
					{ "_id": "x", "_score": null, "_source": { "id": 4, "brand": "Yota" } }
				]
			}
		}))
		.expect("Response must parse.");

		assert_eq!(page.total, 42);
		assert_eq!(page.took_ms, 7);
		assert_eq!(page.hits.len(), 2);
		assert_eq!(page.hits[0].id, 9);
		assert_eq!(page.hits[0].score, 3.5);
		assert_eq!(page.hits[1].id, 4);
		assert_eq!(page.hits[1].score, 0.0);
	}

	#[test]
	fn missing_total_is_rejected() {
		assert!(parse_search_response(json!({ "hits": { "hits": [] } })).is_err());
	}
}
